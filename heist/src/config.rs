use std::ops::RangeInclusive;

use crate::error::{HeistError, HeistResult};

pub const DEFAULT_ORDINARY_THIEVES: usize = 6;
pub const DEFAULT_PARTY_SIZE: usize = 3;
pub const DEFAULT_ROOMS: usize = 5;
pub const DEFAULT_CANVASES: RangeInclusive<u32> = 8..=16;
pub const DEFAULT_DISPLACEMENT: RangeInclusive<u32> = 2..=6;

// --- Configuration Enums ---

/// How the museum's rooms are stocked at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoomPlan {
    /// `count` rooms, each holding a canvas count drawn from `canvases`.
    Random {
        count: usize,
        canvases: RangeInclusive<u32>,
    },
    /// One room per entry, holding exactly that many canvases.
    Fixed(Vec<u32>),
}

impl RoomPlan {
    pub fn room_count(&self) -> usize {
        match self {
            RoomPlan::Random { count, .. } => *count,
            RoomPlan::Fixed(canvases) => canvases.len(),
        }
    }
}

// --- Heist Configuration ---

/// Configuration for a single heist run.
#[derive(Clone, Debug)]
pub struct HeistConfig {
    /// Number of ordinary thieves in the pool.
    pub ordinary_thieves: usize,

    /// Number of seats in every assault party.
    pub party_size: usize,

    /// Room layout of the museum.
    pub rooms: RoomPlan,

    /// Range each thief's displacement is drawn from.
    pub displacement: RangeInclusive<u32>,

    /// Success probability of an attempt on a full room; rises to 1 as the
    /// room depletes.
    pub base_success_probability: f64,

    /// Failed attempts a room tolerates in a row before the next one succeeds.
    pub max_consecutive_misses: u32,

    /// Seed for every random draw; `None` picks one from the OS.
    pub seed: Option<u64>,
}

impl Default for HeistConfig {
    fn default() -> Self {
        Self {
            ordinary_thieves: DEFAULT_ORDINARY_THIEVES,
            party_size: DEFAULT_PARTY_SIZE,
            rooms: RoomPlan::Random {
                count: DEFAULT_ROOMS,
                canvases: DEFAULT_CANVASES,
            },
            displacement: DEFAULT_DISPLACEMENT,
            base_success_probability: 0.8,
            max_consecutive_misses: 2,
            seed: None,
        }
    }
}

impl HeistConfig {
    pub fn with_ordinary_thieves(mut self, ordinary_thieves: usize) -> Self {
        self.ordinary_thieves = ordinary_thieves;
        self
    }

    pub fn with_party_size(mut self, party_size: usize) -> Self {
        self.party_size = party_size;
        self
    }

    pub fn with_rooms(mut self, rooms: RoomPlan) -> Self {
        self.rooms = rooms;
        self
    }

    pub fn with_displacement(mut self, displacement: RangeInclusive<u32>) -> Self {
        self.displacement = displacement;
        self
    }

    pub fn with_success_probability(mut self, probability: f64) -> Self {
        self.base_success_probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Number of assault parties: `floor(ordinary_thieves / party_size)`.
    pub fn assault_parties(&self) -> usize {
        if self.party_size == 0 {
            return 0;
        }
        self.ordinary_thieves / self.party_size
    }

    /// Reject configurations the regions cannot run.
    pub fn validate(&self) -> HeistResult<()> {
        if self.party_size == 0 {
            return Err(HeistError::InvalidConfig("party size must be at least 1".into()));
        }
        if self.ordinary_thieves < self.party_size {
            return Err(HeistError::InvalidConfig(format!(
                "{} ordinary thieves cannot fill a party of {}",
                self.ordinary_thieves, self.party_size
            )));
        }
        if self.rooms.room_count() == 0 {
            return Err(HeistError::InvalidConfig("the museum needs at least one room".into()));
        }
        if let RoomPlan::Random { canvases, .. } = &self.rooms {
            if canvases.is_empty() {
                return Err(HeistError::InvalidConfig(format!(
                    "empty canvas range {}..={}",
                    canvases.start(),
                    canvases.end()
                )));
            }
        }
        if self.displacement.is_empty() || *self.displacement.start() == 0 {
            return Err(HeistError::InvalidConfig(format!(
                "displacement range {}..={} must be non-empty and positive",
                self.displacement.start(),
                self.displacement.end()
            )));
        }
        if !(self.base_success_probability > 0.0 && self.base_success_probability <= 1.0) {
            return Err(HeistError::InvalidConfig(format!(
                "success probability {} must be in (0, 1]",
                self.base_success_probability
            )));
        }
        Ok(())
    }
}
