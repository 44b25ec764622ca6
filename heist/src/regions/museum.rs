use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::{HeistError, HeistResult};
use crate::regions::monitor::Monitor;
use crate::types::{Extraction, PartyId, RoomId};

/// Point-in-time view of one room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub total: u32,
    pub remaining: u32,
    pub stolen: u32,
    pub emptied: bool,
}

#[derive(Debug)]
struct Room {
    id: RoomId,
    total: u32,
    remaining: u32,
    stolen: u32,
    /// Failed attempts since the last success
    misses: u32,
    emptied: bool,
}

impl Room {
    fn new(id: RoomId, canvases: u32) -> Self {
        Self {
            id,
            total: canvases,
            remaining: canvases,
            stolen: 0,
            misses: 0,
            emptied: canvases == 0,
        }
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            id: self.id,
            total: self.total,
            remaining: self.remaining,
            stolen: self.stolen,
            emptied: self.emptied,
        }
    }

    /// Chance that an attempt succeeds given how depleted the room is.
    fn success_probability(&self, base: f64) -> f64 {
        let depletion = 1.0 - f64::from(self.remaining) / f64::from(self.total);
        (base + (1.0 - base) * depletion).clamp(0.0, 1.0)
    }
}

struct MuseumState {
    rooms: Vec<Room>,
    rng: StdRng,
    base_probability: f64,
    max_consecutive_misses: u32,
}

/// The museum: a fixed set of rooms, each with a canvas counter.
#[derive(Debug)]
pub struct Museum {
    monitor: Monitor<MuseumState>,
}

impl Museum {
    pub fn new(
        canvases: &[u32],
        base_probability: f64,
        max_consecutive_misses: u32,
        seed: u64,
    ) -> Self {
        let rooms = canvases
            .iter()
            .enumerate()
            .map(|(id, &count)| Room::new(id, count))
            .collect();

        Self {
            monitor: Monitor::new(
                "museum",
                MuseumState {
                    rooms,
                    rng: StdRng::seed_from_u64(seed),
                    base_probability,
                    max_consecutive_misses,
                },
            ),
        }
    }

    /// One thief of `party` tries to take a canvas from `room`.
    ///
    /// Once a room has been missed `max_consecutive_misses` times in a row the
    /// next attempt succeeds, so a room with `n` canvases is emptied after at
    /// most `n * (max_consecutive_misses + 1)` attempts.
    pub fn attempt_extraction(&self, party: PartyId, room: RoomId) -> HeistResult<Extraction> {
        let mut guard = self.monitor.enter()?;
        let state = &mut *guard;
        let target = state
            .rooms
            .get_mut(room)
            .ok_or(HeistError::UnknownRoom(room))?;

        if target.remaining == 0 {
            target.emptied = true;
            tracing::debug!(party, room, "room already stripped");
            return Ok(Extraction {
                canvas: false,
                room_exhausted: true,
            });
        }

        let forced = target.misses >= state.max_consecutive_misses;
        let canvas = forced
            || state
                .rng
                .random_bool(target.success_probability(state.base_probability));

        if canvas {
            target.remaining -= 1;
            target.stolen += 1;
            target.misses = 0;
            if target.remaining == 0 {
                target.emptied = true;
            }
        } else {
            target.misses += 1;
        }

        tracing::debug!(
            party,
            room,
            canvas,
            remaining = target.remaining,
            "extraction attempt"
        );

        Ok(Extraction {
            canvas,
            room_exhausted: target.remaining == 0,
        })
    }

    pub fn room_count(&self) -> HeistResult<usize> {
        self.monitor.read(|state| state.rooms.len())
    }

    pub fn remaining(&self, room: RoomId) -> HeistResult<u32> {
        self.monitor.read(|state| state.rooms.get(room).map(|r| r.remaining))?
            .ok_or(HeistError::UnknownRoom(room))
    }

    /// Canvases taken across every room.
    pub fn successful_extractions(&self) -> HeistResult<u32> {
        self.monitor
            .read(|state| state.rooms.iter().map(|room| room.stolen).sum())
    }

    pub fn snapshot(&self) -> HeistResult<Vec<RoomSnapshot>> {
        self.monitor
            .read(|state| state.rooms.iter().map(Room::snapshot).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certain_success_depletes_room() {
        let museum = Museum::new(&[2], 1.0, 2, 7);

        let first = museum.attempt_extraction(0, 0).unwrap();
        assert_eq!(first, Extraction { canvas: true, room_exhausted: false });

        let second = museum.attempt_extraction(0, 0).unwrap();
        assert_eq!(second, Extraction { canvas: true, room_exhausted: true });

        let third = museum.attempt_extraction(0, 0).unwrap();
        assert_eq!(third, Extraction { canvas: false, room_exhausted: true });

        assert_eq!(museum.remaining(0).unwrap(), 0);
        assert_eq!(museum.successful_extractions().unwrap(), 2);
        assert!(museum.snapshot().unwrap()[0].emptied);
    }

    #[test]
    fn test_room_empties_within_bound() {
        let canvases = 10;
        let max_misses = 3;
        let museum = Museum::new(&[canvases], 0.05, max_misses, 42);

        let bound = canvases * (max_misses + 1);
        let mut attempts = 0;
        while museum.remaining(0).unwrap() > 0 {
            museum.attempt_extraction(0, 0).unwrap();
            attempts += 1;
            assert!(attempts <= bound, "room not emptied after {} attempts", attempts);
        }
        assert_eq!(museum.successful_extractions().unwrap(), canvases);
    }

    #[test]
    fn test_empty_room_starts_emptied() {
        let museum = Museum::new(&[0, 3], 1.0, 2, 1);
        let rooms = museum.snapshot().unwrap();
        assert!(rooms[0].emptied);
        assert!(!rooms[1].emptied);

        let attempt = museum.attempt_extraction(0, 0).unwrap();
        assert!(!attempt.canvas);
        assert!(attempt.room_exhausted);
    }

    #[test]
    fn test_unknown_room() {
        let museum = Museum::new(&[1], 1.0, 2, 1);
        assert_eq!(
            museum.attempt_extraction(0, 4),
            Err(HeistError::UnknownRoom(4))
        );
    }
}
