use std::fmt;

use serde::Serialize;

pub type ThiefId = usize;
pub type PartyId = usize;
pub type RoomId = usize;

/// Outcome of a single extraction attempt inside a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extraction {
    /// The thief walked out holding a canvas
    pub canvas: bool,
    /// The room had no canvas left once this attempt finished
    pub room_exhausted: bool,
}

/// Room classification produced by every appraisal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoomState {
    /// The room still has canvases and its party has not fully returned
    Busy,
    /// The room still has canvases and its party has fully returned
    Free,
    /// The room has no canvases left
    Empty,
}

impl RoomState {
    /// The literal token written once per appraisal.
    pub fn token(&self) -> &'static str {
        match self {
            RoomState::Busy => "BUSY",
            RoomState::Free => "FREE",
            RoomState::Empty => "EMPTY",
        }
    }
}

impl fmt::Display for RoomState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Result of the Master consuming one hand-in record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Appraisal {
    pub thief: ThiefId,
    pub party: PartyId,
    pub room: RoomId,
    pub canvas: bool,
    pub state: RoomState,
    /// This record was the last member of its party to be appraised
    pub last_of_party: bool,
}

/// The Master's decision at the top of each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Situation {
    EndHeist,
    WaitForCanvas,
    CreateAssaultParty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterState {
    PlanningTheHeist,
    DecidingWhatToDo,
    AssemblingAGroup,
    WaitingForArrival,
    PresentingTheReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdinaryState {
    ConcentrationSite,
    CrawlingInwards,
    AtARoom,
    CrawlingOutwards,
    CollectionSite,
}

impl fmt::Display for MasterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MasterState::PlanningTheHeist => "PLANNING_THE_HEIST",
            MasterState::DecidingWhatToDo => "DECIDING_WHAT_TO_DO",
            MasterState::AssemblingAGroup => "ASSEMBLING_A_GROUP",
            MasterState::WaitingForArrival => "WAITING_FOR_ARRIVAL",
            MasterState::PresentingTheReport => "PRESENTING_THE_REPORT",
        };
        f.write_str(name)
    }
}

impl fmt::Display for OrdinaryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrdinaryState::ConcentrationSite => "CONCENTRATION_SITE",
            OrdinaryState::CrawlingInwards => "CRAWLING_INWARDS",
            OrdinaryState::AtARoom => "AT_A_ROOM",
            OrdinaryState::CrawlingOutwards => "CRAWLING_OUTWARDS",
            OrdinaryState::CollectionSite => "COLLECTION_SITE",
        };
        f.write_str(name)
    }
}
