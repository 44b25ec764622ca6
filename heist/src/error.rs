use thiserror::Error;

use crate::types::{PartyId, RoomId, ThiefId};

/// Errors raised by the shared regions and the actors driving them.
///
/// None of these are recoverable inside a run: they signal a broken invariant
/// or a precondition violation, and the actor that observes one aborts the
/// simulation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeistError {
    #[error("Monitor '{region}' was poisoned by a panicking thread")]
    Poisoned { region: &'static str },

    #[error("Assault party {party} is full (capacity: {capacity})")]
    PartyFull { party: PartyId, capacity: usize },

    #[error("Assault party {party} cannot take a room while {phase}")]
    PartyBusy { party: PartyId, phase: String },

    #[error("Assault party {party} is not accepting members while {phase}")]
    NotFilling { party: PartyId, phase: String },

    #[error("Ordinary thief {thief} already joined assault party {party}")]
    AlreadyMember { party: PartyId, thief: ThiefId },

    #[error("Ordinary thief {thief} is not a member of assault party {party}")]
    NotAMember { party: PartyId, thief: ThiefId },

    #[error("Ordinary thief {thief} cannot {action} while assault party {party} is {phase}")]
    WrongPhase {
        party: PartyId,
        thief: ThiefId,
        action: &'static str,
        phase: String,
    },

    #[error("Assault party {party} has no room assigned")]
    NoRoomAssigned { party: PartyId },

    #[error("No free assault party or room to send it to")]
    NoFreeParty,

    #[error("Unknown assault party: {0}")]
    UnknownParty(PartyId),

    #[error("Unknown room: {0}")]
    UnknownRoom(RoomId),

    #[error("Unknown ordinary thief: {0}")]
    UnknownThief(ThiefId),

    #[error("Appraisal queue overflow (capacity: {capacity})")]
    QueueOverflow { capacity: usize },

    #[error("Appraisal queue is empty")]
    QueueEmpty,

    #[error("Ordinary thief {0} handed in twice without leaving the collection site")]
    DuplicateHandIn(ThiefId),

    #[error("Ordinary thief {0} has no pending assignment")]
    NoAssignment(ThiefId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to spawn actor thread: {0}")]
    ThreadSpawn(String),

    #[error("Actor thread '{0}' panicked")]
    ActorPanicked(String),
}

pub type HeistResult<T> = Result<T, HeistError>;
