//! # Assault Party
//!
//! A fixed-capacity group that crosses into a room and back out.
//!
//! ## Key Concepts
//! - Crossing order: ascending displacement on the way in, ties broken by the
//!   order members joined. The way out is the exact reverse.
//! - Turn counter: only the member whose turn it is may cross; everybody else
//!   sleeps on the party's monitor.
//! - Phases: `Empty → Filling → Inbound → Inside → Outbound → Empty`. The
//!   party is reusable once the last member is out.
//!
//! ## Implementation Details
//! The party's own lock is the serialization point; there is no separate
//! barrier. The member that completes the party fixes the order, the last one
//! in moves the party `Inside`, the last one to finish its visit reverses the
//! order, and the last one out archives the excursion and empties the party.

use std::fmt;

use serde::Serialize;

use crate::error::{HeistError, HeistResult};
use crate::regions::monitor::Monitor;
use crate::types::{PartyId, RoomId, ThiefId};

/// Lifecycle of a party across one excursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyPhase {
    /// No room, no members; the Master may assign it
    Empty,
    /// Room assigned, members registering
    Filling,
    /// Members crawling in, one at a time
    Inbound,
    /// Everybody inside the room
    Inside,
    /// Members crawling out in reverse order
    Outbound,
}

impl fmt::Display for PartyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartyPhase::Empty => "empty",
            PartyPhase::Filling => "filling",
            PartyPhase::Inbound => "crawling in",
            PartyPhase::Inside => "inside",
            PartyPhase::Outbound => "crawling out",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Member {
    pub thief: ThiefId,
    pub displacement: u32,
}

/// Record of one completed excursion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossingLog {
    pub party: PartyId,
    pub room: RoomId,
    /// Members in the order they joined
    pub members: Vec<Member>,
    pub inbound: Vec<ThiefId>,
    pub outbound: Vec<ThiefId>,
}

struct PartyState {
    phase: PartyPhase,
    room: Option<RoomId>,
    members: Vec<Member>,
    /// Crossing order for the current direction
    order: Vec<ThiefId>,
    turn: usize,
    /// Members that finished their room visit
    visited: Vec<ThiefId>,
    inbound: Vec<ThiefId>,
    outbound: Vec<ThiefId>,
    history: Vec<CrossingLog>,
}

impl PartyState {
    fn is_member(&self, thief: ThiefId) -> bool {
        self.members.iter().any(|m| m.thief == thief)
    }

    fn is_turn_of(&self, thief: ThiefId) -> bool {
        self.order.get(self.turn) == Some(&thief)
    }

    fn reset(&mut self) {
        self.phase = PartyPhase::Empty;
        self.room = None;
        self.members.clear();
        self.order.clear();
        self.turn = 0;
        self.visited.clear();
    }
}

#[derive(Debug)]
pub struct AssaultParty {
    id: PartyId,
    capacity: usize,
    monitor: Monitor<PartyState>,
}

impl AssaultParty {
    pub fn new(id: PartyId, capacity: usize) -> Self {
        Self {
            id,
            capacity,
            monitor: Monitor::new(
                "assault_party",
                PartyState {
                    phase: PartyPhase::Empty,
                    room: None,
                    members: Vec::with_capacity(capacity),
                    order: Vec::with_capacity(capacity),
                    turn: 0,
                    visited: Vec::with_capacity(capacity),
                    inbound: Vec::with_capacity(capacity),
                    outbound: Vec::with_capacity(capacity),
                    history: Vec::new(),
                },
            ),
        }
    }

    pub fn id(&self) -> PartyId {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn room(&self) -> HeistResult<Option<RoomId>> {
        self.monitor.read(|s| s.room)
    }

    pub fn phase(&self) -> HeistResult<PartyPhase> {
        self.monitor.read(|s| s.phase)
    }

    /// Every excursion completed so far, oldest first.
    pub fn history(&self) -> HeistResult<Vec<CrossingLog>> {
        self.monitor.read(|s| s.history.clone())
    }

    /// Bind an empty party to `room`. Called by the Master before it releases
    /// any thief into the party.
    pub fn set_room(&self, room: RoomId) -> HeistResult<()> {
        let mut state = self.monitor.enter()?;
        if state.phase != PartyPhase::Empty {
            return Err(HeistError::PartyBusy {
                party: self.id,
                phase: state.phase.to_string(),
            });
        }

        state.room = Some(room);
        state.phase = PartyPhase::Filling;
        state.inbound.clear();
        state.outbound.clear();
        tracing::debug!(party = self.id, room, "party assigned");
        Ok(())
    }

    /// Register `thief` as a member.
    ///
    /// The member that completes the party fixes the inbound order and opens
    /// the crossing.
    pub fn join(&self, thief: ThiefId, displacement: u32) -> HeistResult<()> {
        let mut state = self.monitor.enter()?;
        if state.phase != PartyPhase::Filling {
            return Err(HeistError::NotFilling {
                party: self.id,
                phase: state.phase.to_string(),
            });
        }
        if state.is_member(thief) {
            return Err(HeistError::AlreadyMember {
                party: self.id,
                thief,
            });
        }
        if state.members.len() >= self.capacity {
            return Err(HeistError::PartyFull {
                party: self.id,
                capacity: self.capacity,
            });
        }

        state.members.push(Member { thief, displacement });

        if state.members.len() == self.capacity {
            // stable sort keeps join order among equal displacements
            let mut sorted = state.members.clone();
            sorted.sort_by_key(|m| m.displacement);
            state.order = sorted.into_iter().map(|m| m.thief).collect();
            state.turn = 0;
            state.phase = PartyPhase::Inbound;
            tracing::debug!(party = self.id, order = ?state.order, "party complete");
            drop(state);
            self.monitor.notify_all();
        }
        Ok(())
    }

    /// Wait for this thief's turn, cross into the room, then wait until the
    /// whole party is inside. Returns the crossing position (0-based).
    pub fn crawl_in(&self, thief: ThiefId) -> HeistResult<usize> {
        let state = self.enter_as_member(thief)?;
        let mut state = self.monitor.wait_while(state, |s| {
            !(s.phase == PartyPhase::Inbound && s.is_turn_of(thief))
        })?;

        let position = state.turn;
        state.inbound.push(thief);
        state.turn += 1;
        if state.turn == self.capacity {
            state.phase = PartyPhase::Inside;
            state.turn = 0;
            tracing::trace!(party = self.id, "party inside");
        }
        self.monitor.notify_all();

        drop(self.monitor.wait_while(state, |s| s.phase == PartyPhase::Inbound)?);
        Ok(position)
    }

    /// Called by every member once its extraction attempt is over.
    ///
    /// Only the last member to get here flips the crossing order and starts
    /// the way out; the others return straight away.
    pub fn reverse_direction(&self, thief: ThiefId) -> HeistResult<()> {
        let mut state = self.enter_as_member(thief)?;
        if state.phase != PartyPhase::Inside || state.visited.contains(&thief) {
            return Err(HeistError::WrongPhase {
                party: self.id,
                thief,
                action: "reverse direction",
                phase: state.phase.to_string(),
            });
        }

        state.visited.push(thief);
        if state.visited.len() == self.capacity {
            state.order.reverse();
            state.turn = 0;
            state.phase = PartyPhase::Outbound;
            tracing::trace!(party = self.id, order = ?state.order, "party heading out");
            drop(state);
            self.monitor.notify_all();
        }
        Ok(())
    }

    /// Wait for this thief's turn and cross back out. The last member out
    /// archives the excursion and leaves the party empty.
    pub fn crawl_out(&self, thief: ThiefId) -> HeistResult<usize> {
        let state = self.enter_as_member(thief)?;
        let mut state = self.monitor.wait_while(state, |s| {
            !(s.phase == PartyPhase::Outbound && s.is_turn_of(thief))
        })?;

        let position = state.turn;
        state.outbound.push(thief);
        state.turn += 1;

        if state.turn == self.capacity {
            let log = CrossingLog {
                party: self.id,
                room: state.room.ok_or(HeistError::NoRoomAssigned { party: self.id })?,
                members: state.members.clone(),
                inbound: state.inbound.clone(),
                outbound: state.outbound.clone(),
            };
            state.history.push(log);
            state.reset();
            tracing::debug!(party = self.id, "party back and disbanded");
        }

        drop(state);
        self.monitor.notify_all();
        Ok(position)
    }

    fn enter_as_member(
        &self,
        thief: ThiefId,
    ) -> HeistResult<std::sync::MutexGuard<'_, PartyState>> {
        let state = self.monitor.enter()?;
        if !state.is_member(thief) {
            return Err(HeistError::NotAMember {
                party: self.id,
                thief,
            });
        }
        Ok(state)
    }
}
