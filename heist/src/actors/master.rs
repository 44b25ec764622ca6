use std::sync::Arc;

use crate::error::{HeistError, HeistResult};
use crate::log_state;
use crate::regions::Regions;
use crate::types::{Appraisal, MasterState, PartyId, RoomId, RoomState, Situation};

/// The Master's view of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Free,
    Targeted(PartyId),
    Emptied,
}

/// The Master Thief.
///
/// Keeps its own picture of which parties are out and which rooms are still
/// worth visiting; that picture only changes through its own decisions and
/// the appraisals it performs.
#[derive(Debug)]
pub struct MasterThief {
    state: MasterState,
    thieves: usize,
    /// Room each busy party is visiting
    parties: Vec<Option<RoomId>>,
    rooms: Vec<RoomStatus>,
    regions: Arc<Regions>,
}

impl MasterThief {
    pub fn new(thieves: usize, rooms: usize, regions: Arc<Regions>) -> Self {
        let parties = regions.parties.len();
        Self {
            state: MasterState::PlanningTheHeist,
            thieves,
            parties: vec![None; parties],
            rooms: vec![RoomStatus::Free; rooms],
            regions,
        }
    }

    pub fn state(&self) -> MasterState {
        self.state
    }

    /// Direct the heist until every room is empty and every thief is back.
    /// Returns the number of canvases collected.
    pub fn run(&mut self) -> HeistResult<u32> {
        let regions = Arc::clone(&self.regions);
        self.set_state(MasterState::PlanningTheHeist);

        loop {
            self.set_state(MasterState::DecidingWhatToDo);
            let occupancy = regions.concentration.occupancy()?;
            let assignment = self.next_assignment();

            let situation = regions.collection.appraise_sit(
                occupancy,
                self.active_parties(),
                assignment.map(|(party, _)| party),
            )?;

            match situation {
                Situation::EndHeist => break,
                Situation::CreateAssaultParty => {
                    let (party, room) = assignment.ok_or(HeistError::NoFreeParty)?;
                    self.prepare_assault_party(party, room)?;
                }
                Situation::WaitForCanvas => {
                    self.set_state(MasterState::WaitingForArrival);
                    if self.active_parties() > 0 {
                        regions.collection.take_a_rest()?;
                        let appraisal = regions.collection.collect_a_canvas()?;
                        self.record(&appraisal);
                    } else {
                        // nothing left to send out; wait for everyone to walk back
                        regions.concentration.wait_for_idle(self.thieves)?;
                    }
                }
            }
        }

        regions.concentration.end_operations()?;
        self.set_state(MasterState::PresentingTheReport);
        regions.collection.sum_up_results()
    }

    /// Lowest free party paired with the lowest room nobody is visiting.
    pub fn next_assignment(&self) -> Option<(PartyId, RoomId)> {
        let party = self.parties.iter().position(Option::is_none)?;
        let room = self.rooms.iter().position(|s| *s == RoomStatus::Free)?;
        Some((party, room))
    }

    pub fn active_parties(&self) -> usize {
        self.parties.iter().filter(|p| p.is_some()).count()
    }

    pub fn room_status(&self, room: RoomId) -> Option<RoomStatus> {
        self.rooms.get(room).copied()
    }

    fn prepare_assault_party(&mut self, party: PartyId, room: RoomId) -> HeistResult<()> {
        self.set_state(MasterState::AssemblingAGroup);
        let assault_party = self.regions.party(party)?;
        assault_party.set_room(room)?;

        self.parties[party] = Some(room);
        self.rooms[room] = RoomStatus::Targeted(party);

        for _ in 0..assault_party.capacity() {
            let thief = self.regions.concentration.release_thief(party)?;
            tracing::debug!(thief, party, room, "thief sent out");
        }
        tracing::info!(party, room, "assault party sent");
        Ok(())
    }

    /// Fold one appraisal into the Master's picture of the heist.
    pub fn record(&mut self, appraisal: &Appraisal) {
        if appraisal.state == RoomState::Empty {
            if let Some(status) = self.rooms.get_mut(appraisal.room) {
                *status = RoomStatus::Emptied;
            }
        }

        if appraisal.last_of_party {
            if let Some(slot) = self.parties.get_mut(appraisal.party) {
                *slot = None;
            }
            if let Some(status) = self.rooms.get_mut(appraisal.room) {
                if *status == RoomStatus::Targeted(appraisal.party) {
                    *status = RoomStatus::Free;
                }
            }
        }
    }

    fn set_state(&mut self, state: MasterState) {
        self.state = state;
        log_state!("master", 0, state);
    }
}
