use std::sync::Arc;

use crate::error::{HeistError, HeistResult};
use crate::log_state;
use crate::regions::Regions;
use crate::types::{OrdinaryState, PartyId, ThiefId};

/// An ordinary thief. Owns its own lifecycle state; the regions only ever see
/// its id, displacement and hand-in data.
#[derive(Debug)]
pub struct OrdinaryThief {
    id: ThiefId,
    displacement: u32,
    state: OrdinaryState,
    party: Option<PartyId>,
    has_canvas: bool,
    regions: Arc<Regions>,
}

impl OrdinaryThief {
    pub fn new(id: ThiefId, displacement: u32, regions: Arc<Regions>) -> Self {
        Self {
            id,
            displacement,
            state: OrdinaryState::ConcentrationSite,
            party: None,
            has_canvas: false,
            regions,
        }
    }

    pub fn state(&self) -> OrdinaryState {
        self.state
    }

    /// Run excursions until the Master no longer needs this thief.
    /// Returns the number of excursions taken.
    pub fn run(&mut self) -> HeistResult<usize> {
        let regions = Arc::clone(&self.regions);
        let mut excursions = 0;

        while regions.concentration.am_i_needed(self.id)? {
            let party_id = regions.concentration.prepare_excursion(self.id)?;
            let party = regions.party(party_id)?;
            self.party = Some(party_id);

            party.join(self.id, self.displacement)?;
            let room = party
                .room()?
                .ok_or(HeistError::NoRoomAssigned { party: party_id })?;

            self.set_state(OrdinaryState::CrawlingInwards);
            party.crawl_in(self.id)?;

            self.set_state(OrdinaryState::AtARoom);
            let extraction = regions.museum.attempt_extraction(party_id, room)?;
            self.has_canvas = extraction.canvas;
            party.reverse_direction(self.id)?;

            self.set_state(OrdinaryState::CrawlingOutwards);
            party.crawl_out(self.id)?;

            self.set_state(OrdinaryState::CollectionSite);
            regions
                .collection
                .hand_a_canvas(self.id, party_id, room, extraction)?;

            self.has_canvas = false;
            self.party = None;
            self.set_state(OrdinaryState::ConcentrationSite);
            excursions += 1;
        }

        tracing::debug!(thief = self.id, excursions, "no longer needed");
        Ok(excursions)
    }

    fn set_state(&mut self, state: OrdinaryState) {
        self.state = state;
        log_state!("ordinary", self.id, state, party = ?self.party, canvas = self.has_canvas);
    }
}
