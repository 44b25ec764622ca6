#![doc = " Shared regions the Master and the ordinary thieves coordinate through."]

pub mod assault_party;
pub mod collection_site;
pub mod concentration_site;
pub mod monitor;
pub mod museum;

pub use assault_party::{AssaultParty, CrossingLog, Member, PartyPhase};
pub use collection_site::{AppraisedThief, CollectionSite};
pub use concentration_site::ConcentrationSite;
pub use monitor::Monitor;
pub use museum::{Museum, RoomSnapshot};

use crate::error::{HeistError, HeistResult};
use crate::types::PartyId;

/// Every shared region of one run. Parties live in an arena indexed by id.
///
/// Regions never call each other; actors carry ids and flags between them.
#[derive(Debug)]
pub struct Regions {
    pub museum: Museum,
    pub concentration: ConcentrationSite,
    pub collection: CollectionSite,
    pub parties: Vec<AssaultParty>,
}

impl Regions {
    pub fn party(&self, id: PartyId) -> HeistResult<&AssaultParty> {
        self.parties.get(id).ok_or(HeistError::UnknownParty(id))
    }

    /// Completed excursions of every party, grouped by party.
    pub fn excursions(&self) -> HeistResult<Vec<CrossingLog>> {
        let mut logs = Vec::new();
        for party in &self.parties {
            logs.extend(party.history()?);
        }
        Ok(logs)
    }
}
