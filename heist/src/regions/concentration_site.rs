use std::collections::VecDeque;

use crate::error::{HeistError, HeistResult};
use crate::regions::monitor::Monitor;
use crate::types::{PartyId, ThiefId};

struct ConcentrationState {
    /// Idle thieves in arrival order
    idle: VecDeque<ThiefId>,
    /// Party each thief has been assigned to and not yet picked up
    assignments: Vec<Option<PartyId>>,
    /// Cleared once by the Master to end the heist
    active: bool,
}

/// Idle pool of ordinary thieves waiting for the Master to send them out.
///
/// A thief blocked here is woken by exactly one of two events: the Master
/// assigning it to a party, or the Master ending operations.
#[derive(Debug)]
pub struct ConcentrationSite {
    monitor: Monitor<ConcentrationState>,
    thieves: usize,
}

impl ConcentrationSite {
    pub fn new(thieves: usize) -> Self {
        Self {
            monitor: Monitor::new(
                "concentration_site",
                ConcentrationState {
                    idle: VecDeque::with_capacity(thieves),
                    assignments: vec![None; thieves],
                    active: true,
                },
            ),
            thieves,
        }
    }

    /// Join the idle pool and wait until the Master decides this thief's fate.
    ///
    /// Returns `true` once the thief has an assignment and `false` once the
    /// heist is over.
    pub fn am_i_needed(&self, thief: ThiefId) -> HeistResult<bool> {
        self.check_thief(thief)?;
        let mut state = self.monitor.enter()?;

        if state.assignments[thief].is_none() && !state.idle.contains(&thief) {
            state.idle.push_back(thief);
            tracing::trace!(thief, occupancy = state.idle.len(), "entered concentration site");
            // the Master may be waiting for a free thief
            self.monitor.notify_all();
        }

        let state = self.monitor.wait_while(state, |s| {
            s.active && s.assignments[thief].is_none()
        })?;

        Ok(state.assignments[thief].is_some())
    }

    /// Wait for this thief's assignment and take it.
    pub fn prepare_excursion(&self, thief: ThiefId) -> HeistResult<PartyId> {
        self.check_thief(thief)?;
        let state = self.monitor.enter()?;
        let mut state = self.monitor.wait_while(state, |s| {
            s.active && s.assignments[thief].is_none()
        })?;

        state.assignments[thief]
            .take()
            .ok_or(HeistError::NoAssignment(thief))
    }

    /// Send the longest-waiting idle thief to `party`.
    ///
    /// Blocks while nobody is idle; thieves returning from an excursion will
    /// refill the pool.
    pub fn release_thief(&self, party: PartyId) -> HeistResult<ThiefId> {
        let state = self.monitor.enter()?;
        let mut state = self.monitor.wait_while(state, |s| s.idle.is_empty())?;

        let thief = state
            .idle
            .pop_front()
            .ok_or(HeistError::QueueEmpty)?;
        state.assignments[thief] = Some(party);
        tracing::debug!(thief, party, occupancy = state.idle.len(), "thief released");

        drop(state);
        self.monitor.notify_all();
        Ok(thief)
    }

    /// Clear the active flag and wake every idle thief so it can leave.
    pub fn end_operations(&self) -> HeistResult<()> {
        let mut state = self.monitor.enter()?;
        state.active = false;
        tracing::debug!(remaining = state.idle.len(), "concentration site closing");
        drop(state);
        self.monitor.notify_all();
        Ok(())
    }

    /// Block until at least `count` thieves are idle.
    pub fn wait_for_idle(&self, count: usize) -> HeistResult<()> {
        let count = count.min(self.thieves);
        let state = self.monitor.enter()?;
        drop(self.monitor.wait_while(state, |s| s.idle.len() < count)?);
        Ok(())
    }

    /// Number of idle thieves.
    pub fn occupancy(&self) -> HeistResult<usize> {
        self.monitor.read(|s| s.idle.len())
    }

    pub fn is_active(&self) -> HeistResult<bool> {
        self.monitor.read(|s| s.active)
    }

    fn check_thief(&self, thief: ThiefId) -> HeistResult<()> {
        if thief >= self.thieves {
            return Err(HeistError::UnknownThief(thief));
        }
        Ok(())
    }
}
