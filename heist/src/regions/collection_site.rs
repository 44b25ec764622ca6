//! # Collection Site
//!
//! Where ordinary thieves hand in the result of an excursion and the Master
//! appraises them one at a time.
//!
//! ## Key Concepts
//! - Hand-ins travel through a bounded FIFO (`flume`), so the Master appraises
//!   them in arrival order and an overflow is detected instead of blocking.
//! - Each thief waits on its own latch: it leaves only after the Master has
//!   appraised *its* record, never someone else's.
//! - `appraise_sit` is the Master's single decision point and owns the
//!   termination condition.

use std::sync::Arc;

use flume::{Receiver, Sender, TrySendError};

use crate::error::{HeistError, HeistResult};
use crate::regions::monitor::Monitor;
use crate::reporter::Reporter;
use crate::types::{Appraisal, Extraction, PartyId, RoomId, RoomState, Situation, ThiefId};

/// A hand-in waiting for the Master. Consumed exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppraisedThief {
    pub thief: ThiefId,
    pub party: PartyId,
    pub room: RoomId,
    pub canvas: bool,
    pub room_exhausted: bool,
}

struct CollectionState {
    queue_tx: Sender<AppraisedThief>,
    queue_rx: Receiver<AppraisedThief>,
    /// Thieves currently inside the site
    present: Vec<bool>,
    /// Per-thief latch set by the Master, cleared by the thief on leaving
    appraised: Vec<bool>,
    /// Members of each party still inside the site
    in_site: Vec<usize>,
    /// Appraisals per party for the current excursion
    appraised_per_party: Vec<usize>,
    emptied_rooms: Vec<bool>,
    canvases: u32,
}

impl CollectionState {
    fn occupancy(&self) -> usize {
        self.present.iter().filter(|&&p| p).count()
    }

    fn parties_in_site(&self) -> usize {
        self.in_site.iter().filter(|&&n| n > 0).count()
    }

    fn all_rooms_emptied(&self) -> bool {
        self.emptied_rooms.iter().all(|&e| e)
    }
}

pub struct CollectionSite {
    monitor: Monitor<CollectionState>,
    thieves: usize,
    party_size: usize,
    reporter: Arc<dyn Reporter>,
}

impl std::fmt::Debug for CollectionSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionSite")
            .field("thieves", &self.thieves)
            .field("party_size", &self.party_size)
            .finish()
    }
}

impl CollectionSite {
    pub fn new(
        thieves: usize,
        parties: usize,
        party_size: usize,
        rooms: usize,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        // one slot per thief: nobody can hand in twice before being appraised
        let (queue_tx, queue_rx) = flume::bounded(thieves);

        Self {
            monitor: Monitor::new(
                "collection_site",
                CollectionState {
                    queue_tx,
                    queue_rx,
                    present: vec![false; thieves],
                    appraised: vec![false; thieves],
                    in_site: vec![0; parties],
                    appraised_per_party: vec![0; parties],
                    emptied_rooms: vec![false; rooms],
                    canvases: 0,
                },
            ),
            thieves,
            party_size,
            reporter,
        }
    }

    /// Hand in the result of an excursion and wait for the Master to appraise
    /// this thief.
    pub fn hand_a_canvas(
        &self,
        thief: ThiefId,
        party: PartyId,
        room: RoomId,
        extraction: Extraction,
    ) -> HeistResult<()> {
        let mut state = self.monitor.enter()?;
        if thief >= state.present.len() {
            return Err(HeistError::UnknownThief(thief));
        }
        if party >= state.in_site.len() {
            return Err(HeistError::UnknownParty(party));
        }
        if room >= state.emptied_rooms.len() {
            return Err(HeistError::UnknownRoom(room));
        }
        if state.present[thief] {
            return Err(HeistError::DuplicateHandIn(thief));
        }

        let record = AppraisedThief {
            thief,
            party,
            room,
            canvas: extraction.canvas,
            room_exhausted: extraction.room_exhausted,
        };
        state.queue_tx.try_send(record).map_err(|err| match err {
            TrySendError::Full(_) | TrySendError::Disconnected(_) => HeistError::QueueOverflow {
                capacity: self.thieves,
            },
        })?;

        state.present[thief] = true;
        state.in_site[party] += 1;

        // wake the Master
        self.monitor.notify_all();

        let mut state = self.monitor.wait_while(state, |s| !s.appraised[thief])?;

        state.appraised[thief] = false;
        state.present[thief] = false;
        state.in_site[party] -= 1;
        tracing::trace!(thief, party, occupancy = state.occupancy(), "left collection site");

        drop(state);
        self.monitor.notify_all();
        Ok(())
    }

    /// Appraise the oldest pending hand-in.
    pub fn collect_a_canvas(&self) -> HeistResult<Appraisal> {
        let mut state = self.monitor.enter()?;
        let record = state
            .queue_rx
            .try_recv()
            .map_err(|_| HeistError::QueueEmpty)?;

        if record.canvas {
            state.canvases += 1;
            tracing::debug!(thief = record.thief, total = state.canvases, "canvas collected");
        }
        if record.room_exhausted {
            state.emptied_rooms[record.room] = true;
        }

        state.appraised_per_party[record.party] += 1;
        let last_of_party = state.appraised_per_party[record.party] == self.party_size;
        if last_of_party {
            state.appraised_per_party[record.party] = 0;
            tracing::debug!(party = record.party, room = record.room, "party closing");
        }

        // EMPTY wins over FREE
        let room_state = if state.emptied_rooms[record.room] {
            RoomState::Empty
        } else if last_of_party {
            RoomState::Free
        } else {
            RoomState::Busy
        };

        state.appraised[record.thief] = true;
        drop(state);
        self.monitor.notify_all();

        let appraisal = Appraisal {
            thief: record.thief,
            party: record.party,
            room: record.room,
            canvas: record.canvas,
            state: room_state,
            last_of_party,
        };
        self.reporter.appraisal(&appraisal);
        Ok(appraisal)
    }

    /// The Master's decision for the next cycle.
    ///
    /// `concentration_occupancy` is read by the Master before calling; only
    /// the Master lowers it, so a stale value can delay `EndHeist` but never
    /// trigger it early.
    pub fn appraise_sit(
        &self,
        concentration_occupancy: usize,
        active_parties: usize,
        free_party: Option<PartyId>,
    ) -> HeistResult<Situation> {
        let state = self.monitor.enter()?;
        tracing::debug!(
            emptied = state.emptied_rooms.iter().filter(|&&e| e).count(),
            occupancy = state.occupancy(),
            concentration_occupancy,
            active_parties,
            ?free_party,
            "appraising the situation"
        );

        if state.all_rooms_emptied()
            && state.occupancy() == 0
            && concentration_occupancy == self.thieves
        {
            return Ok(Situation::EndHeist);
        }

        if (active_parties > 0
            && concentration_occupancy < self.thieves
            && state.parties_in_site() > 0)
            || !state.queue_rx.is_empty()
            || free_party.is_none()
        {
            return Ok(Situation::WaitForCanvas);
        }

        drop(self.monitor.wait_while(state, |s| s.occupancy() > 0)?);
        Ok(Situation::CreateAssaultParty)
    }

    /// Master sleeps until at least one hand-in is pending.
    pub fn take_a_rest(&self) -> HeistResult<()> {
        let state = self.monitor.enter()?;
        drop(self.monitor.wait_while(state, |s| s.queue_rx.is_empty())?);
        Ok(())
    }

    /// Publish the final total to the reporter.
    pub fn sum_up_results(&self) -> HeistResult<u32> {
        let canvases = self.monitor.read(|s| s.canvases)?;
        self.monitor.notify_all();
        tracing::info!(canvases, "the heist is over");
        self.reporter.sum_up(canvases);
        Ok(canvases)
    }

    pub fn occupancy(&self) -> HeistResult<usize> {
        self.monitor.read(CollectionState::occupancy)
    }

    pub fn canvases(&self) -> HeistResult<u32> {
        self.monitor.read(|s| s.canvases)
    }

    pub fn pending(&self) -> HeistResult<usize> {
        self.monitor.read(|s| s.queue_rx.len())
    }

    pub fn emptied_rooms(&self) -> HeistResult<Vec<RoomId>> {
        self.monitor.read(|s| {
            s.emptied_rooms
                .iter()
                .enumerate()
                .filter_map(|(room, &emptied)| emptied.then_some(room))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::RecordingReporter;
    use std::thread;
    use std::time::Duration;

    const GOT: Extraction = Extraction { canvas: true, room_exhausted: false };
    const LAST: Extraction = Extraction { canvas: true, room_exhausted: true };
    const MISSED: Extraction = Extraction { canvas: false, room_exhausted: true };

    fn site(thieves: usize, parties: usize, size: usize, rooms: usize) -> (Arc<CollectionSite>, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::new());
        let site = Arc::new(CollectionSite::new(thieves, parties, size, rooms, reporter.clone()));
        (site, reporter)
    }

    fn hand_in(site: &Arc<CollectionSite>, thief: ThiefId, party: PartyId, room: RoomId, extraction: Extraction) -> thread::JoinHandle<()> {
        let site = Arc::clone(site);
        thread::spawn(move || site.hand_a_canvas(thief, party, room, extraction).unwrap())
    }

    fn wait_pending(site: &CollectionSite, count: usize) {
        while site.pending().unwrap() < count {
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_fifo_appraisal_and_classification() {
        let (site, reporter) = site(3, 1, 3, 1);

        let mut handles = Vec::new();
        for (thief, extraction) in [(0, GOT), (1, GOT), (2, GOT)] {
            handles.push(hand_in(&site, thief, 0, 0, extraction));
            wait_pending(&site, thief + 1);
        }

        let appraisals: Vec<_> = (0..3).map(|_| site.collect_a_canvas().unwrap()).collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(appraisals.iter().map(|a| a.thief).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(reporter.tokens(), vec!["BUSY", "BUSY", "FREE"]);
        assert!(appraisals[2].last_of_party);
        assert_eq!(site.canvases().unwrap(), 3);
        assert_eq!(site.occupancy().unwrap(), 0);
    }

    #[test]
    fn test_empty_takes_precedence_over_free() {
        let (site, reporter) = site(3, 1, 3, 1);

        let mut handles = Vec::new();
        for (thief, extraction) in [(0, LAST), (1, MISSED), (2, MISSED)] {
            handles.push(hand_in(&site, thief, 0, 0, extraction));
            wait_pending(&site, thief + 1);
        }
        for _ in 0..3 {
            site.collect_a_canvas().unwrap();
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(reporter.tokens(), vec!["EMPTY", "EMPTY", "EMPTY"]);
        assert!(reporter.appraisals()[2].last_of_party);
        assert_eq!(site.canvases().unwrap(), 1);
        assert_eq!(site.emptied_rooms().unwrap(), vec![0]);
    }

    #[test]
    fn test_thief_waits_for_its_own_appraisal() {
        let (site, _) = site(2, 1, 2, 1);

        let first = hand_in(&site, 0, 0, 0, GOT);
        wait_pending(&site, 1);
        let second = hand_in(&site, 1, 0, 0, GOT);
        wait_pending(&site, 2);

        // appraising the first record must not let the second thief out
        site.collect_a_canvas().unwrap();
        first.join().unwrap();
        thread::sleep(Duration::from_millis(30));
        assert!(!second.is_finished());
        assert_eq!(site.occupancy().unwrap(), 1);

        site.collect_a_canvas().unwrap();
        second.join().unwrap();
        assert_eq!(site.occupancy().unwrap(), 0);
    }

    #[test]
    fn test_appraise_sit_end_heist_iff_all_conditions() {
        let (site, _) = site(3, 1, 3, 1);

        // room still stocked
        assert_eq!(site.appraise_sit(3, 0, None).unwrap(), Situation::WaitForCanvas);

        let mut handles = Vec::new();
        for (thief, extraction) in [(0, LAST), (1, MISSED), (2, MISSED)] {
            handles.push(hand_in(&site, thief, 0, 0, extraction));
            wait_pending(&site, thief + 1);
        }
        // room is not emptied until the record is appraised
        assert_eq!(site.appraise_sit(0, 1, None).unwrap(), Situation::WaitForCanvas);

        for _ in 0..3 {
            site.collect_a_canvas().unwrap();
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // rooms emptied and the site is empty, but a thief is still walking back
        assert_eq!(site.appraise_sit(2, 0, None).unwrap(), Situation::WaitForCanvas);
        assert_eq!(site.appraise_sit(3, 0, None).unwrap(), Situation::EndHeist);
    }

    #[test]
    fn test_appraise_sit_not_end_while_someone_in_site() {
        let (site, _) = site(1, 1, 1, 1);

        let handle = hand_in(&site, 0, 0, 0, LAST);
        wait_pending(&site, 1);
        site.collect_a_canvas().unwrap();
        handle.join().unwrap();
        assert_eq!(site.emptied_rooms().unwrap(), vec![0]);
        assert_eq!(site.appraise_sit(1, 0, None).unwrap(), Situation::EndHeist);

        // put the thief back where collect_a_canvas leaves it: appraised,
        // latch set, not yet out of the site
        {
            let mut state = site.monitor.enter().unwrap();
            state.present[0] = true;
            state.appraised[0] = true;
            state.in_site[0] = 1;
        }
        assert_eq!(site.occupancy().unwrap(), 1);
        // rooms emptied and every thief counted idle, yet one is still inside
        assert_eq!(site.appraise_sit(1, 0, None).unwrap(), Situation::WaitForCanvas);

        {
            let mut state = site.monitor.enter().unwrap();
            state.present[0] = false;
            state.appraised[0] = false;
            state.in_site[0] = 0;
        }
        assert_eq!(site.appraise_sit(1, 0, None).unwrap(), Situation::EndHeist);

        let (site, _) = self::site(1, 1, 1, 1);
        let handle = hand_in(&site, 0, 0, 0, LAST);
        wait_pending(&site, 1);
        // pending hand-in: rooms not yet emptied, thief present
        assert_eq!(site.appraise_sit(1, 0, Some(0)).unwrap(), Situation::WaitForCanvas);
        site.collect_a_canvas().unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_appraise_sit_creates_party_when_idle() {
        let (site, _) = site(6, 2, 3, 2);
        assert_eq!(site.appraise_sit(6, 0, Some(0)).unwrap(), Situation::CreateAssaultParty);
        // a party is out but nobody is in the site yet: send another one
        assert_eq!(site.appraise_sit(3, 1, Some(1)).unwrap(), Situation::CreateAssaultParty);
        // every party is busy
        assert_eq!(site.appraise_sit(0, 2, None).unwrap(), Situation::WaitForCanvas);
    }

    #[test]
    fn test_duplicate_hand_in_is_rejected() {
        let (site, _) = site(2, 1, 2, 1);
        let handle = hand_in(&site, 0, 0, 0, GOT);
        wait_pending(&site, 1);

        assert_eq!(
            site.hand_a_canvas(0, 0, 0, GOT),
            Err(HeistError::DuplicateHandIn(0))
        );

        site.collect_a_canvas().unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn test_collect_on_empty_queue_fails() {
        let (site, _) = site(1, 1, 1, 1);
        assert_eq!(site.collect_a_canvas(), Err(HeistError::QueueEmpty));
    }

    #[test]
    fn test_sum_up_reports_once() {
        let (site, reporter) = site(1, 1, 1, 1);
        assert_eq!(site.sum_up_results().unwrap(), 0);
        assert_eq!(reporter.totals(), vec![0]);
    }
}
