//! Reporting collaborators.
//!
//! The Collection Site hands every appraisal and the final total to a
//! `Reporter` once its own lock has been released.

use std::sync::Mutex;

use crate::types::{Appraisal, RoomState};

pub trait Reporter: Send + Sync {
    /// Called once per appraisal, in appraisal order.
    fn appraisal(&self, appraisal: &Appraisal);

    /// Called exactly once, when the heist is over.
    fn sum_up(&self, canvases: u32);
}

/// Writes one `BUSY` / `FREE` / `EMPTY` line per appraisal to stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn appraisal(&self, appraisal: &Appraisal) {
        println!("{}", appraisal.state.token());
    }

    fn sum_up(&self, canvases: u32) {
        println!("The heist is over! {} canvases were collected.", canvases);
    }
}

#[derive(Debug, Default)]
struct Recorded {
    appraisals: Vec<Appraisal>,
    totals: Vec<u32>,
}

/// Keeps everything it is told in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    recorded: Mutex<Recorded>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn appraisals(&self) -> Vec<Appraisal> {
        self.with(|r| r.appraisals.clone())
    }

    /// The token stream a console reporter would have printed.
    pub fn tokens(&self) -> Vec<&'static str> {
        self.with(|r| r.appraisals.iter().map(|a| a.state.token()).collect())
    }

    pub fn count(&self, state: RoomState) -> usize {
        self.with(|r| r.appraisals.iter().filter(|a| a.state == state).count())
    }

    /// Every total passed to `sum_up`; a correct run has exactly one.
    pub fn totals(&self) -> Vec<u32> {
        self.with(|r| r.totals.clone())
    }

    fn with<R>(&self, f: impl FnOnce(&mut Recorded) -> R) -> R {
        // a poisoned recorder still holds everything recorded before the panic
        let mut recorded = self
            .recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut recorded)
    }
}

impl Reporter for RecordingReporter {
    fn appraisal(&self, appraisal: &Appraisal) {
        self.with(|r| r.appraisals.push(*appraisal));
    }

    fn sum_up(&self, canvases: u32) {
        self.with(|r| r.totals.push(canvases));
    }
}
