// Museum Heist Simulation
//
// A Master Thief and a pool of ordinary thieves coordinate through four
// shared regions (museum, concentration site, assault parties, collection
// site), each a mutex + condition variable monitor. Every actor runs on its
// own OS thread.

pub mod actors;
pub mod config;
pub mod error;
pub mod heist;
pub mod logging;
pub mod regions;
pub mod reporter;
pub mod types;

// Re-export commonly used types
pub use config::{HeistConfig, RoomPlan};
pub use error::{HeistError, HeistResult};
pub use heist::{Heist, HeistSummary};
pub use reporter::{ConsoleReporter, RecordingReporter, Reporter};
pub use types::{Appraisal, Extraction, RoomState, Situation};

#[doc(hidden)]
pub use tracing;
