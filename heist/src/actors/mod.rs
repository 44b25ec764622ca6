#![doc = " Actor state machines driving the shared regions."]

pub mod master;
pub mod ordinary;

pub use master::{MasterThief, RoomStatus};
pub use ordinary::OrdinaryThief;
