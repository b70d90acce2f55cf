//! # Frame Scheduling
//!
//! [`System`] is the unit of per-frame work; [`Group`] runs an ordered,
//! nestable list of them phase by phase.

pub mod group;
pub mod system;

pub use group::{Group, Phase, PhaseStats, SystemEntry, SystemTimings};
pub use system::{AsAny, System, SystemContext};
