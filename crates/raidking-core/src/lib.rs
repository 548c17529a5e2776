//! Core library for raidking.
//!
//! Everything the terminal UI needs that is not rendering or input:
//!
//! - `models`: players, classes, raid tables and attendance status
//! - `roster`: the suicide king ordering engine
//! - `guild`: the player registry and the set of raid tables
//! - `store`: JSON persistence of the guild document
//! - `config`: user configuration and directory resolution

pub mod config;
pub mod error;
pub mod guild;
pub mod models;
pub mod roster;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::RosterError;
pub use guild::{Change, Guild};
pub use models::{AttendanceStatus, EnrichedRaidMember, Player, PlayerId, RaidMember, RaidTable, TableId, WowClass};
pub use store::{JsonStore, RosterSink, Snapshot};
