//! Data models for raid rosters.
//!
//! - `PlayerId`, `TableId`: opaque string identities
//! - `Player`, `WowClass`: registry records and their class tag
//! - `RaidTable`, `RaidMember`: a named roster and its membership records
//! - `AttendanceStatus`: the per-member attendance cycle
//! - `EnrichedRaidMember`: a member joined with its player record for display

pub mod ids;
pub mod player;
pub mod roster;

pub use ids::{PlayerId, TableId};
pub use player::{Player, WowClass};
pub use roster::{AttendanceStatus, EnrichedRaidMember, RaidMember, RaidTable};
