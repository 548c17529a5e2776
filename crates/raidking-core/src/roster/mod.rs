//! Roster ordering.
//!
//! The suicide king engine works on any ordered sequence of entries that
//! expose an identity, an attendance status and an order key.

pub mod ordering;

pub use ordering::{is_dense, manual_swap, renumber, suicide_king_rotate};

use crate::models::{AttendanceStatus, PlayerId, RaidMember};

/// An entry the ordering engine can reorder
pub trait RosterEntry: Clone {
    fn id(&self) -> &PlayerId;
    fn status(&self) -> AttendanceStatus;
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
}

impl RosterEntry for RaidMember {
    fn id(&self) -> &PlayerId {
        &self.id
    }

    fn status(&self) -> AttendanceStatus {
        self.status
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}
