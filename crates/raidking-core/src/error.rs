use thiserror::Error;

use crate::models::{PlayerId, TableId};

/// Maximum length for a name echoed back in an error message
const MAX_ERROR_NAME_LENGTH: usize = 40;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("Invalid reorder: {0}")]
    InvalidReorder(String),

    #[error("A player named '{0}' already exists")]
    DuplicatePlayer(String),

    #[error("Name must not be empty")]
    EmptyName,

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Unknown table: {0}")]
    UnknownTable(TableId),

    #[error("Cannot remove the last raid table")]
    LastTable,
}

impl RosterError {
    /// Duplicate-name error with the offending name shortened for display
    pub fn duplicate(name: &str) -> Self {
        RosterError::DuplicatePlayer(crate::utils::truncate_string(name, MAX_ERROR_NAME_LENGTH))
    }

    /// Swap referencing the same entry twice
    pub fn same_entry(id: &PlayerId) -> Self {
        RosterError::InvalidReorder(format!("cannot swap {} with itself", id))
    }

    /// Swap referencing an entry that is not in the roster
    pub fn missing_entry(id: &PlayerId) -> Self {
        RosterError::InvalidReorder(format!("{} is not in this roster", id))
    }
}
