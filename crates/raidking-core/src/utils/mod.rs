//! Utility functions for string formatting and comparison.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{contains_ignore_case, eq_ignore_case, truncate_string};
