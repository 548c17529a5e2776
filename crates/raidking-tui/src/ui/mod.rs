//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `roster`: The raid table and member detail panel

pub mod input;
pub mod render;
pub mod roster;
pub mod styles;
