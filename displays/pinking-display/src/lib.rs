//! Terminal widgets for the pinking GPIO inspector
//!
//! This crate provides:
//! - `PinGrid`, the two-column header view
//! - `StatusBar` with key help and "invalid action" warnings
//! - `LogPane` over any `LogSource`
//! - `Screen`, which composes them and implements the dispatch loop's
//!   `Redraw` contract
//!
//! # Architecture
//!
//! Widgets never read the controller directly. They subscribe to its
//! notifications only to set a `DirtyFlag`, and draw from the snapshot the
//! dispatch loop hands them. Rendering goes through ratatui, so any ratatui
//! backend works (crossterm in the binary, `TestBackend` in tests).

#![deny(unsafe_code)]

pub mod dirty;
pub mod grid;
pub mod log_pane;
pub mod screen;
pub mod status;

// Re-export key types
pub use dirty::DirtyFlag;
pub use grid::PinGrid;
pub use log_pane::{LogPane, LogSource};
pub use screen::Screen;
pub use status::{Flash, StatusBar, HELP};
