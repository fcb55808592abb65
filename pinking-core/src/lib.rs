//! Board-agnostic core of the pinking GPIO inspector
//!
//! This crate contains everything that does not depend on a particular GPIO
//! backend or terminal:
//!
//! - Pin layout table (revision code to header pin names)
//! - Pin state controller and its change notifications
//! - Event types, event source threads and the dispatch loop
//! - Key bindings for navigation and pin commands

#![deny(unsafe_code)]

pub mod board;
pub mod commands;
pub mod dispatch;
pub mod events;
pub mod layout;
pub mod notify;

pub use board::{BoardControl, BoardError, BoardSnapshot, PinController, PinDirection, PinValue};
pub use commands::{AppCommands, EventHandler, Flow, PinCommands};
pub use dispatch::{DispatchError, Dispatcher, Redraw, Shutdown};
pub use events::{Event, Key};
pub use layout::PinLayout;
