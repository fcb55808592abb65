//! Event source threads
//!
//! Each source runs independently and only pushes onto the event queue.

pub mod input;
pub mod tick;

pub use input::spawn_input;
pub use tick::spawn_tick;
