//! pinking Hardware Abstraction Layer
//!
//! This crate defines the GPIO capability consumed by the pin-state
//! controller. Backends (real hardware, simulation) implement [`Gpio`]
//! so the controller never has to know which one it is talking to.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (pinking, pinking-core)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pinking-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ pinking-hal-  │       │ pinking-hal-  │
//! │    rppal      │       │     sim       │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::Gpio`] - Pin setup, level read/write, edge detection, cleanup
//! - [`session::Session`] - Scoped ownership that always runs `cleanup()`

#![deny(unsafe_code)]

pub mod gpio;
pub mod session;

// Re-export key types at crate root for convenience
pub use gpio::{
    BoardInfo, Channel, Direction, Edge, EdgeCallback, Gpio, HardwareFault, Level, NumberingMode,
    Pull,
};
pub use session::Session;
