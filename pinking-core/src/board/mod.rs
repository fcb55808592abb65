//! Pin state controller
//!
//! The controller is the only owner of per-pin direction and value state.
//! Command handlers reach it through the [`BoardControl`] trait; widgets only
//! ever see a [`BoardSnapshot`].

mod controller;
mod state;

pub use controller::PinController;
pub use state::{in_values, out_values, BoardSnapshot, PinDirection, PinState, PinValue, PinVec};

use pinking_hal::HardwareFault;

use crate::layout::LayoutError;
use crate::notify::Notifier;

/// Errors raised while bringing up a board
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BoardError {
    /// Revision has no entry in the layout table
    #[error("no pin layout for board revision {0:?}")]
    LayoutNotFound(String),
    /// Layout breaks the two-column or uniqueness rules
    #[error("invalid pin layout: {0}")]
    InvalidLayout(#[from] LayoutError),
    /// Capability call failed during start-up
    #[error(transparent)]
    Hardware(#[from] HardwareFault),
}

/// State-mutation role of the controller
///
/// Object safe so command handlers need not know the GPIO backend.
pub trait BoardControl {
    /// Number of pins on the board
    fn pin_count(&self) -> usize;

    /// Index of the selected pin
    fn selected(&self) -> usize;

    /// Move the selection; emits `SelectionChanged` if it moved
    fn select(&mut self, pin: usize);

    /// Current state of one pin
    fn pin(&self, pin: usize) -> Option<PinState>;

    /// Check if a pin is reserved
    fn is_reserved(&self, pin: usize) -> bool;

    /// Change a pin's direction
    ///
    /// On a fault the pin state and notifications are untouched, but the
    /// hardware may already be partly reconfigured (for example set up as an
    /// input without edge detection). Run `reset_channels` to bring both
    /// back in line.
    fn set_direction(&mut self, pin: usize, direction: PinDirection)
        -> Result<(), HardwareFault>;

    /// Drive an output pin
    fn set_output_value(&mut self, pin: usize, value: PinValue) -> Result<(), HardwareFault>;

    /// Sample every input; returns whether anything changed
    fn read_input_values(&mut self) -> Result<bool, HardwareFault>;

    /// Every non-reserved pin to Input, then sample once
    fn reset_channels(&mut self) -> Result<(), HardwareFault>;

    /// Report a refused action on a pin
    fn invalid_action(&mut self, pin: usize);

    /// Read-only copy for rendering
    fn snapshot(&self) -> BoardSnapshot;

    /// Notification topics
    fn notifier(&self) -> &Notifier;
}
