//! Per-pin state and read-only snapshots

use heapless::Vec;
use pinking_hal::{Direction, Level};

use crate::layout::{PinLayout, MAX_PINS};

/// Direction of a pin as tracked by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinDirection {
    /// Reserved pin, or not configured yet
    #[default]
    Undefined,
    /// Sampled input
    Input,
    /// Driven output
    Output,
}

impl PinDirection {
    /// Flip Input and Output; Undefined stays Undefined
    pub fn toggled(self) -> Self {
        match self {
            PinDirection::Undefined => PinDirection::Undefined,
            PinDirection::Input => PinDirection::Output,
            PinDirection::Output => PinDirection::Input,
        }
    }

    /// Hardware direction, if defined
    pub fn hardware(self) -> Option<Direction> {
        match self {
            PinDirection::Undefined => None,
            PinDirection::Input => Some(Direction::In),
            PinDirection::Output => Some(Direction::Out),
        }
    }
}

/// Logic value of a pin as tracked by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinValue {
    Low,
    High,
    /// Not sampled, or not meaningful for the pin's direction
    #[default]
    Unknown,
}

impl PinValue {
    /// Hardware level, if known
    pub fn level(self) -> Option<Level> {
        match self {
            PinValue::Low => Some(Level::Low),
            PinValue::High => Some(Level::High),
            PinValue::Unknown => None,
        }
    }

    /// Flip Low and High; Unknown stays Unknown
    pub fn toggled(self) -> Self {
        match self {
            PinValue::Low => PinValue::High,
            PinValue::High => PinValue::Low,
            PinValue::Unknown => PinValue::Unknown,
        }
    }
}

impl From<Level> for PinValue {
    fn from(level: Level) -> Self {
        match level {
            Level::Low => PinValue::Low,
            Level::High => PinValue::High,
        }
    }
}

/// State of one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinState {
    pub direction: PinDirection,
    /// Last driven value (Output only)
    pub out_value: PinValue,
    /// Last sampled value (Input only)
    pub in_value: PinValue,
}

impl PinState {
    /// Value shown for this pin in its current direction
    pub fn value(&self) -> PinValue {
        match self.direction {
            PinDirection::Undefined => PinValue::Unknown,
            PinDirection::Input => self.in_value,
            PinDirection::Output => self.out_value,
        }
    }
}

/// Fixed-capacity vector of per-pin entries
pub type PinVec<T> = Vec<T, MAX_PINS>;

/// Output values with every non-output pin masked to Unknown
pub fn out_values(pins: &[PinState]) -> PinVec<PinValue> {
    pins.iter()
        .map(|p| match p.direction {
            PinDirection::Output => p.out_value,
            _ => PinValue::Unknown,
        })
        .collect()
}

/// Input values with every non-input pin masked to Unknown
pub fn in_values(pins: &[PinState]) -> PinVec<PinValue> {
    pins.iter()
        .map(|p| match p.direction {
            PinDirection::Input => p.in_value,
            _ => PinValue::Unknown,
        })
        .collect()
}

/// Read-only copy of the board for rendering
///
/// The layout is borrowed from the static table, never copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    pub revision: String,
    pub layout: &'static PinLayout,
    pub selected: usize,
    pub pins: PinVec<PinState>,
}

impl BoardSnapshot {
    /// Number of pins
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// Check if the board has no pins
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Directions of all pins
    pub fn directions(&self) -> PinVec<PinDirection> {
        self.pins.iter().map(|p| p.direction).collect()
    }

    /// Input values (non-inputs masked)
    pub fn in_values(&self) -> PinVec<PinValue> {
        in_values(&self.pins)
    }

    /// Output values (non-outputs masked)
    pub fn out_values(&self) -> PinVec<PinValue> {
        out_values(&self.pins)
    }

    /// State of the selected pin
    pub fn selected_pin(&self) -> Option<&PinState> {
        self.pins.get(self.selected)
    }
}
