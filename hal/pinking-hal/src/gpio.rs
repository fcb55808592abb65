//! GPIO capability
//!
//! Provides the trait every GPIO backend implements, plus the small value
//! types that cross the boundary (levels, pulls, edges).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical (1-indexed) header pin number
pub type Channel = u8;

/// Callback invoked by a backend when an input changes level
///
/// Backends may call this from a thread they own (interrupt-style), so it
/// must be `Send`. It receives the channel and the level sampled at the edge.
pub type EdgeCallback = Box<dyn FnMut(Channel, Level) + Send + 'static>;

/// Pin numbering scheme used for channel arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberingMode {
    /// Physical header positions (1..=40 on a 40-pin header)
    Board,
    /// SoC GPIO line numbers
    Bcm,
}

/// Hardware pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Pin samples an external level
    In,
    /// Pin drives a level
    Out,
}

/// Pull resistor applied to an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Pull {
    /// No pull resistor (floating)
    Off,
    /// Pull towards ground
    #[default]
    Down,
    /// Pull towards the supply rail
    Up,
}

/// Logic level of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic 0
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Return the opposite level
    pub fn toggled(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }

    /// Check if the level is high
    pub fn is_high(self) -> bool {
        self == Level::High
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Which input transitions trigger edge detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// Low to high
    Rising,
    /// High to low
    Falling,
    /// Any change
    Both,
}

impl Edge {
    /// Check if a transition from `from` to `to` matches this edge
    pub fn matches(self, from: Level, to: Level) -> bool {
        match self {
            Edge::Rising => from == Level::Low && to == Level::High,
            Edge::Falling => from == Level::High && to == Level::Low,
            Edge::Both => from != to,
        }
    }
}

/// Board identification reported by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardInfo {
    /// Hardware revision code (e.g. `a01041`)
    pub revision: String,
    /// Human readable model name
    pub model: String,
}

/// Errors reported by a GPIO backend
///
/// A fault leaves the physical pin in an unknown state. Callers must not
/// retry blindly; the safe recovery is to re-run the pin reset sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardwareFault {
    /// Backend could not be opened (missing device, permissions)
    #[error("GPIO backend unavailable: {0}")]
    Unavailable(String),
    /// Channel does not map to a usable GPIO line
    #[error("channel {0} is not a usable GPIO")]
    InvalidChannel(Channel),
    /// Numbering mode not supported by this backend
    #[error("numbering mode {0:?} is not supported")]
    UnsupportedMode(NumberingMode),
    /// Operation issued before `set_mode`
    #[error("numbering mode has not been set")]
    ModeNotSet,
    /// Operation needs the channel configured in a different direction
    #[error("channel {channel} is not set up as {expected:?}")]
    WrongDirection {
        /// Offending channel
        channel: Channel,
        /// Direction the operation requires
        expected: Direction,
    },
    /// Low-level I/O failure
    #[error("I/O error on channel {channel}: {message}")]
    Io {
        /// Offending channel
        channel: Channel,
        /// Backend error text
        message: String,
    },
}

/// GPIO capability
///
/// Implementations own the hardware (or its simulation). Every operation
/// may fail with a [`HardwareFault`]; failures are fatal for the operation
/// attempted.
pub trait Gpio {
    /// Select the numbering scheme used for channel arguments
    fn set_mode(&mut self, mode: NumberingMode) -> Result<(), HardwareFault>;

    /// Configure a channel's direction and pull resistor
    fn setup(
        &mut self,
        channel: Channel,
        direction: Direction,
        pull: Pull,
    ) -> Result<(), HardwareFault>;

    /// Drive an output channel to `level`
    fn output(&mut self, channel: Channel, level: Level) -> Result<(), HardwareFault>;

    /// Sample a channel's level
    ///
    /// Takes `&mut self` because some backends track read state.
    fn input(&mut self, channel: Channel) -> Result<Level, HardwareFault>;

    /// Register `callback` for level changes on an input channel
    ///
    /// Replaces any callback already registered for the channel.
    fn add_edge_detect(
        &mut self,
        channel: Channel,
        edge: Edge,
        callback: EdgeCallback,
    ) -> Result<(), HardwareFault>;

    /// Remove edge detection from a channel
    ///
    /// Removing from a channel without edge detection is not an error.
    fn remove_edge_detect(&mut self, channel: Channel) -> Result<(), HardwareFault>;

    /// Release every channel this backend configured
    fn cleanup(&mut self) -> Result<(), HardwareFault>;

    /// Describe the board, if the backend knows it
    fn board_info(&self) -> Option<BoardInfo> {
        None
    }

    /// Short backend name for logs and the startup banner
    fn name(&self) -> &'static str;
}

impl<G: Gpio + ?Sized> Gpio for Box<G> {
    fn set_mode(&mut self, mode: NumberingMode) -> Result<(), HardwareFault> {
        (**self).set_mode(mode)
    }

    fn setup(
        &mut self,
        channel: Channel,
        direction: Direction,
        pull: Pull,
    ) -> Result<(), HardwareFault> {
        (**self).setup(channel, direction, pull)
    }

    fn output(&mut self, channel: Channel, level: Level) -> Result<(), HardwareFault> {
        (**self).output(channel, level)
    }

    fn input(&mut self, channel: Channel) -> Result<Level, HardwareFault> {
        (**self).input(channel)
    }

    fn add_edge_detect(
        &mut self,
        channel: Channel,
        edge: Edge,
        callback: EdgeCallback,
    ) -> Result<(), HardwareFault> {
        (**self).add_edge_detect(channel, edge, callback)
    }

    fn remove_edge_detect(&mut self, channel: Channel) -> Result<(), HardwareFault> {
        (**self).remove_edge_detect(channel)
    }

    fn cleanup(&mut self) -> Result<(), HardwareFault> {
        (**self).cleanup()
    }

    fn board_info(&self) -> Option<BoardInfo> {
        (**self).board_info()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_toggle() {
        assert_eq!(Level::Low.toggled(), Level::High);
        assert_eq!(Level::High.toggled(), Level::Low);
        assert!(Level::from(true).is_high());
        assert!(!Level::from(false).is_high());
    }

    #[test]
    fn test_edge_matches() {
        assert!(Edge::Rising.matches(Level::Low, Level::High));
        assert!(!Edge::Rising.matches(Level::High, Level::Low));
        assert!(Edge::Falling.matches(Level::High, Level::Low));
        assert!(!Edge::Falling.matches(Level::Low, Level::High));
        assert!(Edge::Both.matches(Level::Low, Level::High));
        assert!(Edge::Both.matches(Level::High, Level::Low));
        assert!(!Edge::Both.matches(Level::High, Level::High));
    }

    #[test]
    fn test_fault_messages() {
        let fault = HardwareFault::WrongDirection {
            channel: 7,
            expected: Direction::Out,
        };
        assert_eq!(fault.to_string(), "channel 7 is not set up as Out");
        assert_eq!(
            HardwareFault::InvalidChannel(1).to_string(),
            "channel 1 is not a usable GPIO"
        );
    }

    #[test]
    fn test_default_pull_is_down() {
        assert_eq!(Pull::default(), Pull::Down);
    }
}
