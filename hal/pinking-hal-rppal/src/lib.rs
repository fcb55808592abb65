//! Raspberry Pi GPIO backend
//!
//! Implements the `pinking-hal` capability on top of `rppal`:
//!
//! - Physical (board) numbering translated to BCM lines
//! - Inputs with configurable pull resistors
//! - Edge detection through rppal's asynchronous interrupts, which run
//!   callbacks on an rppal-owned thread
//! - Board identification from `/proc/cpuinfo`
//!
//! Pins are claimed lazily on `setup` and released by dropping them, which
//! restores their original mode.

#![deny(unsafe_code)]

pub mod cpuinfo;
pub mod pins;

use std::collections::HashMap;

use log::{debug, info};
use pinking_hal::{
    BoardInfo, Channel, Direction, Edge, EdgeCallback, Gpio, HardwareFault, Level, NumberingMode,
    Pull,
};
use rppal::gpio::{InputPin, OutputPin, Trigger};

pub use pins::board_to_bcm;

/// A claimed line in its current direction
enum Line {
    Input(InputPin),
    Output(OutputPin),
}

/// GPIO backend for Raspberry Pi boards
pub struct RppalGpio {
    gpio: rppal::gpio::Gpio,
    mode: Option<NumberingMode>,
    lines: HashMap<Channel, Line>,
    info: Option<BoardInfo>,
}

impl RppalGpio {
    /// Open the GPIO peripheral
    ///
    /// Fails on machines without a supported SoC or without permission
    /// to access the GPIO device.
    pub fn new() -> Result<Self, HardwareFault> {
        let gpio =
            rppal::gpio::Gpio::new().map_err(|e| HardwareFault::Unavailable(e.to_string()))?;
        let info = cpuinfo::read_board_info();
        if let Some(info) = &info {
            info!("Detected board {} (revision {})", info.model, info.revision);
        }

        Ok(Self {
            gpio,
            mode: None,
            lines: HashMap::new(),
            info,
        })
    }

    /// Translate a channel into a BCM line under the current mode
    fn bcm(&self, channel: Channel) -> Result<u8, HardwareFault> {
        match self.mode {
            None => Err(HardwareFault::ModeNotSet),
            Some(NumberingMode::Board) => {
                board_to_bcm(channel).ok_or(HardwareFault::InvalidChannel(channel))
            }
            Some(NumberingMode::Bcm) => Ok(channel),
        }
    }
}

fn io_fault(channel: Channel) -> impl Fn(rppal::gpio::Error) -> HardwareFault {
    move |e| HardwareFault::Io {
        channel,
        message: e.to_string(),
    }
}

fn to_rppal(level: Level) -> rppal::gpio::Level {
    match level {
        Level::Low => rppal::gpio::Level::Low,
        Level::High => rppal::gpio::Level::High,
    }
}

fn from_rppal(level: rppal::gpio::Level) -> Level {
    match level {
        rppal::gpio::Level::Low => Level::Low,
        rppal::gpio::Level::High => Level::High,
    }
}

fn trigger(edge: Edge) -> Trigger {
    match edge {
        Edge::Rising => Trigger::RisingEdge,
        Edge::Falling => Trigger::FallingEdge,
        Edge::Both => Trigger::Both,
    }
}

impl Gpio for RppalGpio {
    fn set_mode(&mut self, mode: NumberingMode) -> Result<(), HardwareFault> {
        debug!("rppal: numbering mode {:?}", mode);
        self.mode = Some(mode);
        Ok(())
    }

    fn setup(
        &mut self,
        channel: Channel,
        direction: Direction,
        pull: Pull,
    ) -> Result<(), HardwareFault> {
        let bcm = self.bcm(channel)?;

        // rppal hands out each line once; give the old handle back first
        self.lines.remove(&channel);
        let pin = self.gpio.get(bcm).map_err(io_fault(channel))?;

        let line = match direction {
            Direction::In => Line::Input(match pull {
                Pull::Off => pin.into_input(),
                Pull::Down => pin.into_input_pulldown(),
                Pull::Up => pin.into_input_pullup(),
            }),
            Direction::Out => Line::Output(pin.into_output()),
        };
        debug!(
            "rppal: channel {} (BCM {}) set up as {:?}, pull {:?}",
            channel, bcm, direction, pull
        );
        self.lines.insert(channel, line);
        Ok(())
    }

    fn output(&mut self, channel: Channel, level: Level) -> Result<(), HardwareFault> {
        match self.lines.get_mut(&channel) {
            Some(Line::Output(pin)) => {
                pin.write(to_rppal(level));
                Ok(())
            }
            _ => Err(HardwareFault::WrongDirection {
                channel,
                expected: Direction::Out,
            }),
        }
    }

    fn input(&mut self, channel: Channel) -> Result<Level, HardwareFault> {
        match self.lines.get(&channel) {
            Some(Line::Input(pin)) => Ok(from_rppal(pin.read())),
            Some(Line::Output(pin)) => Ok(Level::from(pin.is_set_high())),
            None => Err(HardwareFault::WrongDirection {
                channel,
                expected: Direction::In,
            }),
        }
    }

    fn add_edge_detect(
        &mut self,
        channel: Channel,
        edge: Edge,
        mut callback: EdgeCallback,
    ) -> Result<(), HardwareFault> {
        match self.lines.get_mut(&channel) {
            Some(Line::Input(pin)) => pin
                .set_async_interrupt(trigger(edge), move |level| {
                    callback(channel, from_rppal(level))
                })
                .map_err(io_fault(channel)),
            _ => Err(HardwareFault::WrongDirection {
                channel,
                expected: Direction::In,
            }),
        }
    }

    fn remove_edge_detect(&mut self, channel: Channel) -> Result<(), HardwareFault> {
        match self.lines.get_mut(&channel) {
            Some(Line::Input(pin)) => pin.clear_async_interrupt().map_err(io_fault(channel)),
            _ => Ok(()),
        }
    }

    fn cleanup(&mut self) -> Result<(), HardwareFault> {
        let mut result = Ok(());
        for (channel, line) in self.lines.iter_mut() {
            if let Line::Input(pin) = line {
                if let Err(e) = pin.clear_async_interrupt() {
                    result = Err(io_fault(*channel)(e));
                }
            }
        }
        // Dropping the handles resets every line to its original mode
        let released = self.lines.len();
        self.lines.clear();
        self.mode = None;
        info!("rppal: released {} lines", released);
        result
    }

    fn board_info(&self) -> Option<BoardInfo> {
        self.info.clone()
    }

    fn name(&self) -> &'static str {
        "rppal"
    }
}
