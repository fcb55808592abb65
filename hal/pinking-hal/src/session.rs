//! Scoped GPIO ownership
//!
//! Wraps a backend so `cleanup()` runs when the wrapper goes out of scope,
//! on normal return, early `?` exits and unwinding panics alike. Pins are
//! never left configured as outputs after the process ends.

use log::{debug, warn};

use crate::gpio::{
    BoardInfo, Channel, Direction, Edge, EdgeCallback, Gpio, HardwareFault, Level, NumberingMode,
    Pull,
};

/// GPIO backend that cleans up on drop
pub struct Session<G: Gpio> {
    gpio: G,
    released: bool,
}

impl<G: Gpio> Session<G> {
    /// Take ownership of a backend
    pub fn new(gpio: G) -> Self {
        Self {
            gpio,
            released: false,
        }
    }

    /// Access the wrapped backend
    pub fn inner(&self) -> &G {
        &self.gpio
    }

    /// Run cleanup now and report its result
    ///
    /// Dropping afterwards does not clean up a second time.
    pub fn release(&mut self) -> Result<(), HardwareFault> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        debug!("Releasing {} GPIO", self.gpio.name());
        self.gpio.cleanup()
    }
}

impl<G: Gpio> Drop for Session<G> {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!("GPIO cleanup failed: {}", e);
        }
    }
}

impl<G: Gpio> Gpio for Session<G> {
    fn set_mode(&mut self, mode: NumberingMode) -> Result<(), HardwareFault> {
        self.released = false;
        self.gpio.set_mode(mode)
    }

    fn setup(
        &mut self,
        channel: Channel,
        direction: Direction,
        pull: Pull,
    ) -> Result<(), HardwareFault> {
        self.released = false;
        self.gpio.setup(channel, direction, pull)
    }

    fn output(&mut self, channel: Channel, level: Level) -> Result<(), HardwareFault> {
        self.gpio.output(channel, level)
    }

    fn input(&mut self, channel: Channel) -> Result<Level, HardwareFault> {
        self.gpio.input(channel)
    }

    fn add_edge_detect(
        &mut self,
        channel: Channel,
        edge: Edge,
        callback: EdgeCallback,
    ) -> Result<(), HardwareFault> {
        self.gpio.add_edge_detect(channel, edge, callback)
    }

    fn remove_edge_detect(&mut self, channel: Channel) -> Result<(), HardwareFault> {
        self.gpio.remove_edge_detect(channel)
    }

    fn cleanup(&mut self) -> Result<(), HardwareFault> {
        self.release()
    }

    fn board_info(&self) -> Option<BoardInfo> {
        self.gpio.board_info()
    }

    fn name(&self) -> &'static str {
        self.gpio.name()
    }
}
