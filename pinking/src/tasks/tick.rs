//! Poll tick source
//!
//! Inputs are sampled on every tick, so edges the backend misses still show
//! up within one interval.

use std::io;
use std::sync::mpsc::Sender;
use std::time::Duration;

use log::info;

use pinking_core::events::{spawn_ticker, Event};

/// Tick interval used when nothing else is configured
pub const TICK_INTERVAL_MS: u64 = 100;

/// Start the tick source; an interval of 0 starts nothing
pub fn spawn_tick(events: Sender<Event>, interval_ms: u64) -> io::Result<()> {
    if interval_ms > 0 {
        info!("Polling inputs every {}ms", interval_ms);
    }
    spawn_ticker(events, Duration::from_millis(interval_ms))
}
