//! Non-interactive pin exercise
//!
//! Walks every usable pin through Output, High, Low and back to Input. Handy
//! for checking wiring with a logic probe or LEDs, without a terminal UI.

use std::fmt;
use std::thread;
use std::time::Duration;

use log::info;

use pinking_core::{BoardControl, PinDirection, PinValue};
use pinking_hal::HardwareFault;

/// Outcome of one exercise run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Pins driven High and Low
    pub exercised: usize,
    /// Reserved pins left alone
    pub skipped: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Exercised {} pins ({} reserved pins skipped)",
            self.exercised, self.skipped
        )
    }
}

/// Exercise every non-reserved pin
///
/// `dwell` is how long each level is held. The board is left with every
/// usable pin as an input.
pub fn run(board: &mut dyn BoardControl, dwell: Duration) -> Result<Summary, HardwareFault> {
    board.reset_channels()?;

    let mut summary = Summary::default();
    for pin in 0..board.pin_count() {
        if board.is_reserved(pin) {
            summary.skipped += 1;
            continue;
        }

        board.select(pin);
        info!("Exercising pin {}", pin + 1);
        board.set_direction(pin, PinDirection::Output)?;
        for value in [PinValue::High, PinValue::Low] {
            board.set_output_value(pin, value)?;
            if !dwell.is_zero() {
                thread::sleep(dwell);
            }
        }
        board.set_direction(pin, PinDirection::Input)?;
        summary.exercised += 1;
    }

    board.select(0);
    info!("{}", summary);
    Ok(summary)
}
