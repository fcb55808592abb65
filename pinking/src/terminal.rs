//! Terminal mode guard
//!
//! Switches the terminal into raw mode and the alternate screen for the UI
//! and restores it when dropped, including on early returns.

use std::io::{self, stdout};

use crossterm::cursor::{Hide, Show};
use crossterm::execute;
use log::{debug, info};
use ratatui::DefaultTerminal;

use crate::logger;

/// Restores the terminal on drop
pub struct TerminalGuard;

impl TerminalGuard {
    /// Enter UI mode and hand out the terminal
    ///
    /// Log echo to stderr is switched off while the guard lives.
    pub fn start() -> io::Result<(Self, DefaultTerminal)> {
        let terminal = ratatui::try_init()?;
        logger::set_echo(false);
        execute!(stdout(), Hide)?;
        info!("Terminal UI started");
        Ok((Self, terminal))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        ratatui::restore();
        let _ = execute!(stdout(), Show);
        logger::set_echo(true);
        debug!("Terminal restored");
    }
}
