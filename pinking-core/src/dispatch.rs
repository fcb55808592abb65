//! Event dispatch loop
//!
//! Single consumer of the event queue. Each iteration:
//!
//! 1. Redraws every dirty widget (a burst of changes costs one redraw)
//! 2. Blocks for the next event
//! 3. Offers the event to the handlers in order until one handles it
//!
//! The loop is the only place that triggers navigation and redraws.

use std::io;
use std::sync::mpsc::Receiver;

use log::{debug, error, info};
use pinking_hal::HardwareFault;

use crate::board::{BoardControl, BoardSnapshot};
use crate::commands::{EventHandler, Flow};
use crate::events::Event;

/// Something drawn from board snapshots
pub trait Redraw {
    /// Check if the widget changed since it was last drawn
    fn is_dirty(&self) -> bool;

    /// Draw the widget and clear its dirty flag
    fn redraw(&mut self, board: &BoardSnapshot) -> io::Result<()>;
}

/// Why the loop ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
    /// A handler asked to quit
    Quit,
    /// Every event source went away
    QueueClosed,
}

/// Why the loop halted
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("hardware fault: {0}")]
    Hardware(#[from] HardwareFault),
    #[error("render failed: {0}")]
    Render(#[from] io::Error),
}

/// Dispatch loop over one event queue
pub struct Dispatcher {
    events: Receiver<Event>,
    handlers: Vec<Box<dyn EventHandler>>,
    widgets: Vec<Box<dyn Redraw>>,
}

impl Dispatcher {
    /// Create a loop with no handlers or widgets
    pub fn new(events: Receiver<Event>) -> Self {
        Self {
            events,
            handlers: Vec::new(),
            widgets: Vec::new(),
        }
    }

    /// Append a handler; earlier handlers see events first
    pub fn with_handler(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Register a widget to redraw
    pub fn with_widget(mut self, widget: impl Redraw + 'static) -> Self {
        self.widgets.push(Box::new(widget));
        self
    }

    /// Redraw every dirty widget
    fn redraw(&mut self, board: &dyn BoardControl) -> io::Result<()> {
        if !self.widgets.iter().any(|w| w.is_dirty()) {
            return Ok(());
        }
        let snapshot = board.snapshot();
        for widget in self.widgets.iter_mut().filter(|w| w.is_dirty()) {
            widget.redraw(&snapshot)?;
        }
        Ok(())
    }

    /// Offer one event to the handlers
    ///
    /// The first handler that does not ignore the event ends the chain.
    pub fn dispatch(
        &mut self,
        event: &Event,
        board: &mut dyn BoardControl,
    ) -> Result<Flow, HardwareFault> {
        for handler in self.handlers.iter_mut() {
            match handler.handle(event, board)? {
                Flow::Ignored => continue,
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Ignored)
    }

    /// Run until a handler quits, the queue closes, or something fails
    pub fn run(&mut self, board: &mut dyn BoardControl) -> Result<Shutdown, DispatchError> {
        info!("Dispatch loop started");
        loop {
            self.redraw(board)?;

            let Ok(event) = self.events.recv() else {
                info!("Event queue closed");
                return Ok(Shutdown::QueueClosed);
            };

            match self.dispatch(&event, board) {
                Ok(Flow::Quit) => {
                    info!("Dispatch loop stopped");
                    return Ok(Shutdown::Quit);
                }
                Ok(Flow::Ignored) if event.is_user_event() => {
                    debug!("Unhandled event {:?}", event);
                }
                Ok(_) => {}
                Err(fault) => {
                    error!("Halting on hardware fault: {}", fault);
                    return Err(fault.into());
                }
            }
        }
    }
}
