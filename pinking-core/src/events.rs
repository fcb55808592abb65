//! Input events and their sources
//!
//! Every source runs on its own daemon thread and only ever pushes onto the
//! shared queue. Sources are never joined; they stop when the receiver is
//! dropped or the process exits.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::notify::Notifier;

/// Key identity after translation from the terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Char(char),
    /// Anything the application has no binding for
    Other,
}

/// Events consumed by the dispatch loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Key pressed by the operator
    Keypress(Key),
    /// Periodic poll tick
    Tick,
    /// Wake-up after a change made off the dispatch thread; handlers ignore it
    Redraw,
}

impl Event {
    /// Check if this event came from the operator
    pub fn is_user_event(&self) -> bool {
        matches!(self, Event::Keypress(_))
    }
}

/// Create the event queue shared by all sources
pub fn queue() -> (Sender<Event>, Receiver<Event>) {
    mpsc::channel()
}

/// Spawn a source thread
///
/// `next` blocks until it has an event; returning `None` ends the source.
pub fn spawn_source<F>(name: &str, events: Sender<Event>, mut next: F) -> io::Result<()>
where
    F: FnMut() -> Option<Event> + Send + 'static,
{
    let label = name.to_string();
    thread::Builder::new().name(label.clone()).spawn(move || {
        debug!("Event source {} started", label);
        while let Some(event) = next() {
            if events.send(event).is_err() {
                break;
            }
        }
        debug!("Event source {} stopped", label);
    })?;
    Ok(())
}

/// Wake the dispatch loop whenever input values change
///
/// Edge callbacks run on a backend thread and only mark widgets dirty; the
/// loop would not notice until the next event. Sending never blocks.
pub fn wake_on_input_change(notifier: &Notifier, events: Sender<Event>) {
    notifier.in_values_changed.subscribe(move |_| {
        let _ = events.send(Event::Redraw);
    });
}

/// Spawn a fixed-rate tick source
///
/// Ticks are scheduled against deadlines rather than sleeps so the rate does
/// not drift with the loop's own latency.
pub fn spawn_ticker(events: Sender<Event>, interval: Duration) -> io::Result<()> {
    if interval.is_zero() {
        warn!("Tick interval is zero; polling disabled");
        return Ok(());
    }

    let mut deadline = Instant::now() + interval;
    spawn_source("tick", events, move || {
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }
        deadline += interval;
        // Skip missed ticks instead of bursting
        let now = Instant::now();
        if deadline < now {
            deadline = now + interval;
        }
        Some(Event::Tick)
    })
}
