//! Keyboard source
//!
//! Reads terminal events with crossterm and forwards key presses. Resizes
//! only need a fresh frame: they mark the screen dirty and wake the loop.

use std::io;
use std::sync::mpsc::Sender;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::error;

use pinking_core::events::{spawn_source, Event, Key};
use pinking_display::DirtyFlag;

/// Translate a terminal key event
///
/// Releases and repeats are dropped. Ctrl-C quits, since raw mode swallows
/// the signal.
pub fn map_key(key: KeyEvent) -> Option<Key> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Key::Char('q')),
            _ => Some(Key::Other),
        };
    }

    Some(match key.code {
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Enter => Key::Enter,
        KeyCode::Char(c) => Key::Char(c),
        _ => Key::Other,
    })
}

/// Start the keyboard source
pub fn spawn_input(events: Sender<Event>, dirty: DirtyFlag) -> io::Result<()> {
    spawn_source("input", events, move || loop {
        match event::read() {
            Ok(TermEvent::Key(key)) => {
                if let Some(key) = map_key(key) {
                    return Some(Event::Keypress(key));
                }
            }
            Ok(TermEvent::Resize(..)) => {
                dirty.mark();
                return Some(Event::Redraw);
            }
            Ok(_) => {}
            Err(e) => {
                error!("Terminal input failed: {}", e);
                return None;
            }
        }
    })
}
