//! Status bar
//!
//! Shows the selected pin and the key bindings. A refused action replaces
//! the help text with a warning until the next frame is drawn.

use std::sync::{Arc, Mutex, PoisonError};

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use pinking_core::{BoardSnapshot, PinDirection, PinValue};

/// Key bindings shown when nothing else needs saying
pub const HELP: &str = "j/k/h/; move  d direction  t toggle  r read  R reset  q quit";

/// Pending "invalid action" warning
///
/// Set from the notification observer, consumed by the next draw.
#[derive(Debug, Clone, Default)]
pub struct Flash(Arc<Mutex<Option<usize>>>);

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warn about an action refused on `pin`
    pub fn raise(&self, pin: usize) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(pin);
    }

    /// Take the pending warning, if any
    pub fn take(&self) -> Option<usize> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }
}

fn describe(direction: PinDirection, value: PinValue) -> &'static str {
    match (direction, value) {
        (PinDirection::Undefined, _) => "reserved",
        (PinDirection::Input, PinValue::High) => "input, high",
        (PinDirection::Input, PinValue::Low) => "input, low",
        (PinDirection::Input, PinValue::Unknown) => "input",
        (PinDirection::Output, PinValue::High) => "output, high",
        (PinDirection::Output, PinValue::Low) => "output, low",
        (PinDirection::Output, PinValue::Unknown) => "output",
    }
}

/// One-line status bar
pub struct StatusBar<'a> {
    board: &'a BoardSnapshot,
    invalid: Option<usize>,
}

impl<'a> StatusBar<'a> {
    pub fn new(board: &'a BoardSnapshot, invalid: Option<usize>) -> Self {
        Self { board, invalid }
    }

    pub fn line(&self) -> Line<'static> {
        let layout = self.board.layout;
        let pin = self.board.selected;
        let name = layout.name(pin).unwrap_or("?");

        let position = match self.board.selected_pin() {
            Some(state) => format!(
                " {} pin {} {}: {} ",
                self.board.revision,
                layout.channel(pin),
                name,
                describe(state.direction, state.value())
            ),
            None => format!(" {} ", self.board.revision),
        };

        let tail = match self.invalid {
            Some(pin) => Span::styled(
                format!(
                    " pin {} ({}) cannot be changed",
                    layout.channel(pin),
                    layout.name(pin).unwrap_or("?")
                ),
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            None => Span::styled(format!(" {}", HELP), Style::default().fg(Color::DarkGray)),
        };

        Line::from(vec![
            Span::styled(position, Style::default().add_modifier(Modifier::REVERSED)),
            tail,
        ])
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.line()).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinking_core::board::{PinState, PinVec};
    use pinking_core::layout::PinLayout;

    static TINY: PinLayout = PinLayout::new(&["GND", "GPIO1", "GPIO2", "GND"]);

    fn board(selected: usize) -> BoardSnapshot {
        let mut pins: PinVec<PinState> = PinVec::new();
        for direction in [
            PinDirection::Undefined,
            PinDirection::Output,
            PinDirection::Input,
            PinDirection::Undefined,
        ] {
            let _ = pins.push(PinState {
                direction,
                out_value: PinValue::High,
                in_value: PinValue::Low,
            });
        }
        BoardSnapshot {
            revision: "tiny".into(),
            layout: &TINY,
            selected,
            pins,
        }
    }

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_describes_selection() {
        let line = StatusBar::new(&board(1), None).line();
        assert!(text(&line).starts_with(" tiny pin 2 GPIO1: output, high "));
        assert!(text(&line).ends_with(HELP));

        let line = StatusBar::new(&board(2), None).line();
        assert!(text(&line).contains("GPIO2: input, low"));
    }

    #[test]
    fn test_invalid_action_replaces_help() {
        let line = StatusBar::new(&board(0), Some(0)).line();
        assert!(text(&line).contains("pin 1 (GND) cannot be changed"));
        assert!(!text(&line).contains(HELP));
    }

    #[test]
    fn test_flash_is_consumed() {
        let flash = Flash::new();
        assert_eq!(flash.take(), None);
        flash.raise(3);
        assert_eq!(flash.clone().take(), Some(3));
        assert_eq!(flash.take(), None);
    }
}
