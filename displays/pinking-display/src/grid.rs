//! Pin grid widget
//!
//! Draws the header as it sits on the board: two columns of pins with the
//! names on the outside and the channel numbers in the middle.
//!
//! ```text
//!    3V3 [ 1][ 2] 5V
//! GPIO02 [ 3][ 4] 5V
//! GPIO03 [ 5][ 6] GND
//! ```

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use pinking_core::board::PinState;
use pinking_core::{BoardSnapshot, PinDirection, PinValue};

/// Width of one `[nn]` channel cell
const CELL_WIDTH: usize = 4;

/// Base colour of a pin
///
/// Supply and ground pins are coloured by name, everything else by
/// direction.
pub fn pin_color(name: &str, direction: PinDirection) -> Option<Color> {
    match (name, direction) {
        ("5V" | "3V3", _) => Some(Color::Red),
        ("GND", _) => Some(Color::Yellow),
        (_, PinDirection::Input) => Some(Color::Cyan),
        (_, PinDirection::Output) => Some(Color::Green),
        (_, PinDirection::Undefined) => None,
    }
}

/// Modifiers shared by a pin's label and channel cell
fn emphasis(state: &PinState, selected: bool) -> Modifier {
    let mut modifier = Modifier::empty();
    if selected {
        modifier |= Modifier::BOLD;
    }
    if state.value() == PinValue::High {
        modifier |= Modifier::REVERSED;
    }
    modifier
}

/// Style of a pin's name
pub fn label_style(name: &str, state: &PinState, selected: bool) -> Style {
    let style = Style::default().add_modifier(emphasis(state, selected));
    match pin_color(name, state.direction) {
        Some(color) => style.fg(color),
        None => style,
    }
}

/// Style of a pin's channel cell
pub fn cell_style(state: &PinState, selected: bool) -> Style {
    Style::default().add_modifier(emphasis(state, selected))
}

/// Two-column view of every pin
pub struct PinGrid<'a> {
    board: &'a BoardSnapshot,
}

impl<'a> PinGrid<'a> {
    pub fn new(board: &'a BoardSnapshot) -> Self {
        Self { board }
    }

    /// Columns needed to draw the grid without clipping
    pub fn width(&self) -> u16 {
        let label = self.board.layout.label_width();
        (2 * label + 2 * CELL_WIDTH + 2) as u16
    }

    /// Rows needed to draw the grid
    pub fn height(&self) -> u16 {
        self.board.layout.rows() as u16
    }

    fn span(&self, pin: usize) -> (Span<'static>, Span<'static>) {
        let layout = self.board.layout;
        let width = layout.label_width();
        let name = layout.name(pin).unwrap_or("");
        let state = self.board.pins.get(pin).copied().unwrap_or_default();
        let selected = pin == self.board.selected;

        let label = if pin % 2 == 0 {
            format!("{:>width$}", name)
        } else {
            format!("{:<width$}", name)
        };
        let cell = format!("[{:2}]", layout.channel(pin));

        (
            Span::styled(label, label_style(name, &state, selected)),
            Span::styled(cell, cell_style(&state, selected)),
        )
    }

    /// One styled line per header row
    pub fn lines(&self) -> Vec<Line<'static>> {
        (0..self.board.layout.rows())
            .map(|row| {
                let (left_label, left_cell) = self.span(row * 2);
                let (right_label, right_cell) = self.span(row * 2 + 1);
                Line::from(vec![
                    left_label,
                    Span::raw(" "),
                    left_cell,
                    right_cell,
                    Span::raw(" "),
                    right_label,
                ])
            })
            .collect()
    }
}

impl Widget for PinGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.lines()).render(area, buf);
    }
}
