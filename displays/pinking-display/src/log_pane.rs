//! Log pane
//!
//! The terminal belongs to the UI, so log records are kept in memory and the
//! most recent ones are drawn under the pin grid.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

/// Anything that can hand out recent log lines
pub trait LogSource: Send + Sync {
    /// Up to `max` most recent lines, oldest first
    fn recent(&self, max: usize) -> Vec<String>;
}

/// Bordered view of the latest log lines
pub struct LogPane<'a> {
    source: &'a dyn LogSource,
}

impl<'a> LogPane<'a> {
    pub fn new(source: &'a dyn LogSource) -> Self {
        Self { source }
    }
}

impl Widget for LogPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::TOP)
            .title(" log ")
            .border_style(Style::default().fg(Color::DarkGray));
        let rows = block.inner(area).height as usize;
        let lines: Vec<Line> = self
            .source
            .recent(rows)
            .into_iter()
            .map(Line::from)
            .collect();
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
