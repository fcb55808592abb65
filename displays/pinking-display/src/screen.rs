//! Full-screen layout
//!
//! Composes the pin grid, the log pane and the status bar into one frame.
//! The screen only marks itself dirty from notification observers; the
//! dispatch loop decides when to draw.

use std::io;
use std::sync::Arc;

use log::debug;
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Flex, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders};
use ratatui::{Frame, Terminal};

use pinking_core::notify::Notifier;
use pinking_core::{BoardSnapshot, Redraw};

use crate::dirty::DirtyFlag;
use crate::grid::PinGrid;
use crate::log_pane::{LogPane, LogSource};
use crate::status::{Flash, StatusBar};

/// Rows given to the log pane (including its border)
pub const LOG_ROWS: u16 = 8;

/// Terminal screen driven by board snapshots
pub struct Screen<B: Backend> {
    terminal: Terminal<B>,
    dirty: DirtyFlag,
    flash: Flash,
    logs: Option<Arc<dyn LogSource>>,
}

impl<B: Backend> Screen<B> {
    /// Create a screen and subscribe it to board changes
    pub fn new(terminal: Terminal<B>, notifier: &Notifier) -> Self {
        let dirty = DirtyFlag::new();
        let flash = Flash::new();

        let flag = dirty.clone();
        notifier.on_any(move || flag.mark());
        let pending = flash.clone();
        notifier.invalid_action.subscribe(move |event| pending.raise(event.pin));

        Self {
            terminal,
            dirty,
            flash,
            logs: None,
        }
    }

    /// Show a log pane fed by `source`
    pub fn with_logs(mut self, source: Arc<dyn LogSource>) -> Self {
        self.logs = Some(source);
        self
    }

    /// Handle for marking the screen dirty from elsewhere (e.g. new log lines)
    pub fn dirty_flag(&self) -> DirtyFlag {
        self.dirty.clone()
    }

    /// Underlying terminal
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    fn draw(&mut self, board: &BoardSnapshot) -> io::Result<()> {
        let invalid = self.flash.take();
        let logs = self.logs.clone();
        self.terminal
            .draw(|frame| render(frame, board, invalid, logs.as_deref()))?;
        Ok(())
    }
}

/// Lay out one frame
fn render(
    frame: &mut Frame,
    board: &BoardSnapshot,
    invalid: Option<usize>,
    logs: Option<&dyn LogSource>,
) {
    let log_rows = if logs.is_some() { LOG_ROWS } else { 0 };
    let [main, log_area, status_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(log_rows),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let grid = PinGrid::new(board);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" pinking {} ", board.revision))
        .border_style(Style::default().fg(Color::DarkGray));
    let [grid_area] = Layout::horizontal([Constraint::Length(grid.width() + 2)])
        .flex(Flex::Start)
        .areas(main);
    let [grid_area] = Layout::vertical([Constraint::Length(grid.height() + 2)])
        .flex(Flex::Start)
        .areas(grid_area);
    let inner = block.inner(grid_area);
    frame.render_widget(block, grid_area);
    frame.render_widget(grid, inner);

    if let Some(source) = logs {
        frame.render_widget(LogPane::new(source), log_area);
    }
    frame.render_widget(StatusBar::new(board, invalid), status_area);
}

impl<B: Backend> Redraw for Screen<B> {
    fn is_dirty(&self) -> bool {
        self.dirty.is_set()
    }

    fn redraw(&mut self, board: &BoardSnapshot) -> io::Result<()> {
        // Clear first so changes made while drawing schedule another frame
        self.dirty.take();
        debug!("Redraw (selected pin {})", board.selected);
        self.draw(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinking_core::{BoardControl, PinController};
    use pinking_hal_sim::SimGpio;
    use ratatui::backend::TestBackend;

    fn screen_text(screen: &Screen<TestBackend>) -> String {
        let buffer = screen.terminal().backend().buffer();
        let area = buffer.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    fn setup() -> (PinController<SimGpio>, Screen<TestBackend>) {
        let board = PinController::new(SimGpio::new(), "a01041").unwrap();
        let terminal = Terminal::new(TestBackend::new(100, 32)).unwrap();
        let screen = Screen::new(terminal, board.notifier());
        (board, screen)
    }

    #[test]
    fn test_first_frame() {
        let (board, mut screen) = setup();
        assert!(screen.is_dirty());
        screen.redraw(&board.snapshot()).unwrap();
        assert!(!screen.is_dirty());

        let text = screen_text(&screen);
        assert!(text.contains("pinking a01041"));
        assert!(text.contains("   3V3 [ 1][ 2] 5V"));
        assert!(text.contains("GPIO21"));
        assert!(text.contains("q quit"));
    }

    #[test]
    fn test_change_marks_dirty() {
        let (mut board, mut screen) = setup();
        screen.redraw(&board.snapshot()).unwrap();
        board.select(2);
        assert!(screen.is_dirty());
    }

    #[test]
    fn test_invalid_action_flash() {
        let (mut board, mut screen) = setup();
        board.invalid_action(0);
        screen.redraw(&board.snapshot()).unwrap();
        assert!(screen_text(&screen).contains("pin 1 (3V3) cannot be changed"));

        board.select(2);
        screen.redraw(&board.snapshot()).unwrap();
        assert!(!screen_text(&screen).contains("cannot be changed"));
    }

    struct OneLine;

    impl LogSource for OneLine {
        fn recent(&self, _max: usize) -> Vec<String> {
            vec!["INFO board ready".to_string()]
        }
    }

    #[test]
    fn test_log_pane() {
        let (board, screen) = setup();
        let mut screen = screen.with_logs(Arc::new(OneLine));
        screen.redraw(&board.snapshot()).unwrap();
        assert!(screen_text(&screen).contains("INFO board ready"));
    }
}
