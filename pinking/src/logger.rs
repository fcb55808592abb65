//! In-memory logger
//!
//! The terminal belongs to the UI while it runs, so records go into a fixed
//! ring of recent lines shown in the log pane. Once the ring is full the
//! oldest line is dropped. Until the UI starts (and in exercise mode) records are
//! echoed to stderr as well.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use heapless::{Deque, String};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use pinking_display::{DirtyFlag, LogSource};

/// Lines kept in memory
pub const LOG_LINES: usize = 64;

/// Longest stored line; longer records are cut
pub const LINE_LEN: usize = 160;

type LogLine = String<LINE_LEN>;

/// Fixed-capacity ring of formatted lines
pub struct LogRing {
    lines: Deque<LogLine, LOG_LINES>,
}

impl LogRing {
    pub const fn new() -> Self {
        Self {
            lines: Deque::new(),
        }
    }

    /// Append a line, dropping the oldest one when full
    pub fn push(&mut self, text: &str) {
        let mut line = LogLine::new();
        for c in text.chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        if self.lines.is_full() {
            self.lines.pop_front();
        }
        let _ = self.lines.push_back(line);
    }

    /// Up to `max` newest lines, oldest first
    pub fn recent(&self, max: usize) -> Vec<std::string::String> {
        let skip = self.lines.len().saturating_sub(max);
        self.lines
            .iter()
            .skip(skip)
            .map(|line| line.as_str().to_owned())
            .collect()
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new()
    }
}

struct RingLogger {
    ring: Mutex<LogRing>,
    echo: AtomicBool,
    dirty: OnceLock<DirtyFlag>,
}

static LOGGER: RingLogger = RingLogger {
    ring: Mutex::new(LogRing::new()),
    echo: AtomicBool::new(true),
    dirty: OnceLock::new(),
};

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let text = format!("{:<5} {}", record.level(), record.args());
        if self.echo.load(Ordering::Relaxed) {
            eprintln!("{}", text);
        }
        self.ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(&text);
        if let Some(dirty) = self.dirty.get() {
            dirty.mark();
        }
    }

    fn flush(&self) {}
}

/// Install the logger
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Echo records to stderr (on by default)
pub fn set_echo(enabled: bool) {
    LOGGER.echo.store(enabled, Ordering::Relaxed);
}

/// Mark `flag` dirty whenever a record arrives
///
/// Only the first flag registered is kept.
pub fn notify(flag: DirtyFlag) {
    let _ = LOGGER.dirty.set(flag);
}

/// Log pane source backed by the installed logger
#[derive(Debug, Clone, Copy, Default)]
pub struct RecentLogs;

impl LogSource for RecentLogs {
    fn recent(&self, max: usize) -> Vec<std::string::String> {
        LOGGER
            .ring
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recent(max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_oldest_first() {
        let mut ring = LogRing::new();
        assert!(ring.recent(LOG_LINES).is_empty());
        for line in ["one", "two", "three"] {
            ring.push(line);
        }
        assert_eq!(ring.recent(2), vec!["two", "three"]);
        assert_eq!(ring.recent(10), vec!["one", "two", "three"]);
    }

    #[test]
    fn test_drops_oldest_when_full() {
        let mut ring = LogRing::new();
        for i in 0..LOG_LINES + 5 {
            ring.push(&format!("line {}", i));
        }
        let lines = ring.recent(usize::MAX);
        assert_eq!(lines.len(), LOG_LINES);
        assert_eq!(lines[0], "line 5");
        assert_eq!(lines[LOG_LINES - 1], format!("line {}", LOG_LINES + 4));
    }

    #[test]
    fn test_long_lines_cut() {
        let mut ring = LogRing::new();
        ring.push(&"x".repeat(LINE_LEN * 2));
        assert_eq!(ring.recent(1)[0].len(), LINE_LEN);
    }

    #[test]
    fn test_records_feed_ring_and_dirty_flag() {
        let logger = RingLogger {
            ring: Mutex::new(LogRing::new()),
            echo: AtomicBool::new(false),
            dirty: OnceLock::new(),
        };
        let flag = DirtyFlag::new();
        flag.take();
        let _ = logger.dirty.set(flag.clone());
        log::set_max_level(LevelFilter::Info);

        logger.log(
            &Record::builder()
                .level(log::Level::Info)
                .args(format_args!("board ready"))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(log::Level::Trace)
                .args(format_args!("filtered out"))
                .build(),
        );

        let lines = logger.ring.lock().unwrap().recent(LOG_LINES);
        assert_eq!(lines, vec!["INFO  board ready"]);
        assert!(flag.is_set());
    }
}
