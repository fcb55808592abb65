//! End-to-end runs of the dispatch loop against the simulated board

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use pinking_core::events::{queue, spawn_source, spawn_ticker, wake_on_input_change};
use pinking_core::{
    AppCommands, BoardControl, BoardSnapshot, Dispatcher, Event, Key, PinCommands,
    PinController, PinDirection, PinValue, Redraw, Shutdown,
};
use pinking_hal::{Gpio, Level, Session};
use pinking_hal_sim::{Operation, SimGpio};

/// Keeps the last snapshot it was asked to draw
struct Recorder {
    dirty: Arc<AtomicBool>,
    last: Arc<Mutex<Option<BoardSnapshot>>>,
}

impl Redraw for Recorder {
    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn redraw(&mut self, board: &BoardSnapshot) -> io::Result<()> {
        self.dirty.store(false, Ordering::SeqCst);
        *self.last.lock().unwrap() = Some(board.clone());
        Ok(())
    }
}

/// Counts redraws
struct Counter {
    dirty: Arc<AtomicBool>,
    draws: Arc<AtomicUsize>,
}

impl Redraw for Counter {
    fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn redraw(&mut self, _board: &BoardSnapshot) -> io::Result<()> {
        self.dirty.store(false, Ordering::SeqCst);
        self.draws.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn wait_for(count: &AtomicUsize, expected: usize) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if count.load(Ordering::SeqCst) >= expected {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

fn keys(text: &str) -> Vec<Event> {
    text.chars().map(|c| Event::Keypress(Key::Char(c))).collect()
}

#[test]
fn test_scripted_session() {
    let sim = SimGpio::new();
    let mut board = PinController::new(sim.clone(), "a01041").unwrap();

    let dirty = Arc::new(AtomicBool::new(true));
    let flag = dirty.clone();
    board.notifier().on_any(move || flag.store(true, Ordering::SeqCst));
    let last = Arc::new(Mutex::new(None));

    // Pin 2 is GPIO02 (channel 3): move down one row, make it an output, drive it high
    let (tx, rx) = queue();
    let mut script = keys("jdtq").into_iter();
    spawn_source("script", tx, move || script.next()).unwrap();

    let mut dispatcher = Dispatcher::new(rx)
        .with_handler(AppCommands)
        .with_handler(PinCommands)
        .with_widget(Recorder {
            dirty,
            last: last.clone(),
        });

    assert_eq!(dispatcher.run(&mut board).unwrap(), Shutdown::Quit);
    assert_eq!(sim.level(3), Some(Level::High));

    let snapshot = last.lock().unwrap().clone().unwrap();
    assert_eq!(snapshot.selected, 2);
    assert_eq!(snapshot.pins[2].direction, PinDirection::Output);
    assert_eq!(snapshot.pins[2].out_value, PinValue::High);
}

#[test]
fn test_ticks_poll_inputs() {
    let sim = SimGpio::new();
    let mut board = PinController::new(sim.clone(), "a01041").unwrap();

    // Drop edge detection on channel 11 so only polling can see the change
    sim.clone().remove_edge_detect(11).unwrap();
    sim.set_input_level(11, Level::High);
    assert_eq!(board.pin(10).unwrap().in_value, PinValue::Low);

    let polls = Arc::new(AtomicUsize::new(0));
    let p = polls.clone();
    board.notifier().in_values_changed.subscribe(move |_| {
        p.fetch_add(1, Ordering::SeqCst);
    });

    let (tx, rx) = queue();
    spawn_ticker(tx.clone(), Duration::from_millis(5)).unwrap();
    let mut quit_after = 3;
    spawn_source("quit", tx, move || {
        std::thread::sleep(Duration::from_millis(50));
        quit_after -= 1;
        (quit_after > 0).then_some(Event::Keypress(Key::Char('q')))
    })
    .unwrap();

    let mut dispatcher = Dispatcher::new(rx)
        .with_handler(AppCommands)
        .with_handler(PinCommands);
    assert_eq!(dispatcher.run(&mut board).unwrap(), Shutdown::Quit);

    assert_eq!(board.pin(10).unwrap().in_value, PinValue::High);
    assert_eq!(polls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_session_released_after_fault() {
    let sim = SimGpio::new();
    let session = Session::new(sim.clone());
    let mut board = PinController::new(session, "a01041").unwrap();

    let (tx, rx) = queue();
    sim.fail_next(Operation::Input);
    tx.send(Event::Keypress(Key::Char('r'))).unwrap();

    let mut dispatcher = Dispatcher::new(rx)
        .with_handler(AppCommands)
        .with_handler(PinCommands);
    assert!(dispatcher.run(&mut board).is_err());
    assert!(!sim.is_released());

    drop(board);
    assert!(sim.is_released());
    assert_eq!(sim.count(Operation::Cleanup), 1);
}

#[test]
fn test_reserved_pin_flashes_invalid_action() {
    let sim = SimGpio::new();
    let mut board = PinController::new(sim, "a01041").unwrap();
    let flashes = Arc::new(AtomicUsize::new(0));
    let f = flashes.clone();
    board.notifier().invalid_action.subscribe(move |event| {
        assert_eq!(event.pin, 0);
        f.fetch_add(1, Ordering::SeqCst);
    });

    let (tx, rx) = queue();
    for event in keys("ddq") {
        tx.send(event).unwrap();
    }
    let mut dispatcher = Dispatcher::new(rx)
        .with_handler(AppCommands)
        .with_handler(PinCommands);
    dispatcher.run(&mut board).unwrap();

    assert_eq!(flashes.load(Ordering::SeqCst), 2);
    assert_eq!(board.pin(0).unwrap().direction, PinDirection::Undefined);
}

#[test]
fn test_edge_redraws_without_ticker() {
    let sim = SimGpio::new();
    let draws = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = queue();
    let quit = tx.clone();

    let loop_sim = sim.clone();
    let loop_draws = draws.clone();
    let handle = thread::spawn(move || {
        let mut board = PinController::new(loop_sim, "a01041").unwrap();
        let dirty = Arc::new(AtomicBool::new(true));
        let flag = dirty.clone();
        board.notifier().on_any(move || flag.store(true, Ordering::SeqCst));
        wake_on_input_change(board.notifier(), tx);

        let mut dispatcher = Dispatcher::new(rx)
            .with_handler(AppCommands)
            .with_handler(PinCommands)
            .with_widget(Counter {
                dirty,
                draws: loop_draws,
            });
        let shutdown = dispatcher.run(&mut board).unwrap();
        (shutdown, board.pin(10).unwrap().in_value)
    });

    assert!(wait_for(&draws, 1), "first frame never drawn");

    // Channel 11 (pin 10) is an input; the edge arrives on this thread
    sim.set_input_level(11, Level::High);
    assert!(wait_for(&draws, 2), "edge change never redrawn");

    quit.send(Event::Keypress(Key::Char('q'))).unwrap();
    let (shutdown, value) = handle.join().unwrap();
    assert_eq!(shutdown, Shutdown::Quit);
    assert_eq!(value, PinValue::High);
}
