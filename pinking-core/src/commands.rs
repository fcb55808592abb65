//! Command handlers
//!
//! Handlers translate events into controller operations. They hold no pin
//! state of their own and reach the board only through [`BoardControl`].

use log::debug;
use pinking_hal::HardwareFault;

use crate::board::{BoardControl, PinDirection, PinValue};
use crate::events::{Event, Key};

/// What the dispatch loop should do after a handler ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Event consumed; later handlers do not see it
    Handled,
    /// Event not for this handler; pass it on
    Ignored,
    /// Leave the loop
    Quit,
}

/// Role of anything that reacts to events
pub trait EventHandler {
    /// React to one event
    fn handle(&mut self, event: &Event, board: &mut dyn BoardControl)
        -> Result<Flow, HardwareFault>;
}

/// Selection movement on the two-column grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

/// Next selected pin after a move
///
/// Pins are stored row-major with two columns: even indices on the left,
/// odd on the right. Vertical moves wrap around; horizontal moves stop at
/// the edge.
pub fn navigate(selected: usize, pin_count: usize, movement: Move) -> usize {
    if pin_count == 0 {
        return 0;
    }
    match movement {
        Move::Down => (selected + 2) % pin_count,
        Move::Up => (selected + pin_count - (2 % pin_count)) % pin_count,
        Move::Left if selected % 2 == 1 => selected - 1,
        Move::Right if selected % 2 == 0 && selected + 1 < pin_count => selected + 1,
        Move::Left | Move::Right => selected,
    }
}

/// Application-level commands
#[derive(Debug, Default)]
pub struct AppCommands;

impl EventHandler for AppCommands {
    fn handle(
        &mut self,
        event: &Event,
        _board: &mut dyn BoardControl,
    ) -> Result<Flow, HardwareFault> {
        match event {
            Event::Keypress(Key::Char('q')) => {
                debug!("Quit requested");
                Ok(Flow::Quit)
            }
            _ => Ok(Flow::Ignored),
        }
    }
}

/// Pin navigation and pin operations
#[derive(Debug, Default)]
pub struct PinCommands;

impl PinCommands {
    fn toggle_direction(&self, board: &mut dyn BoardControl) -> Result<(), HardwareFault> {
        let pin = board.selected();
        match board.pin(pin).map(|state| state.direction) {
            Some(PinDirection::Undefined) | None => {
                board.invalid_action(pin);
                Ok(())
            }
            Some(direction) => {
                let direction = direction.toggled();
                board.set_direction(pin, direction)?;
                // A fresh input has no sample yet
                if direction == PinDirection::Input {
                    board.read_input_values()?;
                }
                Ok(())
            }
        }
    }

    fn toggle_output(&self, board: &mut dyn BoardControl) -> Result<(), HardwareFault> {
        let pin = board.selected();
        match board.pin(pin) {
            Some(state) if state.direction == PinDirection::Output => {
                let value = match state.out_value {
                    PinValue::High => PinValue::Low,
                    _ => PinValue::High,
                };
                board.set_output_value(pin, value)
            }
            _ => Ok(()),
        }
    }
}

impl EventHandler for PinCommands {
    fn handle(
        &mut self,
        event: &Event,
        board: &mut dyn BoardControl,
    ) -> Result<Flow, HardwareFault> {
        let key = match event {
            Event::Tick => {
                board.read_input_values()?;
                return Ok(Flow::Handled);
            }
            Event::Redraw => return Ok(Flow::Ignored),
            Event::Keypress(key) => *key,
        };

        let movement = match key {
            Key::Down | Key::Char('j') => Some(Move::Down),
            Key::Up | Key::Char('k') => Some(Move::Up),
            Key::Left | Key::Char('h') => Some(Move::Left),
            Key::Right | Key::Char(';') | Key::Char('l') => Some(Move::Right),
            _ => None,
        };
        if let Some(movement) = movement {
            let next = navigate(board.selected(), board.pin_count(), movement);
            board.select(next);
            return Ok(Flow::Handled);
        }

        match key {
            Key::Char('d') => self.toggle_direction(board)?,
            Key::Char('t') | Key::Enter => self.toggle_output(board)?,
            Key::Char('r') => {
                board.read_input_values()?;
            }
            Key::Char('R') => board.reset_channels()?,
            _ => return Ok(Flow::Ignored),
        }
        Ok(Flow::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PinController;
    use crate::layout::PinLayout;
    use pinking_hal::Pull;
    use pinking_hal_sim::SimGpio;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    static TINY: PinLayout = PinLayout::new(&["GND", "GPIO1", "GPIO2", "GND"]);

    fn tiny() -> PinController<SimGpio> {
        PinController::with_layout(SimGpio::with_channels(4), "tiny", &TINY, Pull::Down).unwrap()
    }

    fn press(board: &mut dyn BoardControl, c: char) -> Flow {
        PinCommands.handle(&Event::Keypress(Key::Char(c)), board).unwrap()
    }

    #[test]
    fn test_navigate_vertical_wraps() {
        assert_eq!(navigate(0, 40, Move::Down), 2);
        assert_eq!(navigate(38, 40, Move::Down), 0);
        assert_eq!(navigate(39, 40, Move::Down), 1);
        assert_eq!(navigate(0, 40, Move::Up), 38);
        assert_eq!(navigate(1, 40, Move::Up), 39);
        assert_eq!(navigate(5, 40, Move::Up), 3);
    }

    #[test]
    fn test_navigate_horizontal() {
        assert_eq!(navigate(4, 40, Move::Right), 5);
        assert_eq!(navigate(5, 40, Move::Right), 5);
        assert_eq!(navigate(5, 40, Move::Left), 4);
        assert_eq!(navigate(4, 40, Move::Left), 4);
    }

    #[test]
    fn test_navigate_empty_board() {
        assert_eq!(navigate(0, 0, Move::Down), 0);
        assert_eq!(navigate(0, 0, Move::Up), 0);
    }

    #[test]
    fn test_quit() {
        let mut board = tiny();
        let flow = AppCommands
            .handle(&Event::Keypress(Key::Char('q')), &mut board)
            .unwrap();
        assert_eq!(flow, Flow::Quit);
        let flow = AppCommands.handle(&Event::Tick, &mut board).unwrap();
        assert_eq!(flow, Flow::Ignored);
    }

    #[test]
    fn test_four_pin_scenario() {
        let mut board = tiny();
        let invalid = Arc::new(AtomicUsize::new(0));
        let i = invalid.clone();
        board
            .notifier()
            .invalid_action
            .subscribe(move |_| {
                i.fetch_add(1, Ordering::SeqCst);
            });

        assert_eq!(press(&mut board, ';'), Flow::Handled);
        assert_eq!(board.selected(), 1);

        press(&mut board, 'd');
        assert_eq!(board.pin(1).unwrap().direction, PinDirection::Output);

        press(&mut board, 't');
        assert_eq!(board.pin(1).unwrap().out_value, PinValue::High);
        assert_eq!(
            board.snapshot().out_values().as_slice(),
            &[
                PinValue::Unknown,
                PinValue::High,
                PinValue::Unknown,
                PinValue::Unknown
            ]
        );

        press(&mut board, 'h');
        assert_eq!(board.selected(), 0);
        let before = board.snapshot();
        press(&mut board, 'd');
        assert_eq!(board.snapshot(), before);
        assert_eq!(invalid.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_toggle_output_on_input_is_noop() {
        let mut board = tiny();
        board.select(1);
        let before = board.snapshot();
        press(&mut board, 't');
        PinCommands
            .handle(&Event::Keypress(Key::Enter), &mut board)
            .unwrap();
        assert_eq!(board.snapshot(), before);
    }

    #[test]
    fn test_enter_toggles_back() {
        let mut board = tiny();
        board.select(2);
        press(&mut board, 'd');
        PinCommands
            .handle(&Event::Keypress(Key::Enter), &mut board)
            .unwrap();
        PinCommands
            .handle(&Event::Keypress(Key::Enter), &mut board)
            .unwrap();
        assert_eq!(board.pin(2).unwrap().out_value, PinValue::Low);
    }

    #[test]
    fn test_reset_key() {
        let mut board = tiny();
        board.select(1);
        press(&mut board, 'd');
        press(&mut board, 'R');
        assert_eq!(board.pin(1).unwrap().direction, PinDirection::Input);
    }

    #[test]
    fn test_back_to_input_is_sampled() {
        let sim = SimGpio::with_channels(4);
        let mut board =
            PinController::with_layout(sim.clone(), "tiny", &TINY, Pull::Down).unwrap();
        board.select(1);
        press(&mut board, 'd');
        sim.set_input_level(2, pinking_hal::Level::High);

        press(&mut board, 'd');
        let state = board.pin(1).unwrap();
        assert_eq!(state.direction, PinDirection::Input);
        assert_eq!(state.in_value, PinValue::High);
    }

    #[test]
    fn test_redraw_is_ignored() {
        let mut board = tiny();
        assert_eq!(
            PinCommands.handle(&Event::Redraw, &mut board).unwrap(),
            Flow::Ignored
        );
        assert_eq!(
            AppCommands.handle(&Event::Redraw, &mut board).unwrap(),
            Flow::Ignored
        );
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let mut board = tiny();
        assert_eq!(press(&mut board, 'x'), Flow::Ignored);
        let flow = PinCommands
            .handle(&Event::Keypress(Key::Other), &mut board)
            .unwrap();
        assert_eq!(flow, Flow::Ignored);
    }

    proptest! {
        #[test]
        fn prop_down_cycle_returns_home(rows in 1usize..=20, start in 0usize..40) {
            let pin_count = rows * 2;
            let start = start % pin_count;
            let mut selected = start;
            for _ in 0..pin_count / 2 {
                selected = navigate(selected, pin_count, Move::Down);
            }
            prop_assert_eq!(selected, start);
        }

        #[test]
        fn prop_up_undoes_down(rows in 1usize..=20, start in 0usize..40) {
            let pin_count = rows * 2;
            let start = start % pin_count;
            let down = navigate(start, pin_count, Move::Down);
            prop_assert_eq!(navigate(down, pin_count, Move::Up), start);
        }

        #[test]
        fn prop_selection_stays_valid(
            rows in 1usize..=20,
            moves in proptest::collection::vec(0u8..4, 0..100)
        ) {
            let pin_count = rows * 2;
            let mut selected = 0;
            for m in moves {
                let movement = match m {
                    0 => Move::Up,
                    1 => Move::Down,
                    2 => Move::Left,
                    _ => Move::Right,
                };
                selected = navigate(selected, pin_count, movement);
                prop_assert!(selected < pin_count);
            }
        }
    }
}
