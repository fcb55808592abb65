//! Simulated GPIO backend
//!
//! Stands in for real hardware in tests and on machines without a GPIO
//! header. Every call is logged at debug level and recorded so tests can
//! assert exactly which hardware operations ran.
//!
//! Input levels are driven from the outside through [`SimGpio::set_input_level`],
//! which also fires registered edge callbacks the way an interrupt would.
//! `SimGpio` is a cheap handle: clones share the same simulated board.

#![deny(unsafe_code)]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use heapless::Deque;
use log::debug;
use pinking_hal::{
    BoardInfo, Channel, Direction, Edge, EdgeCallback, Gpio, HardwareFault, Level, NumberingMode,
    Pull,
};

/// Number of channels on the simulated header
pub const DEFAULT_CHANNELS: u8 = 40;

/// Revision code the simulated board reports
pub const REVISION: &str = "a01041";

/// Model name the simulated board reports
pub const MODEL: &str = "Fake Pi2 Model B";

/// Calls kept in the log; older calls are dropped
pub const MAX_CALLS: usize = 1024;

const OPERATIONS: usize = 7;

/// Kind of capability operation, used for fault injection and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SetMode,
    Setup,
    Output,
    Input,
    AddEdgeDetect,
    RemoveEdgeDetect,
    Cleanup,
}

/// One recorded capability call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetMode(NumberingMode),
    Setup {
        channel: Channel,
        direction: Direction,
        pull: Pull,
    },
    Output {
        channel: Channel,
        level: Level,
    },
    Input {
        channel: Channel,
    },
    AddEdgeDetect {
        channel: Channel,
        edge: Edge,
    },
    RemoveEdgeDetect {
        channel: Channel,
    },
    Cleanup,
}

impl Call {
    /// Operation kind of this call
    pub fn operation(&self) -> Operation {
        match self {
            Call::SetMode(_) => Operation::SetMode,
            Call::Setup { .. } => Operation::Setup,
            Call::Output { .. } => Operation::Output,
            Call::Input { .. } => Operation::Input,
            Call::AddEdgeDetect { .. } => Operation::AddEdgeDetect,
            Call::RemoveEdgeDetect { .. } => Operation::RemoveEdgeDetect,
            Call::Cleanup => Operation::Cleanup,
        }
    }

    fn channel(&self) -> Channel {
        match self {
            Call::Setup { channel, .. }
            | Call::Output { channel, .. }
            | Call::Input { channel }
            | Call::AddEdgeDetect { channel, .. }
            | Call::RemoveEdgeDetect { channel } => *channel,
            Call::SetMode(_) | Call::Cleanup => 0,
        }
    }
}

type SharedCallback = Arc<Mutex<EdgeCallback>>;

/// State of one simulated line
struct Line {
    direction: Option<Direction>,
    pull: Pull,
    level: Level,
    edge: Option<(Edge, SharedCallback)>,
}

impl Line {
    fn new() -> Self {
        Self {
            direction: None,
            pull: Pull::Off,
            level: Level::Low,
            edge: None,
        }
    }
}

struct SimState {
    mode: Option<NumberingMode>,
    lines: Vec<Line>,
    calls: Deque<Call, MAX_CALLS>,
    counts: [usize; OPERATIONS],
    fail_next: Option<Operation>,
}

impl SimState {
    /// Record a call and apply any pending injected fault
    fn begin(&mut self, call: Call) -> Result<(), HardwareFault> {
        debug!("SimGpio: {:?}", call);
        let op = call.operation();
        let channel = call.channel();
        self.counts[op as usize] += 1;
        if self.calls.is_full() {
            self.calls.pop_front();
        }
        let _ = self.calls.push_back(call);

        if self.fail_next == Some(op) {
            self.fail_next = None;
            return Err(HardwareFault::Io {
                channel,
                message: "injected fault".into(),
            });
        }
        Ok(())
    }

    fn line_mut(&mut self, channel: Channel) -> Result<&mut Line, HardwareFault> {
        if self.mode.is_none() {
            return Err(HardwareFault::ModeNotSet);
        }
        let index = usize::from(channel)
            .checked_sub(1)
            .ok_or(HardwareFault::InvalidChannel(channel))?;
        self.lines
            .get_mut(index)
            .ok_or(HardwareFault::InvalidChannel(channel))
    }
}

/// Simulated GPIO board
#[derive(Clone)]
pub struct SimGpio {
    state: Arc<Mutex<SimState>>,
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl SimGpio {
    /// Create a simulated 40-pin board
    pub fn new() -> Self {
        Self::with_channels(DEFAULT_CHANNELS)
    }

    /// Create a simulated board with `channels` header pins
    pub fn with_channels(channels: u8) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                mode: None,
                lines: (0..channels).map(|_| Line::new()).collect(),
                calls: Deque::new(),
                counts: [0; OPERATIONS],
                fail_next: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drive the external level seen by a channel
    ///
    /// Fires the channel's edge callback if it is an input whose registered
    /// edge matches the transition. The callback runs on the calling thread
    /// after the board lock is released.
    pub fn set_input_level(&self, channel: Channel, level: Level) {
        let fire = {
            let mut state = self.lock();
            let Some(line) = usize::from(channel)
                .checked_sub(1)
                .and_then(|index| state.lines.get_mut(index))
            else {
                return;
            };
            let previous = line.level;
            line.level = level;
            debug!("SimGpio: channel {} driven {:?}", channel, level);

            match (&line.direction, &line.edge) {
                (Some(Direction::In), Some((edge, callback))) if edge.matches(previous, level) => {
                    Some(callback.clone())
                }
                _ => None,
            }
        };

        if let Some(callback) = fire {
            let mut callback = callback.lock().unwrap_or_else(PoisonError::into_inner);
            (callback)(channel, level);
        }
    }

    /// Current level of a channel (driven output or external input)
    pub fn level(&self, channel: Channel) -> Option<Level> {
        let state = self.lock();
        usize::from(channel)
            .checked_sub(1)
            .and_then(|index| state.lines.get(index))
            .map(|line| line.level)
    }

    /// Configured direction of a channel
    pub fn direction(&self, channel: Channel) -> Option<Direction> {
        let state = self.lock();
        usize::from(channel)
            .checked_sub(1)
            .and_then(|index| state.lines.get(index))
            .and_then(|line| line.direction)
    }

    /// Configured pull resistor of a channel
    pub fn pull(&self, channel: Channel) -> Option<Pull> {
        let state = self.lock();
        usize::from(channel)
            .checked_sub(1)
            .and_then(|index| state.lines.get(index))
            .map(|line| line.pull)
    }

    /// Check if a channel has edge detection registered
    pub fn has_edge_detect(&self, channel: Channel) -> bool {
        let state = self.lock();
        usize::from(channel)
            .checked_sub(1)
            .and_then(|index| state.lines.get(index))
            .is_some_and(|line| line.edge.is_some())
    }

    /// Most recent calls, oldest first (at most [`MAX_CALLS`])
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.iter().cloned().collect()
    }

    /// Forget recorded calls and counts
    pub fn clear_calls(&self) {
        let mut state = self.lock();
        state.calls.clear();
        state.counts = [0; OPERATIONS];
    }

    /// Number of calls of one kind, including ones dropped from the log
    pub fn count(&self, op: Operation) -> usize {
        self.lock().counts[op as usize]
    }

    /// Make the next call of kind `op` fail with a hardware fault
    pub fn fail_next(&self, op: Operation) {
        self.lock().fail_next = Some(op);
    }

    /// Check if no channel is configured
    pub fn is_released(&self) -> bool {
        let state = self.lock();
        state.mode.is_none()
            && state
                .lines
                .iter()
                .all(|line| line.direction.is_none() && line.edge.is_none())
    }
}

impl Gpio for SimGpio {
    fn set_mode(&mut self, mode: NumberingMode) -> Result<(), HardwareFault> {
        let mut state = self.lock();
        state.begin(Call::SetMode(mode))?;
        if mode != NumberingMode::Board {
            return Err(HardwareFault::UnsupportedMode(mode));
        }
        state.mode = Some(mode);
        Ok(())
    }

    fn setup(
        &mut self,
        channel: Channel,
        direction: Direction,
        pull: Pull,
    ) -> Result<(), HardwareFault> {
        let mut state = self.lock();
        state.begin(Call::Setup {
            channel,
            direction,
            pull,
        })?;
        let line = state.line_mut(channel)?;
        line.direction = Some(direction);
        line.pull = pull;
        Ok(())
    }

    fn output(&mut self, channel: Channel, level: Level) -> Result<(), HardwareFault> {
        let mut state = self.lock();
        state.begin(Call::Output { channel, level })?;
        let line = state.line_mut(channel)?;
        if line.direction != Some(Direction::Out) {
            return Err(HardwareFault::WrongDirection {
                channel,
                expected: Direction::Out,
            });
        }
        line.level = level;
        Ok(())
    }

    fn input(&mut self, channel: Channel) -> Result<Level, HardwareFault> {
        let mut state = self.lock();
        state.begin(Call::Input { channel })?;
        let line = state.line_mut(channel)?;
        match line.direction {
            Some(_) => Ok(line.level),
            None => Err(HardwareFault::WrongDirection {
                channel,
                expected: Direction::In,
            }),
        }
    }

    fn add_edge_detect(
        &mut self,
        channel: Channel,
        edge: Edge,
        callback: EdgeCallback,
    ) -> Result<(), HardwareFault> {
        let mut state = self.lock();
        state.begin(Call::AddEdgeDetect { channel, edge })?;
        let line = state.line_mut(channel)?;
        if line.direction != Some(Direction::In) {
            return Err(HardwareFault::WrongDirection {
                channel,
                expected: Direction::In,
            });
        }
        line.edge = Some((edge, Arc::new(Mutex::new(callback))));
        Ok(())
    }

    fn remove_edge_detect(&mut self, channel: Channel) -> Result<(), HardwareFault> {
        let mut state = self.lock();
        state.begin(Call::RemoveEdgeDetect { channel })?;
        state.line_mut(channel)?.edge = None;
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), HardwareFault> {
        let mut state = self.lock();
        state.begin(Call::Cleanup)?;
        state.mode = None;
        for line in &mut state.lines {
            line.direction = None;
            line.pull = Pull::Off;
            line.edge = None;
        }
        Ok(())
    }

    fn board_info(&self) -> Option<BoardInfo> {
        Some(BoardInfo {
            revision: REVISION.into(),
            model: MODEL.into(),
        })
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
