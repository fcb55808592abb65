//! Controller implementation

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, info, warn};
use pinking_hal::{
    Channel, Direction, Edge, EdgeCallback, Gpio, HardwareFault, Level, NumberingMode, Pull,
};

use super::state::{
    in_values, out_values, BoardSnapshot, PinDirection, PinState, PinValue, PinVec,
};
use super::{BoardControl, BoardError};
use crate::layout::{self, PinLayout};
use crate::notify::{
    DirectionChanged, InValuesChanged, InvalidAction, Notifier, OutValuesChanged,
    SelectionChanged,
};

/// State reachable from the edge-detect callback
///
/// The pin vector lock is held only for read-compare-write; notifications
/// go out after it is released.
struct Shared {
    layout: &'static PinLayout,
    pins: Mutex<PinVec<PinState>>,
    notifier: Notifier,
}

impl Shared {
    fn pins(&self) -> MutexGuard<'_, PinVec<PinState>> {
        self.pins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply an edge event from the capability
    fn on_edge(&self, channel: Channel, level: Level) {
        let Some(pin) = self.layout.pin_for_channel(channel) else {
            warn!("Edge on unknown channel {}", channel);
            return;
        };

        let values = {
            let mut pins = self.pins();
            let state = &mut pins[pin];
            let value = PinValue::from(level);
            if state.direction != PinDirection::Input || state.in_value == value {
                return;
            }
            state.in_value = value;
            in_values(&pins)
        };

        debug!("Edge on channel {}: {:?}", channel, level);
        self.notifier
            .in_values_changed
            .publish(&InValuesChanged { values });
    }
}

/// Owns the GPIO capability and the pin state of one board
pub struct PinController<G: Gpio> {
    gpio: G,
    revision: String,
    shared: Arc<Shared>,
    selected: usize,
    pull: Pull,
}

impl<G: Gpio> PinController<G> {
    /// Bring up a board with the default pull resistor
    pub fn new(gpio: G, revision: &str) -> Result<Self, BoardError> {
        Self::with_pull(gpio, revision, Pull::default())
    }

    /// Bring up a board, using `pull` for every input
    pub fn with_pull(gpio: G, revision: &str, pull: Pull) -> Result<Self, BoardError> {
        let layout = layout::lookup(revision)
            .ok_or_else(|| BoardError::LayoutNotFound(revision.to_string()))?;
        Self::with_layout(gpio, revision, layout, pull)
    }

    /// Bring up a board with an explicit layout
    ///
    /// Sets board numbering, then runs the reset sequence so every pin is
    /// sampled before the first render.
    pub fn with_layout(
        mut gpio: G,
        revision: &str,
        layout: &'static PinLayout,
        pull: Pull,
    ) -> Result<Self, BoardError> {
        layout.validate()?;
        gpio.set_mode(NumberingMode::Board)?;

        let pins = layout.names().iter().map(|_| PinState::default()).collect();
        let mut controller = Self {
            gpio,
            revision: revision.trim().to_string(),
            shared: Arc::new(Shared {
                layout,
                pins: Mutex::new(pins),
                notifier: Notifier::new(),
            }),
            selected: 0,
            pull,
        };
        controller.reset_channels()?;

        info!(
            "Board {} ready: {} pins via {} GPIO",
            controller.revision,
            layout.len(),
            controller.gpio.name()
        );
        Ok(controller)
    }

    /// Board revision
    pub fn revision(&self) -> &str {
        &self.revision
    }

    /// Pin layout
    pub fn layout(&self) -> &'static PinLayout {
        self.shared.layout
    }

    /// Underlying capability
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Give back the capability
    pub fn into_inner(self) -> G {
        self.gpio
    }

    fn edge_callback(&self) -> EdgeCallback {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        Box::new(move |channel, level| {
            if let Some(shared) = shared.upgrade() {
                shared.on_edge(channel, level);
            }
        })
    }

    fn state(&self, pin: usize) -> Option<PinState> {
        self.shared.pins().get(pin).copied()
    }
}

impl<G: Gpio> BoardControl for PinController<G> {
    fn pin_count(&self) -> usize {
        self.shared.layout.len()
    }

    fn selected(&self) -> usize {
        self.selected
    }

    fn select(&mut self, pin: usize) {
        if pin >= self.pin_count() || pin == self.selected {
            return;
        }
        self.selected = pin;
        self.shared
            .notifier
            .selection_changed
            .publish(&SelectionChanged { pin });
    }

    fn pin(&self, pin: usize) -> Option<PinState> {
        self.state(pin)
    }

    fn is_reserved(&self, pin: usize) -> bool {
        self.shared.layout.is_reserved(pin)
    }

    fn set_direction(
        &mut self,
        pin: usize,
        direction: PinDirection,
    ) -> Result<(), HardwareFault> {
        if self.is_reserved(pin) {
            return Ok(());
        }
        let Some(previous) = self.state(pin) else {
            return Ok(());
        };
        let Some(hw_direction) = direction.hardware() else {
            debug!("Pin {}: cannot set Undefined direction", pin);
            return Ok(());
        };
        if previous.direction == direction {
            return Ok(());
        }

        let channel = self.shared.layout.channel(pin);
        if previous.direction == PinDirection::Input {
            self.gpio.remove_edge_detect(channel)?;
        }

        let mut out_value = previous.out_value;
        match hw_direction {
            Direction::In => {
                self.gpio.setup(channel, Direction::In, self.pull)?;
                let callback = self.edge_callback();
                self.gpio.add_edge_detect(channel, Edge::Both, callback)?;
            }
            Direction::Out => {
                self.gpio.setup(channel, Direction::Out, Pull::Off)?;
                let level = previous.out_value.level().unwrap_or(Level::Low);
                self.gpio.output(channel, level)?;
                out_value = PinValue::from(level);
            }
        }

        {
            let mut pins = self.shared.pins();
            let state = &mut pins[pin];
            state.direction = direction;
            match direction {
                PinDirection::Input => state.in_value = PinValue::Unknown,
                _ => state.out_value = out_value,
            }
        }

        debug!("Pin {} (channel {}) now {:?}", pin, channel, direction);
        self.shared
            .notifier
            .direction_changed
            .publish(&DirectionChanged { pin, direction });
        Ok(())
    }

    fn set_output_value(&mut self, pin: usize, value: PinValue) -> Result<(), HardwareFault> {
        let Some(state) = self.state(pin) else {
            return Ok(());
        };
        let Some(level) = value.level() else {
            return Ok(());
        };
        if state.direction != PinDirection::Output || state.out_value == value {
            return Ok(());
        }

        let channel = self.shared.layout.channel(pin);
        self.gpio.output(channel, level)?;

        let values = {
            let mut pins = self.shared.pins();
            pins[pin].out_value = value;
            out_values(&pins)
        };

        debug!("Pin {} (channel {}) driven {:?}", pin, channel, level);
        self.shared
            .notifier
            .out_values_changed
            .publish(&OutValuesChanged { values });
        Ok(())
    }

    fn read_input_values(&mut self) -> Result<bool, HardwareFault> {
        let inputs: PinVec<usize> = self
            .shared
            .pins()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.direction == PinDirection::Input)
            .map(|(pin, _)| pin)
            .collect();

        // Sample everything before touching state so a fault leaves it intact
        let mut samples: PinVec<(usize, PinValue)> = PinVec::new();
        for pin in inputs {
            let level = self.gpio.input(self.shared.layout.channel(pin))?;
            let _ = samples.push((pin, PinValue::from(level)));
        }

        let values = {
            let mut pins = self.shared.pins();
            let mut changed = false;
            for (pin, value) in samples {
                let state = &mut pins[pin];
                // Direction may only change on this thread, but stay strict
                if state.direction == PinDirection::Input && state.in_value != value {
                    state.in_value = value;
                    changed = true;
                }
            }
            if !changed {
                return Ok(false);
            }
            in_values(&pins)
        };

        self.shared
            .notifier
            .in_values_changed
            .publish(&InValuesChanged { values });
        Ok(true)
    }

    fn reset_channels(&mut self) -> Result<(), HardwareFault> {
        debug!("Resetting all channels to input");
        for pin in 0..self.pin_count() {
            self.set_direction(pin, PinDirection::Input)?;
        }
        self.read_input_values()?;
        Ok(())
    }

    fn invalid_action(&mut self, pin: usize) {
        debug!("Invalid action on pin {}", pin);
        self.shared
            .notifier
            .invalid_action
            .publish(&InvalidAction { pin });
    }

    fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            revision: self.revision.clone(),
            layout: self.shared.layout,
            selected: self.selected,
            pins: self.shared.pins().clone(),
        }
    }

    fn notifier(&self) -> &Notifier {
        &self.shared.notifier
    }
}
