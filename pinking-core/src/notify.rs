//! Change notifications
//!
//! One [`Topic`] per notification kind. Delivery is synchronous on the thread
//! that made the change; observers must return quickly (mark a widget dirty,
//! push a log line) and must not call back into the controller.

use std::sync::{Arc, Mutex, PoisonError};

use crate::board::{PinDirection, PinValue, PinVec};

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Publish/subscribe channel for one payload type
pub struct Topic<T> {
    observers: Mutex<Vec<Observer<T>>>,
}

impl<T> Default for Topic<T> {
    fn default() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Topic<T> {
    /// Create a topic with no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer
    pub fn subscribe(&self, observer: impl Fn(&T) + Send + Sync + 'static) {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(observer));
    }

    /// Deliver a payload to every observer
    ///
    /// The observer list is copied out first so observers may subscribe
    /// further observers without deadlocking.
    pub fn publish(&self, payload: &T) {
        let observers: Vec<Observer<T>> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for observer in observers {
            observer(payload);
        }
    }

    /// Number of observers
    pub fn observer_count(&self) -> usize {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// A pin changed direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionChanged {
    pub pin: usize,
    pub direction: PinDirection,
}

/// Output values changed (full vector, non-outputs Unknown)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutValuesChanged {
    pub values: PinVec<PinValue>,
}

/// Input values changed (full vector, non-inputs Unknown)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InValuesChanged {
    pub values: PinVec<PinValue>,
}

/// The selection moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionChanged {
    pub pin: usize,
}

/// An action was refused for a pin (e.g. toggling a reserved pin)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidAction {
    pub pin: usize,
}

/// All topics published by the pin controller
#[derive(Default)]
pub struct Notifier {
    pub direction_changed: Topic<DirectionChanged>,
    pub out_values_changed: Topic<OutValuesChanged>,
    pub in_values_changed: Topic<InValuesChanged>,
    pub selection_changed: Topic<SelectionChanged>,
    pub invalid_action: Topic<InvalidAction>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe one callback to every topic
    ///
    /// Used by widgets that only need to know that *something* changed.
    pub fn on_any(&self, observer: impl Fn() + Send + Sync + 'static) {
        let observer = Arc::new(observer);
        let o = observer.clone();
        self.direction_changed.subscribe(move |_| o());
        let o = observer.clone();
        self.out_values_changed.subscribe(move |_| o());
        let o = observer.clone();
        self.in_values_changed.subscribe(move |_| o());
        let o = observer.clone();
        self.selection_changed.subscribe(move |_| o());
        self.invalid_action.subscribe(move |_| observer());
    }
}
