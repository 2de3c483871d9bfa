//! Event dispatcher
//!
//! Routes raw device events to configured actions. Holds the only piece of
//! mutable state in the mapper: the last seen jog position.

use crate::action::{self, ActionError};
use crate::config::ShuttleConfig;
use crate::event::{Axis, RawEvent};
use crate::jog::{self, Direction, JOG_UNINITIALIZED};
use crate::keyboard::KeySink;
use tracing::{info, warn};

/// What handling a single event did
#[derive(Debug)]
pub enum Dispatch {
    /// Event kind that never maps to an action (button release)
    Ignored,
    /// No mapping for this event
    Unmapped,
    /// The mapped action was sent to the sink
    Executed { action: String },
    /// The mapped action could not be resolved or sent
    Failed { action: String, error: ActionError },
    /// A ring mapping exists; ring actions are reported, not executed
    RingRecognized { action: String },
}

/// Stateful router from raw events to key chords
pub struct Dispatcher<S: KeySink> {
    config: ShuttleConfig,
    sink: S,
    last_jog: i32,
}

impl<S: KeySink> Dispatcher<S> {
    pub fn new(config: ShuttleConfig, sink: S) -> Self {
        Self {
            config,
            sink,
            last_jog: JOG_UNINITIALIZED,
        }
    }

    /// Last dial position, or [`JOG_UNINITIALIZED`] before the first dial event
    pub fn jog_position(&self) -> i32 {
        self.last_jog
    }

    pub fn config(&self) -> &ShuttleConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give back the sink (closing it is up to the caller / drop)
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Handle one raw event
    pub fn handle(&mut self, event: RawEvent) -> Dispatch {
        match event {
            RawEvent::Key { pressed: false, .. } => Dispatch::Ignored,
            RawEvent::Key {
                code,
                pressed: true,
            } => {
                let Some(action) = self.config.button_action(code) else {
                    return Dispatch::Unmapped;
                };
                let action = action.to_string();
                info!("Button {} pressed, action: {}", code, action);
                self.run_action(action)
            }
            RawEvent::Relative {
                axis: Axis::Dial,
                value,
            } => {
                let direction = jog::classify(self.last_jog, value);
                self.last_jog = value;
                self.handle_jog(direction)
            }
            RawEvent::Relative {
                axis: Axis::Wheel,
                value,
            } => match self.config.ring_action(value) {
                Some(action) => {
                    info!(
                        "Ring position {}, action: {} (ring actions are not executed)",
                        value, action
                    );
                    Dispatch::RingRecognized {
                        action: action.to_string(),
                    }
                }
                None => Dispatch::Unmapped,
            },
        }
    }

    fn handle_jog(&mut self, direction: Direction) -> Dispatch {
        let Some(key) = direction.config_key() else {
            return Dispatch::Unmapped;
        };
        let Some(action) = self.config.jog_action(key) else {
            return Dispatch::Unmapped;
        };
        let action = action.to_string();
        info!("Jog {:?}, action: {}", direction, action);
        self.run_action(action)
    }

    fn run_action(&mut self, action: String) -> Dispatch {
        match action::execute(&mut self.sink, &action) {
            Ok(()) => Dispatch::Executed { action },
            Err(error) => {
                warn!("Error simulating key press for action '{}': {}", action, error);
                Dispatch::Failed { action, error }
            }
        }
    }
}
