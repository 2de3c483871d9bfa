//! Test doubles for the key sink and the event source

use crate::device::{DeviceError, EventSource};
use crate::event::RawEvent;
use crate::keyboard::{KeyboardError, KeySink};
use evdev::Key;
use std::collections::VecDeque;

/// A key signal as seen by [`RecordingKeyboard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Down(Key),
    Up(Key),
    Press(Key),
}

/// Sink that records every signal, optionally failing one of them
#[derive(Debug, Default)]
pub struct RecordingKeyboard {
    pub signals: Vec<Signal>,
    fail_at: Option<usize>,
    calls: usize,
}

impl RecordingKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th signal (0-based). Failed signals are not recorded.
    pub fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Self::default()
        }
    }

    /// Keys currently held down according to the recorded signals
    pub fn held(&self) -> Vec<Key> {
        let mut held = Vec::new();
        for signal in &self.signals {
            match *signal {
                Signal::Down(key) => held.push(key),
                Signal::Up(key) => held.retain(|&k| k != key),
                Signal::Press(_) => {}
            }
        }
        held
    }

    fn record(&mut self, signal: Signal) -> Result<(), KeyboardError> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_at == Some(call) {
            return Err(KeyboardError::EmitEvent(std::io::Error::other(
                "injected failure",
            )));
        }
        self.signals.push(signal);
        Ok(())
    }
}

impl KeySink for RecordingKeyboard {
    fn key_down(&mut self, key: Key) -> Result<(), KeyboardError> {
        self.record(Signal::Down(key))
    }

    fn key_up(&mut self, key: Key) -> Result<(), KeyboardError> {
        self.record(Signal::Up(key))
    }

    fn key_press(&mut self, key: Key) -> Result<(), KeyboardError> {
        self.record(Signal::Press(key))
    }
}

/// Event source replaying a fixed list of events
#[derive(Debug, Default)]
pub struct ScriptedSource {
    events: VecDeque<RawEvent>,
    fail_when_empty: bool,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = RawEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            fail_when_empty: false,
        }
    }

    /// Report a read error instead of exhaustion once the script runs out
    pub fn then_fail(mut self) -> Self {
        self.fail_when_empty = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl EventSource for ScriptedSource {
    fn next_event(&mut self) -> Result<Option<RawEvent>, DeviceError> {
        match self.events.pop_front() {
            Some(event) => Ok(Some(event)),
            None if self.fail_when_empty => Err(DeviceError::Read(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "device unplugged",
            ))),
            None => Ok(None),
        }
    }
}
