//! Action strings and chord execution
//!
//! An action is a `+`-joined list of key tokens such as `ctrl+shift+c`.
//! Every token but the last is a modifier held for the duration of the
//! chord; the last token is tapped once.
//!
//! ```text
//! ctrl+shift+c  → ↓ctrl ↓shift ⇅c ↑shift ↑ctrl
//! up            → ⇅up
//! ```

use crate::keyboard::{KeyboardError, KeySink};
use crate::keys;
use evdev::Key;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

/// Which step of a chord a sink error happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Holding a modifier down
    Down,
    /// Tapping the main key
    Press,
    /// Releasing a modifier
    Up,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Down => write!(f, "press down"),
            Phase::Press => write!(f, "press"),
            Phase::Up => write!(f, "release"),
        }
    }
}

/// Errors from resolving or executing an action
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("unknown key in action: '{0}'")]
    UnknownKeyToken(String),
    #[error("no valid keycodes found in action")]
    EmptyAction,
    #[error("failed to {phase} key {key:?}: {source}")]
    Sink {
        phase: Phase,
        key: Key,
        #[source]
        source: KeyboardError,
    },
}

/// A resolved action: modifiers held around one tapped key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chord {
    pub modifiers: Vec<Key>,
    pub key: Key,
}

impl Chord {
    /// Resolve an action string without touching any sink.
    pub fn parse(action: &str) -> Result<Self, ActionError> {
        let action = action.to_ascii_lowercase();
        let mut codes = Vec::new();

        for token in action.split('+').filter(|t| !t.is_empty()) {
            let token = match token.trim() {
                "" => " ",
                trimmed => trimmed,
            };
            let key = keys::key_from_token(token)
                .ok_or_else(|| ActionError::UnknownKeyToken(token.to_string()))?;
            codes.push(key);
        }

        let key = codes.pop().ok_or(ActionError::EmptyAction)?;
        Ok(Self {
            modifiers: codes,
            key,
        })
    }

    /// Emit the chord to a sink.
    ///
    /// On a sink failure, modifiers that were already held are released in
    /// reverse order before the error is returned, so no key stays stuck.
    pub fn send<S: KeySink + ?Sized>(&self, sink: &mut S) -> Result<(), ActionError> {
        for (held, &modifier) in self.modifiers.iter().enumerate() {
            if let Err(source) = sink.key_down(modifier) {
                release_held(sink, &self.modifiers[..held]);
                return Err(ActionError::Sink {
                    phase: Phase::Down,
                    key: modifier,
                    source,
                });
            }
        }

        if let Err(source) = sink.key_press(self.key) {
            release_held(sink, &self.modifiers);
            return Err(ActionError::Sink {
                phase: Phase::Press,
                key: self.key,
                source,
            });
        }

        for (i, &modifier) in self.modifiers.iter().enumerate().rev() {
            if let Err(source) = sink.key_up(modifier) {
                release_held(sink, &self.modifiers[..i]);
                return Err(ActionError::Sink {
                    phase: Phase::Up,
                    key: modifier,
                    source,
                });
            }
        }

        Ok(())
    }
}

/// Best-effort release of held modifiers, last pressed first
fn release_held<S: KeySink + ?Sized>(sink: &mut S, held: &[Key]) {
    for &key in held.iter().rev() {
        if let Err(e) = sink.key_up(key) {
            warn!("Failed to release {:?} after chord error: {}", key, e);
        }
    }
}

impl FromStr for Chord {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{:?}+", modifier)?;
        }
        write!(f, "{:?}", self.key)
    }
}

/// Resolve and emit an action string.
///
/// Resolution happens before any key signal, so an unknown token or an
/// empty action emits nothing.
pub fn execute<S: KeySink + ?Sized>(sink: &mut S, action: &str) -> Result<(), ActionError> {
    Chord::parse(action)?.send(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingKeyboard, Signal};

    #[test]
    fn test_chord_order() {
        let mut kb = RecordingKeyboard::new();
        execute(&mut kb, "ctrl+shift+c").unwrap();
        assert_eq!(
            kb.signals,
            vec![
                Signal::Down(Key::KEY_LEFTCTRL),
                Signal::Down(Key::KEY_LEFTSHIFT),
                Signal::Press(Key::KEY_C),
                Signal::Up(Key::KEY_LEFTSHIFT),
                Signal::Up(Key::KEY_LEFTCTRL),
            ]
        );
    }

    #[test]
    fn test_single_key_is_one_press() {
        let mut kb = RecordingKeyboard::new();
        execute(&mut kb, "up").unwrap();
        assert_eq!(kb.signals, vec![Signal::Press(Key::KEY_UP)]);
    }

    #[test]
    fn test_case_insensitive_action() {
        let chord = Chord::parse("Ctrl+Alt+F4").unwrap();
        assert_eq!(chord.modifiers, vec![Key::KEY_LEFTCTRL, Key::KEY_LEFTALT]);
        assert_eq!(chord.key, Key::KEY_F4);
    }

    #[test]
    fn test_unknown_token_emits_nothing() {
        let mut kb = RecordingKeyboard::new();
        let err = execute(&mut kb, "zz").unwrap_err();
        assert!(matches!(err, ActionError::UnknownKeyToken(ref t) if t == "zz"));
        assert!(kb.signals.is_empty());
    }

    #[test]
    fn test_unknown_modifier_emits_nothing() {
        let mut kb = RecordingKeyboard::new();
        let err = execute(&mut kb, "ctrl+hyper+c").unwrap_err();
        assert!(matches!(err, ActionError::UnknownKeyToken(ref t) if t == "hyper"));
        assert!(kb.signals.is_empty());
    }

    #[test]
    fn test_empty_action() {
        let mut kb = RecordingKeyboard::new();
        assert!(matches!(execute(&mut kb, ""), Err(ActionError::EmptyAction)));
        assert!(matches!(execute(&mut kb, "++"), Err(ActionError::EmptyAction)));
        assert!(kb.signals.is_empty());
    }

    #[test]
    fn test_whitespace_tokens() {
        assert_eq!(Chord::parse("ctrl+ ").unwrap().key, Key::KEY_SPACE);
        assert_eq!(Chord::parse("ctrl + c").unwrap().key, Key::KEY_C);
    }

    #[test]
    fn test_press_failure_releases_modifiers() {
        // Signals: down(ctrl)=0, down(shift)=1, press(c)=2
        let mut kb = RecordingKeyboard::failing_at(2);
        let err = execute(&mut kb, "ctrl+shift+c").unwrap_err();
        assert!(matches!(
            err,
            ActionError::Sink {
                phase: Phase::Press,
                key: Key::KEY_C,
                ..
            }
        ));
        assert_eq!(
            kb.signals,
            vec![
                Signal::Down(Key::KEY_LEFTCTRL),
                Signal::Down(Key::KEY_LEFTSHIFT),
                Signal::Up(Key::KEY_LEFTSHIFT),
                Signal::Up(Key::KEY_LEFTCTRL),
            ]
        );
        assert!(kb.held().is_empty());
    }

    #[test]
    fn test_down_failure_releases_earlier_modifiers() {
        let mut kb = RecordingKeyboard::failing_at(1);
        let err = execute(&mut kb, "ctrl+shift+c").unwrap_err();
        assert!(matches!(err, ActionError::Sink { phase: Phase::Down, .. }));
        assert_eq!(
            kb.signals,
            vec![
                Signal::Down(Key::KEY_LEFTCTRL),
                Signal::Up(Key::KEY_LEFTCTRL),
            ]
        );
    }

    #[test]
    fn test_up_failure_still_releases_remaining() {
        // down, down, press, up(shift) fails at 3
        let mut kb = RecordingKeyboard::failing_at(3);
        let err = execute(&mut kb, "ctrl+shift+c").unwrap_err();
        assert!(matches!(
            err,
            ActionError::Sink {
                phase: Phase::Up,
                key: Key::KEY_LEFTSHIFT,
                ..
            }
        ));
        assert_eq!(kb.signals.last(), Some(&Signal::Up(Key::KEY_LEFTCTRL)));
    }

    #[test]
    fn test_display() {
        let chord: Chord = "ctrl+c".parse().unwrap();
        assert_eq!(chord.to_string(), "KEY_LEFTCTRL+KEY_C");
    }
}
