//! Raw device events
//!
//! The subset of evdev events the ShuttleXpress produces that the
//! dispatcher cares about: button presses, the jog dial and the shuttle
//! ring.

use evdev::{InputEvent, InputEventKind, RelativeAxisType};

/// Relative axis reported by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Jog wheel (`REL_DIAL`), an 8-bit wrapping position
    Dial,
    /// Shuttle ring (`REL_WHEEL`), a signed ring position
    Wheel,
}

/// A single event read from the input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEvent {
    Key { code: u16, pressed: bool },
    Relative { axis: Axis, value: i32 },
}

impl RawEvent {
    /// Translate an evdev event, dropping anything the dispatcher ignores
    /// (sync/misc events, key autorepeat, other axes).
    pub fn from_input_event(event: &InputEvent) -> Option<Self> {
        match event.kind() {
            InputEventKind::Key(key) => match event.value() {
                0 => Some(RawEvent::Key {
                    code: key.code(),
                    pressed: false,
                }),
                1 => Some(RawEvent::Key {
                    code: key.code(),
                    pressed: true,
                }),
                _ => None,
            },
            InputEventKind::RelAxis(axis) => {
                let axis = match axis {
                    RelativeAxisType::REL_DIAL => Axis::Dial,
                    RelativeAxisType::REL_WHEEL => Axis::Wheel,
                    _ => return None,
                };
                Some(RawEvent::Relative {
                    axis,
                    value: event.value(),
                })
            }
            _ => None,
        }
    }
}
