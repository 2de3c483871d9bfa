//! ShuttleXpress Jog/Shuttle to Keyboard Mapper
//!
//! Reads button, jog and ring events from a Contour ShuttleXpress and
//! replays configured key chords on a virtual keyboard.

pub mod action;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod event;
pub mod jog;
pub mod keyboard;
pub mod keys;
pub mod runner;
pub mod testing;

pub use action::{execute, ActionError, Chord, Phase};
pub use config::{ConfigError, ShuttleConfig};
pub use device::{
    find_device, DeviceError, EventSource, ShuttleDevice, SHUTTLE_PRODUCT_ID, SHUTTLE_VENDOR_ID,
};
pub use dispatcher::{Dispatch, Dispatcher};
pub use event::{Axis, RawEvent};
pub use jog::{classify, Direction, JOG_UNINITIALIZED};
pub use keyboard::{DryRunKeyboard, KeySink, KeyboardError, VirtualKeyboard};
pub use runner::{run, RunStats};
