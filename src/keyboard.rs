//! Key injection sinks
//!
//! [`VirtualKeyboard`] creates a uinput keyboard and emits real key events.
//! [`DryRunKeyboard`] only logs what would have been sent, so the same
//! dispatcher can run without `/dev/uinput` access.

use crate::keys;
use evdev::{uinput::VirtualDevice, uinput::VirtualDeviceBuilder, AttributeSet, InputEvent, Key};
use thiserror::Error;
use tracing::{debug, info};

/// Default name for the virtual keyboard device
pub const DEFAULT_DEVICE_NAME: &str = "shuttlexpress-virtual-keyboard";

/// Remediation hints shown when the virtual keyboard cannot be created
pub const UINPUT_HELP: &[&str] = &[
    "1. The 'uinput' kernel module is loaded (`sudo modprobe uinput`).",
    "2. You have write permissions to /dev/uinput (e.g., `sudo chmod 0666 /dev/uinput` or add a udev rule).",
];

const KEY_RELEASE: i32 = 0;
const KEY_PRESS: i32 = 1;

/// Errors from key injection
#[derive(Debug, Error)]
pub enum KeyboardError {
    #[error("Failed to create virtual keyboard: {0}")]
    CreateDevice(#[source] std::io::Error),
    #[error("Failed to emit event: {0}")]
    EmitEvent(#[source] std::io::Error),
}

/// Destination for synthesized key signals
pub trait KeySink {
    /// Hold a key down
    fn key_down(&mut self, key: Key) -> Result<(), KeyboardError>;

    /// Release a held key
    fn key_up(&mut self, key: Key) -> Result<(), KeyboardError>;

    /// Press and release a key once
    fn key_press(&mut self, key: Key) -> Result<(), KeyboardError> {
        self.key_down(key)?;
        self.key_up(key)
    }
}

impl<S: KeySink + ?Sized> KeySink for Box<S> {
    fn key_down(&mut self, key: Key) -> Result<(), KeyboardError> {
        (**self).key_down(key)
    }

    fn key_up(&mut self, key: Key) -> Result<(), KeyboardError> {
        (**self).key_up(key)
    }

    fn key_press(&mut self, key: Key) -> Result<(), KeyboardError> {
        (**self).key_press(key)
    }
}

/// Virtual keyboard backed by uinput
///
/// The kernel removes the device when the uinput handle is closed, which
/// happens when this value is dropped.
pub struct VirtualKeyboard {
    device: VirtualDevice,
    name: String,
}

impl VirtualKeyboard {
    /// Create a virtual keyboard advertising every key in the symbol table
    ///
    /// # Arguments
    /// * `name` - Device name (shown in `evtest` and `/proc/bus/input/devices`)
    pub fn new(name: &str) -> Result<Self, KeyboardError> {
        let mut keys = AttributeSet::<Key>::new();
        for key in keys::supported_keys() {
            keys.insert(key);
        }

        let device = VirtualDeviceBuilder::new()
            .map_err(KeyboardError::CreateDevice)?
            .name(name)
            .with_keys(&keys)
            .map_err(KeyboardError::CreateDevice)?
            .build()
            .map_err(KeyboardError::CreateDevice)?;

        Ok(Self {
            device,
            name: name.to_string(),
        })
    }

    /// Get the device path (e.g., /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }

    // Each emit is terminated with SYN_REPORT by evdev.
    fn emit_key(&mut self, key: Key, value: i32) -> Result<(), KeyboardError> {
        let event = InputEvent::new(evdev::EventType::KEY, key.code(), value);
        self.device
            .emit(&[event])
            .map_err(KeyboardError::EmitEvent)
    }
}

impl KeySink for VirtualKeyboard {
    fn key_down(&mut self, key: Key) -> Result<(), KeyboardError> {
        self.emit_key(key, KEY_PRESS)
    }

    fn key_up(&mut self, key: Key) -> Result<(), KeyboardError> {
        self.emit_key(key, KEY_RELEASE)
    }
}

impl Drop for VirtualKeyboard {
    fn drop(&mut self) {
        debug!("Closing virtual keyboard: {}", self.name);
    }
}

/// Sink that logs key signals instead of emitting them
#[derive(Debug, Default)]
pub struct DryRunKeyboard;

impl DryRunKeyboard {
    pub fn new() -> Self {
        Self
    }
}

impl KeySink for DryRunKeyboard {
    fn key_down(&mut self, key: Key) -> Result<(), KeyboardError> {
        info!("[dry-run] key down: {:?}", key);
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<(), KeyboardError> {
        info!("[dry-run] key up: {:?}", key);
        Ok(())
    }

    fn key_press(&mut self, key: Key) -> Result<(), KeyboardError> {
        info!("[dry-run] key press: {:?}", key);
        Ok(())
    }
}
