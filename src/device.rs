//! ShuttleXpress input device discovery and reading

use crate::event::RawEvent;
use evdev::Device;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Contour Design vendor ID
pub const SHUTTLE_VENDOR_ID: u16 = 0x0b33;
/// ShuttleXpress product ID
pub const SHUTTLE_PRODUCT_ID: u16 = 0x0020;

/// Errors from the input device
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Device {vendor:04x}:{product:04x} not found")]
    NotFound { vendor: u16, product: u16 },
    #[error("Failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read event: {0}")]
    Read(#[source] std::io::Error),
}

/// Blocking source of raw events
pub trait EventSource {
    /// Block until the next relevant event.
    ///
    /// `Ok(None)` means the source is exhausted.
    fn next_event(&mut self) -> Result<Option<RawEvent>, DeviceError>;
}

/// Find the event node of the first device matching a vendor/product pair
pub fn find_device(vendor: u16, product: u16) -> Result<PathBuf, DeviceError> {
    for (path, dev) in evdev::enumerate() {
        let id = dev.input_id();
        debug!(
            "Found {:?} ({:04x}:{:04x}) at {}",
            dev.name().unwrap_or("unknown"),
            id.vendor(),
            id.product(),
            path.display()
        );
        if id.vendor() == vendor && id.product() == product {
            return Ok(path);
        }
    }
    Err(DeviceError::NotFound { vendor, product })
}

/// An opened ShuttleXpress event node
pub struct ShuttleDevice {
    device: Device,
    path: PathBuf,
    pending: VecDeque<RawEvent>,
}

impl ShuttleDevice {
    /// Open an event node for blocking reads
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        let device = Device::open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            device,
            path: path.to_path_buf(),
            pending: VecDeque::new(),
        })
    }

    /// Path of the opened event node
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Device name as reported by the kernel
    pub fn name(&self) -> Option<&str> {
        self.device.name()
    }
}

impl EventSource for ShuttleDevice {
    fn next_event(&mut self) -> Result<Option<RawEvent>, DeviceError> {
        // evdev hands out events in synced batches; most entries are SYN/MSC noise.
        while self.pending.is_empty() {
            let events = self.device.fetch_events().map_err(DeviceError::Read)?;
            self.pending
                .extend(events.filter_map(|ev| RawEvent::from_input_event(&ev)));
        }
        Ok(self.pending.pop_front())
    }
}
