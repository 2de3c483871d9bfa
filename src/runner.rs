//! Blocking event loop
//!
//! Reads one event at a time and fully dispatches it before reading the
//! next. There is no queueing, concurrency or in-loop cancellation: the
//! loop ends when the source does, and interrupts terminate the process.

use crate::device::{DeviceError, EventSource};
use crate::dispatcher::{Dispatch, Dispatcher};
use crate::keyboard::KeySink;
use tracing::{debug, info};

/// Process exit status after Ctrl-C (128 + SIGINT)
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Counters collected over a run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub events: u64,
    pub executed: u64,
    pub failed: u64,
    pub ring_recognized: u64,
}

impl RunStats {
    fn record(&mut self, outcome: &Dispatch) {
        self.events += 1;
        match outcome {
            Dispatch::Executed { .. } => self.executed += 1,
            Dispatch::Failed { .. } => self.failed += 1,
            Dispatch::RingRecognized { .. } => self.ring_recognized += 1,
            Dispatch::Ignored | Dispatch::Unmapped => {}
        }
    }
}

/// Pump events from `source` into `dispatcher`.
///
/// Returns when the source is exhausted. A read error ends the loop with
/// that error.
pub fn run<E, S>(source: &mut E, dispatcher: &mut Dispatcher<S>) -> Result<RunStats, DeviceError>
where
    E: EventSource + ?Sized,
    S: KeySink,
{
    let mut stats = RunStats::default();

    while let Some(event) = source.next_event()? {
        debug!("Event: {:?}", event);
        let outcome = dispatcher.handle(event);
        stats.record(&outcome);
    }

    info!("Event source exhausted");
    Ok(stats)
}
