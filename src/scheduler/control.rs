// src/scheduler/control.rs

use crate::common::{
    error::ConfigError,
    types::{HeaterConfig, SensorConfig},
};
use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};
use critical_section::Mutex;

/// Shared control block for a running acquisition loop.
///
/// Other tasks use it to ask the loop to stop and to hand over a replacement
/// configuration. The loop only looks at it at cycle boundaries: the stop flag
/// before an AwaitingSettle or Idling suspension, the pending configuration
/// before a trigger. Can be declared as a `static`.
pub struct AcquisitionControl {
    stop: AtomicBool,
    pending: Mutex<Cell<Option<(SensorConfig, HeaterConfig)>>>,
}

impl AcquisitionControl {
    pub const fn new() -> Self {
        AcquisitionControl {
            stop: AtomicBool::new(false),
            pending: Mutex::new(Cell::new(None)),
        }
    }

    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn clear_stop(&self) {
        self.stop.store(false, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// Queues a configuration pair for the next cycle boundary.
    ///
    /// A later call before the loop picks it up replaces the earlier one.
    pub fn replace_config(&self, sensor: SensorConfig, heater: HeaterConfig) -> Result<(), ConfigError> {
        heater.validate()?;
        critical_section::with(|cs| self.pending.borrow(cs).set(Some((sensor, heater))));
        Ok(())
    }

    pub fn has_pending_config(&self) -> bool {
        critical_section::with(|cs| self.pending.borrow(cs).get().is_some())
    }

    pub(crate) fn take_pending_config(&self) -> Option<(SensorConfig, HeaterConfig)> {
        critical_section::with(|cs| self.pending.borrow(cs).take())
    }
}

impl Default for AcquisitionControl {
    fn default() -> Self {
        Self::new()
    }
}
