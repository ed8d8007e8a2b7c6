// src/common/timing.rs

use super::types::{HeaterConfig, OperationMode, SensorConfig};
use core::time::Duration;

// === Scheduler defaults ===

/// Spacing between the end of one read and the next trigger.
pub const DEFAULT_IDLE_PERIOD: Duration = Duration::from_millis(5000);
/// Wait before re-attempting a failed configuration or trigger step.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(1000);
/// Granularity the settle wait is rounded up to.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_millis(1);

// === Bus ===

/// Probe timeout used when bringing up the interface.
pub const PROBE_TIMEOUT: Duration = Duration::from_millis(1000);
/// Timeout for a single register burst read.
pub const REGISTER_READ_TIMEOUT: Duration = Duration::from_millis(100);

// === Measurement duration (vendor formula, all in µs) ===

/// One temperature/pressure/humidity conversion cycle.
pub const CONVERSION_CYCLE_US: u32 = 1963;
/// Switching overhead between conversions.
pub const SWITCHING_US: u32 = 477;
/// Switching slots taken by the T/P/H sequence.
pub const TPH_SWITCHING_SLOTS: u32 = 4;
/// Switching slots taken by the gas measurement.
pub const GAS_SWITCHING_SLOTS: u32 = 5;
/// Wake-up from sleep, paid by every mode except parallel.
pub const WAKE_UP_US: u32 = 1000;

/// Reference TPH measurement duration for `config` in `mode`, excluding heating.
///
/// Drivers without their own computation can return this from
/// [`SensorDriver::measurement_duration`](crate::driver::SensorDriver::measurement_duration).
pub fn forced_measurement_duration_us(mode: OperationMode, config: &SensorConfig) -> u32 {
    let cycles = config.os_temp.cycles() + config.os_pres.cycles() + config.os_hum.cycles();

    let mut duration = cycles * CONVERSION_CYCLE_US;
    duration += SWITCHING_US * TPH_SWITCHING_SLOTS;
    duration += SWITCHING_US * GAS_SWITCHING_SLOTS;

    if mode != OperationMode::Parallel {
        duration += WAKE_UP_US;
    }

    duration
}

/// Settle wait after a forced-mode trigger, in whole milliseconds.
///
/// Sum of the driver-reported duration and the heater duration, rounded up to
/// a whole millisecond and then up to a multiple of `tick_ms`. Never rounds
/// down. A `tick_ms` of 0 is treated as 1.
pub fn settle_wait_ms(measurement_us: u32, heater: &HeaterConfig, tick_ms: u32) -> u32 {
    let total_us = measurement_us as u64 + heater.duration_ms as u64 * 1000;
    let wait_ms = total_us.div_ceil(1000);

    let tick = tick_ms.max(1) as u64;
    let rounded = wait_ms.div_ceil(tick) * tick;

    rounded.min(u32::MAX as u64) as u32
}
