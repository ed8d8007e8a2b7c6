// src/scheduler/mod.rs

//! Forced-mode acquisition loop.
//!
//! The scheduler owns the sensor driver and timer and advances one state per
//! [`AcquisitionScheduler::step`]:
//!
//! ```text
//! Uninitialized -> Configured -> Triggering -> AwaitingSettle -> Reading -> Idling
//!       |              ^  |          ^  |                                     |
//!       v              +--+          +--+ (1 s backoff on failure)            |
//!    Faulted                         ^----------------------------------------+
//! ```
//!
//! Only startup can fault. Every steady-state failure is logged and recovered
//! by retrying the step after a backoff, or by skipping the publish for the
//! cycle.

mod control;
mod cycle;

#[cfg(test)]
mod mock;

pub use control::AcquisitionControl;

use crate::channel::{SampleChannel, DEFAULT_CAPACITY};
use crate::common::{
    error::{AcquisitionError, ConfigError},
    hal_traits::AcquisitionTimer,
    timing,
    types::{HeaterConfig, SensorConfig},
};
use crate::driver::SensorDriver;
use log::info;

/// What to do when the startup self test fails.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum SelfTestPolicy {
    /// Do not run the self test.
    Skip,
    /// Run it once and log the outcome; failure does not stop startup.
    #[default]
    LogOnly,
    /// Run it up to `n` times; fault only if every attempt fails.
    FatalAfter(u8),
}

/// Construction-time settings of an [`AcquisitionScheduler`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub sensor: SensorConfig,
    pub heater: HeaterConfig,
    /// Pause between the end of a read and the next trigger.
    pub idle_period_ms: u32,
    /// Pause before retrying a failed configuration or trigger step.
    pub retry_backoff_ms: u32,
    /// Settle waits are rounded up to a multiple of this.
    pub tick_period_ms: u32,
    pub self_test: SelfTestPolicy,
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.heater.validate()?;
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        // Zero pauses would turn the retry and idle delays into a busy loop.
        if self.retry_backoff_ms == 0 {
            return Err(ConfigError::ZeroRetryBackoff);
        }
        if self.idle_period_ms == 0 {
            return Err(ConfigError::ZeroIdlePeriod);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            sensor: SensorConfig::default(),
            heater: HeaterConfig::default(),
            idle_period_ms: timing::DEFAULT_IDLE_PERIOD.as_millis() as u32,
            retry_backoff_ms: timing::RETRY_BACKOFF.as_millis() as u32,
            tick_period_ms: timing::DEFAULT_TICK_PERIOD.as_millis() as u32,
            self_test: SelfTestPolicy::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AcquisitionState {
    Uninitialized,
    /// Driver is up; configuration is (re)applied on the next step.
    Configured,
    Triggering,
    /// Measurement running; the next step suspends for `wait_ms`.
    AwaitingSettle { wait_ms: u32 },
    Reading,
    Idling,
    /// Startup failed. Terminal.
    Faulted(AcquisitionError),
}

impl AcquisitionState {
    #[inline]
    pub const fn is_faulted(&self) -> bool {
        matches!(self, AcquisitionState::Faulted(_))
    }

    /// States whose step is a cooperative suspension, where a stop request is honoured.
    #[inline]
    pub const fn is_suspension_point(&self) -> bool {
        matches!(self, AcquisitionState::AwaitingSettle { .. } | AcquisitionState::Idling)
    }
}

/// Per-scheduler counters.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CycleStats {
    /// Successful triggers.
    pub triggers: u32,
    pub published: u32,
    /// Reads that produced no new data.
    pub empty_reads: u32,
    pub read_failures: u32,
    pub config_retries: u32,
    pub trigger_retries: u32,
}

/// Drives the measurement cycle for one sensor and publishes into a [`SampleChannel`].
pub struct AcquisitionScheduler<'a, D, T, const N: usize = DEFAULT_CAPACITY> {
    driver: D,
    timer: T,
    channel: &'a SampleChannel<N>,
    control: &'a AcquisitionControl,
    config: SchedulerConfig,
    state: AcquisitionState,
    next_sequence: u32,
    last_settle_wait_ms: Option<u32>,
    stats: CycleStats,
}

impl<'a, D, T, const N: usize> AcquisitionScheduler<'a, D, T, N>
where
    D: SensorDriver,
    T: AcquisitionTimer,
{
    /// Takes ownership of the driver and timer. Nothing touches the bus until
    /// the first [`step`](Self::step).
    pub fn new(
        driver: D,
        timer: T,
        channel: &'a SampleChannel<N>,
        control: &'a AcquisitionControl,
        config: SchedulerConfig,
    ) -> Result<Self, AcquisitionError> {
        config.validate()?;
        Ok(AcquisitionScheduler {
            driver,
            timer,
            channel,
            control,
            config,
            state: AcquisitionState::Uninitialized,
            next_sequence: 0,
            last_settle_wait_ms: None,
            stats: CycleStats::default(),
        })
    }

    pub fn state(&self) -> AcquisitionState {
        self.state
    }

    /// Configuration currently in effect (including adopted replacements).
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    /// Settle wait computed for the most recent trigger.
    pub fn last_settle_wait_ms(&self) -> Option<u32> {
        self.last_settle_wait_ms
    }

    /// Gives the driver and timer back.
    pub fn release(self) -> (D, T) {
        (self.driver, self.timer)
    }

    /// Performs the work of the current state and moves to the next one.
    ///
    /// Returns the new state. Errors only when startup fails; once faulted,
    /// every further call returns the same error without touching the driver.
    pub fn step(&mut self) -> Result<AcquisitionState, AcquisitionError> {
        let next = match self.state {
            AcquisitionState::Uninitialized => match self.start() {
                Ok(()) => AcquisitionState::Configured,
                Err(e) => {
                    self.state = AcquisitionState::Faulted(e);
                    return Err(e);
                }
            },
            AcquisitionState::Configured => self.apply_configuration(),
            AcquisitionState::Triggering => self.trigger_measurement(),
            AcquisitionState::AwaitingSettle { wait_ms } => self.await_settle(wait_ms),
            AcquisitionState::Reading => self.read_measurement(),
            AcquisitionState::Idling => self.idle(),
            AcquisitionState::Faulted(e) => return Err(e),
        };
        self.state = next;
        Ok(next)
    }

    /// Runs the cycle until a stop is requested or startup fails.
    ///
    /// A stop request is only acted on before a suspension step, so an
    /// in-flight bus transaction always completes first. Configured and
    /// Triggering are not suspension points: while apply or trigger keeps
    /// failing, the stop waits until the step succeeds.
    pub fn run(&mut self) -> Result<(), AcquisitionError> {
        loop {
            if self.state.is_suspension_point() && self.control.stop_requested() {
                info!("stop requested in {:?}, leaving acquisition loop", self.state);
                return Ok(());
            }
            self.step()?;
        }
    }
}
