// src/scheduler/cycle.rs

use super::{AcquisitionScheduler, AcquisitionState, SelfTestPolicy};
use crate::channel::PublishOutcome;
use crate::common::{
    error::{AcquisitionError, DriverError, DriverFault},
    hal_traits::AcquisitionTimer,
    timing,
    types::{OperationMode, RawReading, Sample},
};
use crate::driver::SensorDriver;
use log::{debug, error, info, trace, warn};

const MODE: OperationMode = OperationMode::Forced;

impl<D, T, const N: usize> AcquisitionScheduler<'_, D, T, N>
where
    D: SensorDriver,
    T: AcquisitionTimer,
{
    /// Uninitialized: init the driver, then the self test per policy.
    pub(super) fn start(&mut self) -> Result<(), AcquisitionError> {
        info!("initializing sensor driver");
        if let Err(e) = self.driver.init() {
            error!("sensor init failed: {}", e);
            return Err(AcquisitionError::Init(e));
        }
        self.run_self_test()?;
        info!("sensor ready for forced-mode acquisition");
        Ok(())
    }

    fn run_self_test(&mut self) -> Result<(), AcquisitionError> {
        match self.config.self_test {
            SelfTestPolicy::Skip => Ok(()),
            SelfTestPolicy::LogOnly => {
                match self.driver.self_test() {
                    Ok(()) => info!("self-test passed"),
                    Err(e) => warn!("self-test failed: {}; continuing", e),
                }
                Ok(())
            }
            SelfTestPolicy::FatalAfter(attempts) => {
                let attempts = attempts.max(1);
                let mut last = DriverError::Fatal(DriverFault::SelfTestFailed);
                for attempt in 1..=attempts {
                    match self.driver.self_test() {
                        Ok(()) => {
                            info!("self-test passed (attempt {}/{})", attempt, attempts);
                            return Ok(());
                        }
                        Err(e) => {
                            warn!("self-test attempt {}/{} failed: {}", attempt, attempts, e);
                            last = e;
                        }
                    }
                }
                error!("self-test failed {} times, giving up", attempts);
                Err(AcquisitionError::SelfTest(last))
            }
        }
    }

    /// Configured: write sensor and heater settings. Both or neither count as applied.
    ///
    /// A pending replacement is taken before every attempt, so a config that
    /// keeps failing can be swapped out while the step is retrying.
    pub(super) fn apply_configuration(&mut self) -> AcquisitionState {
        self.adopt_pending_config();
        let result = self
            .driver
            .apply_config(&self.config.sensor)
            .map_err(|e| ("apply_config", e))
            .and_then(|()| {
                self.driver
                    .apply_heater_config(MODE, &self.config.heater)
                    .map_err(|e| ("apply_heater_config", e))
            });

        match result {
            Ok(()) => {
                debug!(
                    "configuration applied: {:?}, heater {:?}",
                    self.config.sensor, self.config.heater
                );
                AcquisitionState::Triggering
            }
            Err((op, e)) => {
                self.stats.config_retries = self.stats.config_retries.wrapping_add(1);
                self.log_retry(op, e);
                self.backoff();
                AcquisitionState::Configured
            }
        }
    }

    /// Triggering: adopt a pending replacement, or start a measurement.
    pub(super) fn trigger_measurement(&mut self) -> AcquisitionState {
        if self.adopt_pending_config() {
            return AcquisitionState::Configured;
        }

        if let Err(e) = self.driver.trigger(MODE) {
            self.stats.trigger_retries = self.stats.trigger_retries.wrapping_add(1);
            self.log_retry("trigger", e);
            self.backoff();
            return AcquisitionState::Triggering;
        }
        self.stats.triggers = self.stats.triggers.wrapping_add(1);

        let measurement_us = self.driver.measurement_duration(MODE, &self.config.sensor);
        let wait_ms = timing::settle_wait_ms(measurement_us, &self.config.heater, self.config.tick_period_ms);
        trace!(
            "measurement {} us + heater {} ms -> settle {} ms",
            measurement_us,
            self.config.heater.duration_ms,
            wait_ms
        );
        self.last_settle_wait_ms = Some(wait_ms);
        AcquisitionState::AwaitingSettle { wait_ms }
    }

    /// AwaitingSettle: the only variable-length suspension in the cycle.
    pub(super) fn await_settle(&mut self, wait_ms: u32) -> AcquisitionState {
        self.timer.delay_ms(wait_ms);
        AcquisitionState::Reading
    }

    /// Reading: fetch the result and publish it if it carries new data.
    pub(super) fn read_measurement(&mut self) -> AcquisitionState {
        match self.driver.read(MODE) {
            Ok((reading, count)) if count > 0 => self.publish(&reading),
            Ok(_) => {
                self.stats.empty_reads = self.stats.empty_reads.wrapping_add(1);
                debug!("read returned no new data");
            }
            Err(e) if e.is_no_new_data() => {
                self.stats.empty_reads = self.stats.empty_reads.wrapping_add(1);
                debug!("read: {}", e);
            }
            Err(e) => {
                self.stats.read_failures = self.stats.read_failures.wrapping_add(1);
                error!("read failed: {}; skipping this cycle", e);
            }
        }
        AcquisitionState::Idling
    }

    /// Idling: fixed spacing before the next trigger.
    pub(super) fn idle(&mut self) -> AcquisitionState {
        self.timer.delay_ms(self.config.idle_period_ms);
        AcquisitionState::Triggering
    }

    fn publish(&mut self, reading: &RawReading) {
        if self.config.heater.enable && !reading.heater_stable() {
            warn!("gas reading taken before the heater plate was stable");
        }

        let sample = Sample::from_reading(reading, self.timer.now(), self.next_sequence);
        self.next_sequence = self.next_sequence.wrapping_add(1);
        self.stats.published = self.stats.published.wrapping_add(1);

        match self.channel.publish(sample) {
            PublishOutcome::Accepted => debug!("published {}", sample),
            PublishOutcome::DisplacedOldest(evicted) => {
                warn!("sample channel full, dropped #{}", evicted.sequence())
            }
            PublishOutcome::Rejected => warn!("sample channel rejected #{}", sample.sequence()),
        }
    }

    fn adopt_pending_config(&mut self) -> bool {
        match self.control.take_pending_config() {
            Some((sensor, heater)) => {
                info!("adopting replacement configuration");
                self.config.sensor = sensor;
                self.config.heater = heater;
                true
            }
            None => false,
        }
    }

    fn log_retry(&self, op: &str, e: DriverError) {
        if e.is_fatal() {
            error!(
                "{} failed with fatal-class fault {} during acquisition; retrying in {} ms",
                op,
                e.fault(),
                self.config.retry_backoff_ms
            );
        } else {
            warn!("{} failed: {}; retrying in {} ms", op, e, self.config.retry_backoff_ms);
        }
    }

    fn backoff(&mut self) {
        self.timer.delay_ms(self.config.retry_backoff_ms);
    }
}
