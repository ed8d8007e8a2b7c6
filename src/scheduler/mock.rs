// src/scheduler/mock.rs

use super::AcquisitionControl;
use crate::common::{
    error::DriverError,
    hal_traits::AcquisitionTimer,
    timing,
    types::{HeaterConfig, OperationMode, RawReading, SensorConfig, Timestamp},
};
use crate::driver::SensorDriver;
use std::collections::VecDeque;
use std::vec::Vec;

// --- Mock Timer ---
pub struct MockTimer<'c> {
    pub now_us: u64,
    pub delays: Vec<u32>,
    stop: Option<(&'c AcquisitionControl, usize)>,
}

impl<'c> MockTimer<'c> {
    pub fn new() -> Self {
        MockTimer {
            now_us: 0,
            delays: Vec::new(),
            stop: None,
        }
    }

    /// Requests a stop on `control` once `after` delays have elapsed.
    pub fn stopping(control: &'c AcquisitionControl, after: usize) -> Self {
        MockTimer {
            now_us: 0,
            delays: Vec::new(),
            stop: Some((control, after)),
        }
    }
}

impl AcquisitionTimer for MockTimer<'_> {
    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.now_us += ms as u64 * 1000;
        if let Some((control, after)) = self.stop {
            if self.delays.len() >= after {
                control.request_stop();
            }
        }
    }

    fn now(&self) -> Timestamp {
        Timestamp(self.now_us)
    }
}

// --- Mock Driver ---
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Init,
    SelfTest,
    ApplyConfig(SensorConfig),
    ApplyHeater(OperationMode, HeaterConfig),
    Trigger(OperationMode),
    Duration(OperationMode),
    Read(OperationMode),
}

/// Scripted driver: each queue is consumed front to back, then the default applies.
pub struct MockDriver {
    pub calls: Vec<DriverCall>,
    pub init_result: Result<(), DriverError>,
    pub self_test_results: VecDeque<Result<(), DriverError>>,
    pub self_test_default: Result<(), DriverError>,
    pub apply_config_results: VecDeque<Result<(), DriverError>>,
    pub apply_config_default: Result<(), DriverError>,
    pub heater_results: VecDeque<Result<(), DriverError>>,
    pub trigger_results: VecDeque<Result<(), DriverError>>,
    pub reads: VecDeque<Result<(RawReading, u8), DriverError>>,
    /// Zero means "use the reference formula".
    pub duration_us: u32,
}

impl MockDriver {
    pub fn new() -> Self {
        MockDriver {
            calls: Vec::new(),
            init_result: Ok(()),
            self_test_results: VecDeque::new(),
            self_test_default: Ok(()),
            apply_config_results: VecDeque::new(),
            apply_config_default: Ok(()),
            heater_results: VecDeque::new(),
            trigger_results: VecDeque::new(),
            reads: VecDeque::new(),
            duration_us: 0,
        }
    }

    pub fn reading(temperature: f32) -> RawReading {
        RawReading {
            temperature,
            pressure: 101_325.0,
            humidity: 40.0,
            gas_resistance: 80_000.0,
            status: RawReading::NEW_DATA | RawReading::GAS_VALID | RawReading::HEATER_STABLE,
        }
    }

    pub fn count(&self, pred: impl Fn(&DriverCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

impl SensorDriver for MockDriver {
    fn init(&mut self) -> Result<(), DriverError> {
        self.calls.push(DriverCall::Init);
        self.init_result
    }

    fn self_test(&mut self) -> Result<(), DriverError> {
        self.calls.push(DriverCall::SelfTest);
        self.self_test_results.pop_front().unwrap_or(self.self_test_default)
    }

    fn apply_config(&mut self, config: &SensorConfig) -> Result<(), DriverError> {
        self.calls.push(DriverCall::ApplyConfig(*config));
        self.apply_config_results.pop_front().unwrap_or(self.apply_config_default)
    }

    fn apply_heater_config(&mut self, mode: OperationMode, heater: &HeaterConfig) -> Result<(), DriverError> {
        self.calls.push(DriverCall::ApplyHeater(mode, *heater));
        self.heater_results.pop_front().unwrap_or(Ok(()))
    }

    fn trigger(&mut self, mode: OperationMode) -> Result<(), DriverError> {
        self.calls.push(DriverCall::Trigger(mode));
        self.trigger_results.pop_front().unwrap_or(Ok(()))
    }

    fn measurement_duration(&mut self, mode: OperationMode, config: &SensorConfig) -> u32 {
        self.calls.push(DriverCall::Duration(mode));
        if self.duration_us == 0 {
            timing::forced_measurement_duration_us(mode, config)
        } else {
            self.duration_us
        }
    }

    fn read(&mut self, mode: OperationMode) -> Result<(RawReading, u8), DriverError> {
        self.calls.push(DriverCall::Read(mode));
        self.reads
            .pop_front()
            .unwrap_or_else(|| Ok((MockDriver::reading(25.0), 1)))
    }
}
