// src/driver/mod.rs

use crate::common::{
    error::DriverError,
    types::{HeaterConfig, OperationMode, RawReading, SensorConfig},
};

/// Register-protocol driver for one BME680-class sensor.
///
/// The value implementing this trait is the device handle: it is built once
/// during setup and moved into the [`AcquisitionScheduler`](crate::scheduler::AcquisitionScheduler),
/// which becomes its only user. Implementations wrap the vendor result codes
/// (see [`check_result`](crate::common::codes::check_result)) so callers only
/// ever see the Transient/Fatal partition.
pub trait SensorDriver {
    /// Reads calibration data and brings the device out of reset.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Runs the on-chip self test. Leaves the device in its reset configuration.
    fn self_test(&mut self) -> Result<(), DriverError>;

    /// Writes oversampling, filter and output data rate.
    fn apply_config(&mut self, config: &SensorConfig) -> Result<(), DriverError>;

    /// Writes the heater profile used by `mode`.
    fn apply_heater_config(
        &mut self,
        mode: OperationMode,
        heater: &HeaterConfig,
    ) -> Result<(), DriverError>;

    /// Starts a measurement in `mode`.
    fn trigger(&mut self, mode: OperationMode) -> Result<(), DriverError>;

    /// Time the TPH part of a measurement takes for `config`, in microseconds,
    /// excluding heater time.
    fn measurement_duration(&mut self, mode: OperationMode, config: &SensorConfig) -> u32;

    /// Reads the latest measurement and the number of measurement slots that
    /// held new data (0 or 1 in forced mode).
    fn read(&mut self, mode: OperationMode) -> Result<(RawReading, u8), DriverError>;
}

impl<D: SensorDriver + ?Sized> SensorDriver for &mut D {
    fn init(&mut self) -> Result<(), DriverError> {
        (**self).init()
    }

    fn self_test(&mut self) -> Result<(), DriverError> {
        (**self).self_test()
    }

    fn apply_config(&mut self, config: &SensorConfig) -> Result<(), DriverError> {
        (**self).apply_config(config)
    }

    fn apply_heater_config(
        &mut self,
        mode: OperationMode,
        heater: &HeaterConfig,
    ) -> Result<(), DriverError> {
        (**self).apply_heater_config(mode, heater)
    }

    fn trigger(&mut self, mode: OperationMode) -> Result<(), DriverError> {
        (**self).trigger(mode)
    }

    fn measurement_duration(&mut self, mode: OperationMode, config: &SensorConfig) -> u32 {
        (**self).measurement_duration(mode, config)
    }

    fn read(&mut self, mode: OperationMode) -> Result<(RawReading, u8), DriverError> {
        (**self).read(mode)
    }
}
