// src/common/types.rs

use super::error::ConfigError;
use core::fmt;

// --- Register-level enumerations ---

/// Oversampling factor for one physical quantity.
///
/// Higher factors average more internal samples, reducing noise at the cost
/// of a longer measurement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Oversampling {
    /// Quantity is skipped entirely.
    None = 0,
    #[default]
    X1 = 1,
    X2 = 2,
    X4 = 3,
    X8 = 4,
    X16 = 5,
}

impl Oversampling {
    /// Register field value.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Number of conversion cycles performed for this factor.
    pub const fn cycles(self) -> u32 {
        match self {
            Oversampling::None => 0,
            Oversampling::X1 => 1,
            Oversampling::X2 => 2,
            Oversampling::X4 => 4,
            Oversampling::X8 => 8,
            Oversampling::X16 => 16,
        }
    }
}

/// IIR filter size applied to temperature and pressure.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Filter {
    #[default]
    Off = 0,
    Size1 = 1,
    Size3 = 2,
    Size7 = 3,
    Size15 = 4,
    Size31 = 5,
    Size63 = 6,
    Size127 = 7,
}

impl Filter {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Standby time between measurements in sequential/parallel modes.
/// Forced mode uses [`OutputDataRate::None`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OutputDataRate {
    Ms0_59 = 0,
    Ms62_5 = 1,
    Ms125 = 2,
    Ms250 = 3,
    Ms500 = 4,
    Ms1000 = 5,
    Ms10 = 6,
    Ms20 = 7,
    #[default]
    None = 8,
}

impl OutputDataRate {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OperationMode {
    #[default]
    Sleep = 0,
    /// One measurement per trigger, then back to sleep.
    Forced = 1,
    Parallel = 2,
    Sequential = 3,
}

impl OperationMode {
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

// --- Configuration ---

/// Oversampling, filter and output data rate for one measurement cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    pub os_hum: Oversampling,
    pub os_temp: Oversampling,
    pub os_pres: Oversampling,
    pub filter: Filter,
    pub odr: OutputDataRate,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig {
            os_hum: Oversampling::X1,
            os_temp: Oversampling::X2,
            os_pres: Oversampling::X16,
            filter: Filter::Off,
            odr: OutputDataRate::None,
        }
    }
}

/// Gas heater plate settings, applied together with [`SensorConfig`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HeaterConfig {
    pub enable: bool,
    /// Target plate temperature in °C.
    pub target_temperature: u16,
    /// Time the plate is held at target before the gas conversion, in ms.
    pub duration_ms: u16,
}

impl HeaterConfig {
    /// Highest plate temperature the heater is specified for.
    pub const MAX_TEMPERATURE: u16 = 400;
    /// Largest duration encodable in the heater wait register (63 * 64 ms).
    pub const MAX_DURATION_MS: u16 = 4032;

    /// Enabled heater with validated settings.
    pub fn new(target_temperature: u16, duration_ms: u16) -> Result<Self, ConfigError> {
        let config = HeaterConfig {
            enable: true,
            target_temperature,
            duration_ms,
        };
        config.validate()?;
        Ok(config)
    }

    pub const fn disabled() -> Self {
        HeaterConfig {
            enable: false,
            target_temperature: 0,
            duration_ms: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_temperature > Self::MAX_TEMPERATURE {
            return Err(ConfigError::HeaterTemperatureOutOfRange {
                celsius: self.target_temperature,
                max: Self::MAX_TEMPERATURE,
            });
        }
        if self.duration_ms > Self::MAX_DURATION_MS {
            return Err(ConfigError::HeaterDurationOutOfRange {
                ms: self.duration_ms,
                max: Self::MAX_DURATION_MS,
            });
        }
        Ok(())
    }
}

impl Default for HeaterConfig {
    fn default() -> Self {
        HeaterConfig {
            enable: true,
            target_temperature: 300,
            duration_ms: 100,
        }
    }
}

// --- Readings ---

/// Compensated output of one driver read, in physical units.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct RawReading {
    /// °C
    pub temperature: f32,
    /// Pa
    pub pressure: f32,
    /// %RH
    pub humidity: f32,
    /// Ω
    pub gas_resistance: f32,
    /// Field status byte (new data, gas valid, heater stable).
    pub status: u8,
}

impl RawReading {
    pub const NEW_DATA: u8 = 0x80;
    pub const GAS_VALID: u8 = 0x20;
    pub const HEATER_STABLE: u8 = 0x10;

    #[inline]
    pub const fn has_new_data(&self) -> bool {
        self.status & Self::NEW_DATA != 0
    }

    #[inline]
    pub const fn gas_valid(&self) -> bool {
        self.status & Self::GAS_VALID != 0
    }

    #[inline]
    pub const fn heater_stable(&self) -> bool {
        self.status & Self::HEATER_STABLE != 0
    }
}

/// Microseconds on the acquisition clock.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    #[inline]
    pub const fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1000
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}s", self.0 / 1_000_000, self.0 % 1_000_000)
    }
}

/// One validated measurement as handed to consumers.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    temperature: f32,
    pressure: f32,
    humidity: f32,
    gas_resistance: f32,
    timestamp: Timestamp,
    sequence: u32,
}

impl Sample {
    /// Builds a sample from a reading that carried new data.
    pub(crate) fn from_reading(reading: &RawReading, timestamp: Timestamp, sequence: u32) -> Self {
        Sample {
            temperature: reading.temperature,
            pressure: reading.pressure,
            humidity: reading.humidity,
            gas_resistance: reading.gas_resistance,
            timestamp,
            sequence,
        }
    }

    /// °C
    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    /// Pa
    pub fn pressure(&self) -> f32 {
        self.pressure
    }

    /// %RH
    pub fn humidity(&self) -> f32 {
        self.humidity
    }

    /// Ω
    pub fn gas_resistance(&self) -> f32 {
        self.gas_resistance
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Position in acquisition order; gaps mean samples were dropped on overflow.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} @{}: {:.2} °C, {:.2} Pa, {:.2} %RH, {:.0} Ω",
            self.sequence,
            self.timestamp,
            self.temperature,
            self.pressure,
            self.humidity,
            self.gas_resistance
        )
    }
}
