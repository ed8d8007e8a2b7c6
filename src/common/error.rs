// src/common/error.rs

use core::fmt::Debug;

/// Underlying cause reported by a sensor driver call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DriverFault {
    /// A required handle or buffer was missing (programmer error).
    #[error("null pointer")]
    NullPointer,

    /// The bus transaction failed.
    #[error("communication failure")]
    CommunicationFailure,

    /// A length argument was out of range for the register protocol.
    #[error("incorrect length parameter")]
    InvalidLength,

    /// Nothing answered at the device address, or the chip id did not match.
    #[error("device not found")]
    DeviceNotFound,

    #[error("self test error")]
    SelfTestFailed,

    /// The measurement slot did not hold new data.
    #[error("no new data found")]
    NoNewData,

    /// Result code the driver does not document.
    #[error("unknown error code {0}")]
    Unknown(i8),
}

/// Driver error, partitioned into the two classes the scheduler acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    /// Expected to possibly succeed on retry without intervention.
    #[error("transient driver error: {0}")]
    Transient(DriverFault),

    /// Requires external intervention before retrying is meaningful.
    #[error("fatal driver error: {0}")]
    Fatal(DriverFault),
}

impl DriverError {
    #[inline]
    pub const fn fault(&self) -> DriverFault {
        match self {
            DriverError::Transient(fault) | DriverError::Fatal(fault) => *fault,
        }
    }

    #[inline]
    pub const fn is_transient(&self) -> bool {
        matches!(self, DriverError::Transient(_))
    }

    #[inline]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, DriverError::Fatal(_))
    }

    /// True for the "no new data" warning, which is not a failure in forced mode.
    #[inline]
    pub const fn is_no_new_data(&self) -> bool {
        matches!(self, DriverError::Transient(DriverFault::NoNewData))
    }
}

/// Errors surfaced by a [`BusTransport`](super::hal_traits::BusTransport).
#[derive(Debug, thiserror::Error)]
pub enum BusError<E = ()>
where
    E: Debug,
{
    /// Underlying I/O error from the HAL implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// The addressed device did not acknowledge.
    #[error("No acknowledge from device")]
    NoAcknowledge,

    /// Operation timed out.
    #[error("Operation timed out")]
    Timeout,

    /// Buffer provided was too small.
    #[error("Buffer overflow: needed {needed}, got {got}")]
    BufferOverflow { needed: usize, got: usize },
}

impl<E: Debug> From<BusError<E>> for DriverError {
    fn from(e: BusError<E>) -> Self {
        match e {
            BusError::BufferOverflow { .. } => DriverError::Fatal(DriverFault::InvalidLength),
            BusError::Io(_) | BusError::NoAcknowledge | BusError::Timeout => {
                DriverError::Transient(DriverFault::CommunicationFailure)
            }
        }
    }
}

/// Rejected sensor/heater/scheduler settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Heater target temperature {celsius} °C exceeds {max} °C")]
    HeaterTemperatureOutOfRange { celsius: u16, max: u16 },

    #[error("Heater duration {ms} ms exceeds {max} ms")]
    HeaterDurationOutOfRange { ms: u16, max: u16 },

    #[error("Tick period must be at least 1 ms")]
    ZeroTickPeriod,

    #[error("Retry backoff must be at least 1 ms")]
    ZeroRetryBackoff,

    #[error("Idle period must be at least 1 ms")]
    ZeroIdlePeriod,
}

/// Errors that terminate the acquisition loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AcquisitionError {
    /// Sensor driver could not be initialized (device absent, wiring, addressing).
    #[error("Sensor initialization failed: {0}")]
    Init(DriverError),

    /// Self-test kept failing under [`SelfTestPolicy::FatalAfter`](crate::scheduler::SelfTestPolicy).
    #[error("Sensor self-test failed: {0}")]
    SelfTest(DriverError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// The sample channel was closed and holds no more samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Sample channel closed")]
pub struct ChannelClosed;
