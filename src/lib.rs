// src/lib.rs

//! Forced-mode acquisition for BME680-class environmental sensors.
//!
//! [`AcquisitionScheduler`] owns a [`SensorDriver`] and repeatedly triggers a
//! measurement, waits the settle time the active configuration needs, reads
//! the result and publishes it into a bounded [`SampleChannel`] that other
//! tasks consume from.

#![cfg_attr(not(test), no_std)] // std only for the test harness

pub mod channel;
pub mod common;
pub mod driver;
pub mod scheduler;

// Re-export key types for convenience
pub use channel::{OverflowPolicy, PublishOutcome, SampleChannel};
pub use common::{AcquisitionError, DriverError, Sample};
pub use driver::SensorDriver;
pub use scheduler::{AcquisitionControl, AcquisitionScheduler, AcquisitionState, SchedulerConfig};
