// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod codes;
pub mod error;
pub mod hal_traits;
pub mod interface;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From codes.rs
pub use codes::check_result;

// From error.rs
pub use error::{AcquisitionError, BusError, ChannelClosed, ConfigError, DriverError, DriverFault};

// From hal_traits.rs
pub use hal_traits::{AcquisitionTimer, BusTransport};

// From interface.rs
pub use interface::{DeviceAddress, RegisterInterface};

// From timing.rs (constants - users can access via common::timing::*)
pub use timing::{forced_measurement_duration_us, settle_wait_ms};

// From types.rs
pub use types::{
    Filter, HeaterConfig, OperationMode, OutputDataRate, Oversampling, RawReading, Sample, SensorConfig,
    Timestamp,
};

// --- Feature-gated re-exports ---

// Native HAL adapters (from hal_traits.rs)
#[cfg(feature = "impl-native")]
pub use hal_traits::{NativeI2c, NativeTimer};
