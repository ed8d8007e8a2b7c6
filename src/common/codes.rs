// src/common/codes.rs

//! Integer result codes returned by the vendor sensor API, and their mapping
//! onto [`DriverError`]. Driver wrappers call [`check_result`] right after each
//! vendor call so nothing above the driver boundary sees a raw code.

use super::error::{DriverError, DriverFault};
use log::{debug, error, warn};

pub const OK: i8 = 0;

// Errors
pub const E_NULL_PTR: i8 = -1;
pub const E_COM_FAIL: i8 = -2;
pub const E_DEV_NOT_FOUND: i8 = -3;
pub const E_INVALID_LENGTH: i8 = -4;
pub const E_SELF_TEST: i8 = -5;

// Warnings
pub const W_DEFINE_OP_MODE: i8 = 1;
pub const W_NO_NEW_DATA: i8 = 2;
pub const W_DEFINE_SHD_HEATR_DUR: i8 = 3;

/// Classifies a vendor result code. Warnings other than "no new data" are not errors.
pub const fn classify(code: i8) -> Result<(), DriverError> {
    match code {
        OK => Ok(()),
        E_NULL_PTR => Err(DriverError::Fatal(DriverFault::NullPointer)),
        E_COM_FAIL => Err(DriverError::Transient(DriverFault::CommunicationFailure)),
        E_DEV_NOT_FOUND => Err(DriverError::Fatal(DriverFault::DeviceNotFound)),
        E_INVALID_LENGTH => Err(DriverError::Fatal(DriverFault::InvalidLength)),
        E_SELF_TEST => Err(DriverError::Fatal(DriverFault::SelfTestFailed)),
        W_NO_NEW_DATA => Err(DriverError::Transient(DriverFault::NoNewData)),
        c if c < 0 => Err(DriverError::Fatal(DriverFault::Unknown(c))),
        _ => Ok(()),
    }
}

/// Logs a non-OK result of the vendor call `api` and returns its classification.
pub fn check_result(api: &str, code: i8) -> Result<(), DriverError> {
    let result = classify(code);
    match (&result, code) {
        (_, OK) => {}
        (Ok(()), c) => warn!("API name [{}] Warning [{}] : unhandled warning code", api, c),
        (Err(e), c) if e.is_no_new_data() => debug!("API name [{}] Warning [{}] : {}", api, c, e.fault()),
        (Err(e), c) => error!("API name [{}] Error [{}] : {}", api, c, e.fault()),
    }
    result
}
