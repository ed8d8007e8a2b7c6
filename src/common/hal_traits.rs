// src/common/hal_traits.rs

use super::error::BusError;
use super::types::Timestamp;
use core::fmt::Debug;
use core::time::Duration;

/// Abstraction for the suspension and clock operations the acquisition loop needs.
///
/// `delay_ms` is the cooperative suspension point: on an RTOS it should yield
/// the task rather than spin.
pub trait AcquisitionTimer {
    /// Suspend for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Current time on a monotonic clock.
    fn now(&self) -> Timestamp;
}

/// Addressed, bounded bus transactions to a peripheral.
///
/// Every operation either completes within its timeout (or the transport's
/// own bound when none is given) or returns a [`BusError`]; none blocks
/// indefinitely. Implementations do not retry.
pub trait BusTransport {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Checks that a device acknowledges at `address`.
    fn probe(&mut self, address: u8, timeout: Duration) -> Result<(), BusError<Self::Error>>;

    /// Writes `bytes` to the device at `address`.
    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError<Self::Error>>;

    /// Writes `out` then reads `input.len()` bytes into `input` in one transaction.
    fn write_then_read(
        &mut self,
        address: u8,
        out: &[u8],
        input: &mut [u8],
        timeout: Duration,
    ) -> Result<(), BusError<Self::Error>>;
}

/// Adapts an `embedded_hal::i2c::I2c` bus to [`BusTransport`].
///
/// Timeouts are left to the HAL, which is expected to bound its own
/// transactions.
#[cfg(feature = "impl-native")]
#[derive(Debug)]
pub struct NativeI2c<I> {
    i2c: I,
}

#[cfg(feature = "impl-native")]
impl<I> NativeI2c<I> {
    pub fn new(i2c: I) -> Self {
        NativeI2c { i2c }
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

#[cfg(feature = "impl-native")]
fn map_i2c_error<E: embedded_hal::i2c::Error>(e: E) -> BusError<E> {
    match e.kind() {
        embedded_hal::i2c::ErrorKind::NoAcknowledge(_) => BusError::NoAcknowledge,
        _ => BusError::Io(e),
    }
}

#[cfg(feature = "impl-native")]
impl<I: embedded_hal::i2c::I2c> BusTransport for NativeI2c<I> {
    type Error = I::Error;

    fn probe(&mut self, address: u8, _timeout: Duration) -> Result<(), BusError<Self::Error>> {
        self.i2c.write(address, &[]).map_err(map_i2c_error)
    }

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError<Self::Error>> {
        self.i2c.write(address, bytes).map_err(map_i2c_error)
    }

    fn write_then_read(
        &mut self,
        address: u8,
        out: &[u8],
        input: &mut [u8],
        _timeout: Duration,
    ) -> Result<(), BusError<Self::Error>> {
        self.i2c.write_read(address, out, input).map_err(map_i2c_error)
    }
}

/// Builds an [`AcquisitionTimer`] from an `embedded_hal::delay::DelayNs` and a clock function.
#[cfg(feature = "impl-native")]
pub struct NativeTimer<D, F> {
    delay: D,
    clock: F,
}

#[cfg(feature = "impl-native")]
impl<D, F> NativeTimer<D, F>
where
    D: embedded_hal::delay::DelayNs,
    F: Fn() -> Timestamp,
{
    pub fn new(delay: D, clock: F) -> Self {
        NativeTimer { delay, clock }
    }
}

#[cfg(feature = "impl-native")]
impl<D, F> AcquisitionTimer for NativeTimer<D, F>
where
    D: embedded_hal::delay::DelayNs,
    F: Fn() -> Timestamp,
{
    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn now(&self) -> Timestamp {
        (self.clock)()
    }
}
