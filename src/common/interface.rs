// src/common/interface.rs

//! Register-level access over a [`BusTransport`].
//!
//! Building block for [`SensorDriver`](crate::driver::SensorDriver)
//! implementations: burst reads and writes, presence probe, chip
//! identification and soft reset. The scheduler itself never touches it.

use super::error::{BusError, DriverError, DriverFault};
use super::hal_traits::BusTransport;
use super::timing;
use arrayvec::ArrayVec;
use core::time::Duration;
use log::{error, info};

/// Register holding the chip identifier.
pub const REG_CHIP_ID: u8 = 0xD0;
/// Value of [`REG_CHIP_ID`] on BME680-class parts.
pub const EXPECTED_CHIP_ID: u8 = 0x61;
pub const REG_SOFT_RESET: u8 = 0xE0;
pub const SOFT_RESET_CMD: u8 = 0xB6;
pub const REG_CTRL_HUM: u8 = 0x72;
pub const REG_CTRL_MEAS: u8 = 0x74;
pub const REG_CONFIG: u8 = 0x75;

/// Largest payload of a single register burst write.
pub const MAX_WRITE_LEN: usize = 32;

/// 7-bit device address, selected by the SDO pin.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
#[repr(u8)]
pub enum DeviceAddress {
    /// SDO tied to GND.
    Primary = 0x76,
    /// SDO tied to VDDIO.
    #[default]
    Secondary = 0x77,
}

impl DeviceAddress {
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Register-level access to one sensor over a [`BusTransport`].
///
/// Writes are framed as `[reg, data..]`; reads send the start register then
/// read the burst back in the same transaction.
#[derive(Debug)]
pub struct RegisterInterface<B> {
    bus: B,
    address: DeviceAddress,
}

impl<B: BusTransport> RegisterInterface<B> {
    pub fn new(bus: B, address: DeviceAddress) -> Self {
        RegisterInterface { bus, address }
    }

    pub fn address(&self) -> DeviceAddress {
        self.address
    }

    pub fn release(self) -> B {
        self.bus
    }

    /// Reads `buf.len()` bytes starting at `reg`.
    pub fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), BusError<B::Error>> {
        if buf.is_empty() {
            return Err(BusError::BufferOverflow { needed: 1, got: 0 });
        }
        self.bus.write_then_read(
            self.address.as_u8(),
            &[reg],
            buf,
            timing::REGISTER_READ_TIMEOUT,
        )
    }

    /// Writes `data` starting at `reg`.
    pub fn write_registers(&mut self, reg: u8, data: &[u8]) -> Result<(), BusError<B::Error>> {
        if data.is_empty() || data.len() > MAX_WRITE_LEN {
            return Err(BusError::BufferOverflow {
                needed: data.len().max(1),
                got: MAX_WRITE_LEN,
            });
        }

        let mut frame: ArrayVec<u8, { MAX_WRITE_LEN + 1 }> = ArrayVec::new();
        frame.push(reg);
        frame
            .try_extend_from_slice(data)
            .map_err(|_| BusError::BufferOverflow { needed: data.len() + 1, got: frame.capacity() })?;

        self.bus.write(self.address.as_u8(), &frame)
    }

    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<(), BusError<B::Error>> {
        self.write_registers(reg, &[value])
    }

    pub fn probe(&mut self, timeout: Duration) -> Result<(), BusError<B::Error>> {
        self.bus.probe(self.address.as_u8(), timeout)
    }

    pub fn read_chip_id(&mut self) -> Result<u8, BusError<B::Error>> {
        let mut id = [0u8; 1];
        self.read_registers(REG_CHIP_ID, &mut id)?;
        Ok(id[0])
    }

    /// Probes the device and confirms it reports the expected chip id.
    pub fn identify(&mut self) -> Result<(), DriverError> {
        let addr = self.address.as_u8();

        self.probe(timing::PROBE_TIMEOUT).map_err(|e| {
            error!("probe at {:#04x} failed: {:?}", addr, e);
            DriverError::Fatal(DriverFault::DeviceNotFound)
        })?;

        let chip_id = self.read_chip_id().map_err(|e| {
            error!("CHIP_ID read at {:#04x} failed: {:?}", addr, e);
            DriverError::from(e)
        })?;

        if chip_id != EXPECTED_CHIP_ID {
            error!(
                "unexpected CHIP_ID {:#04x} at {:#04x} (expected {:#04x})",
                chip_id, addr, EXPECTED_CHIP_ID
            );
            return Err(DriverError::Fatal(DriverFault::DeviceNotFound));
        }

        info!("sensor found at {:#04x}", addr);
        Ok(())
    }

    pub fn soft_reset(&mut self) -> Result<(), BusError<B::Error>> {
        self.write_register(REG_SOFT_RESET, SOFT_RESET_CMD)
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    struct MockBusError;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum BusCall {
        Probe(u8, Duration),
        Write(u8, Vec<u8>),
        WriteRead(u8, Vec<u8>, usize),
    }

    struct MockBus {
        calls: Vec<BusCall>,
        present: bool,
        fail_io: bool,
        read_data: Vec<u8>,
    }

    impl MockBus {
        fn new() -> Self {
            MockBus {
                calls: Vec::new(),
                present: true,
                fail_io: false,
                read_data: Vec::new(),
            }
        }
    }

    impl BusTransport for MockBus {
        type Error = MockBusError;

        fn probe(&mut self, address: u8, timeout: Duration) -> Result<(), BusError<Self::Error>> {
            self.calls.push(BusCall::Probe(address, timeout));
            if self.present { Ok(()) } else { Err(BusError::NoAcknowledge) }
        }

        fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), BusError<Self::Error>> {
            self.calls.push(BusCall::Write(address, bytes.to_vec()));
            if self.fail_io { Err(BusError::Io(MockBusError)) } else { Ok(()) }
        }

        fn write_then_read(
            &mut self,
            address: u8,
            out: &[u8],
            input: &mut [u8],
            _timeout: Duration,
        ) -> Result<(), BusError<Self::Error>> {
            self.calls.push(BusCall::WriteRead(address, out.to_vec(), input.len()));
            if self.fail_io {
                return Err(BusError::Io(MockBusError));
            }
            for (i, byte) in input.iter_mut().enumerate() {
                *byte = self.read_data.get(i).copied().unwrap_or(0);
            }
            Ok(())
        }
    }

    #[test]
    fn test_write_registers_prefixes_register() {
        let mut iface = RegisterInterface::new(MockBus::new(), DeviceAddress::Secondary);
        iface.write_registers(REG_CTRL_HUM, &[0x02]).unwrap();
        iface.write_register(REG_CTRL_MEAS, 0x6D).unwrap();

        let bus = iface.release();
        assert_eq!(bus.calls[0], BusCall::Write(0x77, vec![0x72, 0x02]));
        assert_eq!(bus.calls[1], BusCall::Write(0x77, vec![0x74, 0x6D]));
    }

    #[test]
    fn test_write_registers_rejects_oversized_burst() {
        let mut iface = RegisterInterface::new(MockBus::new(), DeviceAddress::Primary);
        let data = [0u8; MAX_WRITE_LEN + 1];
        let result = iface.write_registers(REG_CONFIG, &data);
        assert!(matches!(result, Err(BusError::BufferOverflow { needed: 33, got: 32 })));
        assert!(matches!(iface.write_registers(REG_CONFIG, &[]), Err(BusError::BufferOverflow { .. })));
        // Nothing reached the bus.
        assert!(iface.release().calls.is_empty());
    }

    #[test]
    fn test_write_registers_accepts_full_burst() {
        let mut iface = RegisterInterface::new(MockBus::new(), DeviceAddress::Primary);
        let data = [0xAAu8; MAX_WRITE_LEN];
        iface.write_registers(0x5A, &data).unwrap();
        let bus = iface.release();
        match &bus.calls[0] {
            BusCall::Write(0x76, frame) => {
                assert_eq!(frame.len(), MAX_WRITE_LEN + 1);
                assert_eq!(frame[0], 0x5A);
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_read_registers_sends_start_register() {
        let mut bus = MockBus::new();
        bus.read_data = vec![0x11, 0x22, 0x33];
        let mut iface = RegisterInterface::new(bus, DeviceAddress::Secondary);
        let mut buf = [0u8; 3];
        iface.read_registers(0x1D, &mut buf).unwrap();
        assert_eq!(buf, [0x11, 0x22, 0x33]);
        assert_eq!(iface.release().calls[0], BusCall::WriteRead(0x77, vec![0x1D], 3));
    }

    #[test]
    fn test_read_registers_rejects_empty_buffer() {
        let mut iface = RegisterInterface::new(MockBus::new(), DeviceAddress::Secondary);
        let mut buf = [0u8; 0];
        assert!(matches!(iface.read_registers(0x1D, &mut buf), Err(BusError::BufferOverflow { .. })));
    }

    #[test]
    fn test_identify_success() {
        let mut bus = MockBus::new();
        bus.read_data = vec![EXPECTED_CHIP_ID];
        let mut iface = RegisterInterface::new(bus, DeviceAddress::Secondary);
        assert_eq!(iface.identify(), Ok(()));
        let bus = iface.release();
        assert_eq!(bus.calls[0], BusCall::Probe(0x77, timing::PROBE_TIMEOUT));
        assert_eq!(bus.calls[1], BusCall::WriteRead(0x77, vec![REG_CHIP_ID], 1));
    }

    #[test]
    fn test_identify_absent_device() {
        let mut bus = MockBus::new();
        bus.present = false;
        let mut iface = RegisterInterface::new(bus, DeviceAddress::Primary);
        assert_eq!(iface.identify(), Err(DriverError::Fatal(DriverFault::DeviceNotFound)));
        // Chip id is never read when the probe fails.
        assert_eq!(iface.release().calls.len(), 1);
    }

    #[test]
    fn test_identify_wrong_chip() {
        let mut bus = MockBus::new();
        bus.read_data = vec![0x60];
        let mut iface = RegisterInterface::new(bus, DeviceAddress::Primary);
        assert_eq!(iface.identify(), Err(DriverError::Fatal(DriverFault::DeviceNotFound)));
    }

    #[test]
    fn test_identify_chip_id_read_failure_is_transient() {
        let mut bus = MockBus::new();
        bus.fail_io = true;
        let mut iface = RegisterInterface::new(bus, DeviceAddress::Primary);
        assert_eq!(
            iface.identify(),
            Err(DriverError::Transient(DriverFault::CommunicationFailure))
        );
    }

    #[test]
    fn test_soft_reset() {
        let mut iface = RegisterInterface::new(MockBus::new(), DeviceAddress::Secondary);
        iface.soft_reset().unwrap();
        assert_eq!(iface.release().calls[0], BusCall::Write(0x77, vec![REG_SOFT_RESET, SOFT_RESET_CMD]));
    }
}
