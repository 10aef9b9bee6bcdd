//! SPI bus interface for the ICM-20948
//!
//! This module implements the `device-driver` register interface on top of an
//! `embedded-hal` [`SpiDevice`](embedded_hal::spi::SpiDevice).
//!
//! Every register access is one `SpiDevice` transaction, so chip select is
//! asserted for exactly one command byte plus its payload:
//!
//! | Access | Sent | Received |
//! |--------|------|----------|
//! | read   | `address \| 0x80` | `len` bytes |
//! | write  | `address & 0x7F`, then the payload | nothing |

use device_driver::RegisterInterface;
use embedded_hal::spi::Operation;

/// Read/write flag carried in bit 7 of the SPI command byte
const READ_FLAG: u8 = 0x80;

/// Register interface over an `embedded-hal` SPI device
///
/// Chip select belongs to the `SpiDevice` handed in, which frames each
/// transaction. With `embedded-hal-bus` on a dedicated bus:
///
/// ```ignore
/// let spi_device = embedded_hal_bus::spi::ExclusiveDevice::new(spi_bus, cs_pin, delay)?;
/// let interface = SpiInterface::new(spi_device);
/// ```
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Wrap an SPI device that already drives the ICM-20948 chip select
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Consume the interface and return the SPI device
    pub fn release(self) -> SPI {
        self.spi
    }
}

/// Command byte for a register read (bit 7 set)
#[must_use]
pub const fn read_command(address: u8) -> u8 {
    address | READ_FLAG
}

/// Command byte for a register write (bit 7 clear)
#[must_use]
pub const fn write_command(address: u8) -> u8 {
    address & !READ_FLAG
}

impl<SPI, E> RegisterInterface for SpiInterface<SPI>
where
    SPI: embedded_hal::spi::SpiDevice<Error = E>,
{
    type Error = E;
    type AddressType = u8;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        read_data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.spi.transaction(&mut [
            Operation::Write(&[read_command(address)]),
            Operation::Read(read_data),
        ])
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        write_data: &[u8],
    ) -> Result<(), Self::Error> {
        self.spi.transaction(&mut [
            Operation::Write(&[write_command(address)]),
            Operation::Write(write_data),
        ])
    }
}
