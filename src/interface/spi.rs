//! SPI interface adapter for the BMA253.
//!
//! Experimental: the SPI transport has not been validated on hardware yet.

use embedded_hal_async::spi::{Operation, SpiDevice};

use super::{Interface, sealed};
use crate::error::Error;

/// SPI interface configuration (experimental).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpiConfig {}

impl SpiConfig {
    /// Creates a new SPI configuration (4-wire).
    pub const fn new() -> Self {
        Self {}
    }
}

/// SPI register interface (experimental).
pub struct SpiInterface<SPI> {
    spi: SPI,
}

impl<SPI> SpiInterface<SPI> {
    /// Creates a new SPI interface with the given bus.
    pub const fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Releases the underlying SPI bus.
    pub fn release(self) -> SPI {
        self.spi
    }
}

const SPI_READ_MASK: u8 = 0x80;

const fn spi_addr_read(reg: u8) -> u8 {
    (reg & 0x7F) | SPI_READ_MASK
}

const fn spi_addr_write(reg: u8) -> u8 {
    reg & 0x7F
}

impl<SPI> Interface for SpiInterface<SPI>
where
    SPI: SpiDevice,
{
    async fn read_reg(&mut self, reg: u8) -> Result<u8, Error> {
        let mut buffer = [0u8];
        self.read_regs(reg, &mut buffer).await?;
        Ok(buffer[0])
    }

    async fn read_regs(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), Error> {
        if buffer.is_empty() {
            return Ok(());
        }
        let addr = spi_addr_read(reg);
        let addr_buf = [addr];
        let mut ops = [Operation::Write(&addr_buf), Operation::Read(buffer)];
        self.spi.transaction(&mut ops).await.map_err(|_| Error::Bus)
    }

    async fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        let addr = spi_addr_write(reg);
        let buffer = [addr, value];
        self.spi.write(&buffer).await.map_err(|_| Error::Bus)
    }

    async fn write_regs(&mut self, reg: u8, data: &[u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }
        let addr = spi_addr_write(reg);
        let addr_buf = [addr];
        let mut ops = [Operation::Write(&addr_buf), Operation::Write(data)];
        self.spi.transaction(&mut ops).await.map_err(|_| Error::Bus)
    }
}

impl<SPI> sealed::Sealed for SpiInterface<SPI> {}
