extern crate std;

use std::vec::Vec;

use embedded_hal_async::delay::DelayNs;

use crate::error::Error;
use crate::interface::{Interface, sealed};

#[derive(Clone, Debug)]
pub(crate) struct MockInterface {
    regs: [u8; 256],
    writes: Vec<(u8, u8)>,
    write_bursts: Vec<(u8, Vec<u8>)>,
    read_bursts: Vec<(u8, usize)>,
    failing_write_reg: Option<u8>,
    sticky: Option<(u8, u8)>,
}

impl Default for MockInterface {
    fn default() -> Self {
        Self {
            regs: [0u8; 256],
            writes: Vec::new(),
            write_bursts: Vec::new(),
            read_bursts: Vec::new(),
            failing_write_reg: None,
            sticky: None,
        }
    }
}

impl MockInterface {
    pub(crate) fn with_reg(mut self, reg: u8, value: u8) -> Self {
        self.set_reg(reg, value);
        self
    }

    /// Makes every write to the given register fail with a bus error.
    pub(crate) fn fail_writes_to(mut self, reg: u8) -> Self {
        self.failing_write_reg = Some(reg);
        self
    }

    /// Keeps the masked bits of one register set across writes, mimicking
    /// hardware-managed status bits such as a ready flag.
    pub(crate) fn with_sticky_bits(mut self, reg: u8, mask: u8) -> Self {
        self.sticky = Some((reg, mask));
        self
    }

    pub(crate) fn set_reg(&mut self, reg: u8, value: u8) {
        self.regs[reg as usize] = value;
    }

    #[allow(dead_code)]
    pub(crate) fn reg(&self, reg: u8) -> u8 {
        self.regs[reg as usize]
    }

    pub(crate) fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    pub(crate) fn clear_writes(&mut self) {
        self.writes.clear();
        self.write_bursts.clear();
        self.read_bursts.clear();
    }

    #[allow(dead_code)]
    pub(crate) fn write_bursts(&self) -> &[(u8, Vec<u8>)] {
        &self.write_bursts
    }

    /// Burst reads as (start register, length) pairs.
    pub(crate) fn read_bursts(&self) -> &[(u8, usize)] {
        &self.read_bursts
    }
}

impl Interface for MockInterface {
    async fn read_reg(&mut self, reg: u8) -> Result<u8, Error> {
        Ok(self.regs[reg as usize])
    }

    async fn read_regs(&mut self, reg: u8, buffer: &mut [u8]) -> Result<(), Error> {
        if buffer.is_empty() {
            return Ok(());
        }
        for (offset, slot) in buffer.iter_mut().enumerate() {
            let addr = reg.wrapping_add(offset as u8);
            *slot = self.regs[addr as usize];
        }
        self.read_bursts.push((reg, buffer.len()));
        Ok(())
    }

    async fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Error> {
        if self.failing_write_reg == Some(reg) {
            return Err(Error::Bus);
        }
        let mut stored = value;
        if let Some((sticky_reg, mask)) = self.sticky {
            if sticky_reg == reg {
                stored |= self.regs[reg as usize] & mask;
            }
        }
        self.regs[reg as usize] = stored;
        self.writes.push((reg, value));
        Ok(())
    }

    async fn write_regs(&mut self, reg: u8, data: &[u8]) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }
        if self.failing_write_reg == Some(reg) {
            return Err(Error::Bus);
        }
        for (offset, value) in data.iter().enumerate() {
            let addr = reg.wrapping_add(offset as u8);
            self.regs[addr as usize] = *value;
        }
        self.write_bursts.push((reg, data.to_vec()));
        Ok(())
    }
}

impl sealed::Sealed for MockInterface {}

#[derive(Default, Debug)]
pub(crate) struct MockDelay {
    pub(crate) calls: u32,
    pub(crate) last_ns: Option<u32>,
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.last_ns = Some(ns);
    }
}
