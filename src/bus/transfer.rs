//! Addressed read/write primitives over the phase engine.
//!
//! Every primitive shares one bounded restart budget across its whole call
//! and guarantees that a bus taken by a successful START is released by
//! exactly one STOP before the call returns, success or failure.

use crate::config;
use crate::hw::{Millis, TwiPort};

use super::{BusStatus, Direction, Twi, TwiError};

/// Register/memory address written ahead of a transfer to select what the
/// slave exposes. Width is fixed per device, so this is variant selection,
/// not runtime polymorphism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterPointer {
    None,
    Byte(u8),
    /// Two-byte pointer, transmitted high byte first.
    Word(u16),
}

impl RegisterPointer {
    pub(crate) fn encode(self) -> heapless::Vec<u8, 2> {
        let mut bytes = heapless::Vec::new();
        match self {
            RegisterPointer::None => {}
            RegisterPointer::Byte(b) => {
                let _ = bytes.push(b);
            }
            RegisterPointer::Word(w) => {
                let _ = bytes.extend_from_slice(&w.to_be_bytes());
            }
        }
        bytes
    }
}

impl<P, C> Twi<P, C>
where
    P: TwiPort,
    C: Millis,
{
    /// Write `buf` to `addr`. A zero-length buffer is a valid wake pulse:
    /// START, SLA+W and STOP still run.
    pub fn write_bytes(&mut self, addr: u8, buf: &[u8]) -> Result<usize, TwiError> {
        self.write_transfer(addr, &[], buf)
    }

    /// Write `buf` to `addr`, prefixed by the register pointer bytes.
    pub fn write_with_pointer(
        &mut self,
        addr: u8,
        pointer: RegisterPointer,
        buf: &[u8],
    ) -> Result<usize, TwiError> {
        let prefix = pointer.encode();
        self.write_transfer(addr, &prefix, buf)
    }

    /// Read into `buf` from `addr` with no register select.
    pub fn read_bytes(&mut self, addr: u8, buf: &mut [u8]) -> Result<usize, TwiError> {
        self.read_transfer(addr, &[], buf)
    }

    /// Select a register at `addr`, then read into `buf`.
    ///
    /// The select and the read are joined by a repeated START, never a
    /// STOP/START pair, so no other bus user can interleave between them.
    pub fn read_with_pointer(
        &mut self,
        addr: u8,
        pointer: RegisterPointer,
        buf: &mut [u8],
    ) -> Result<usize, TwiError> {
        let prefix = pointer.encode();
        self.read_transfer(addr, &prefix, buf)
    }

    pub(crate) fn write_transfer(
        &mut self,
        addr: u8,
        prefix: &[u8],
        buf: &[u8],
    ) -> Result<usize, TwiError> {
        let mut owned = false;
        let result = self.write_attempts(addr, prefix, buf, &mut owned);
        if owned {
            self.stop();
        }
        result
    }

    pub(crate) fn read_transfer(
        &mut self,
        addr: u8,
        prefix: &[u8],
        buf: &mut [u8],
    ) -> Result<usize, TwiError> {
        let mut owned = false;
        let result = self.read_attempts(addr, prefix, buf, &mut owned);
        if owned {
            self.stop();
        }
        result
    }

    fn write_attempts(
        &mut self,
        addr: u8,
        prefix: &[u8],
        buf: &[u8],
        owned: &mut bool,
    ) -> Result<usize, TwiError> {
        for _ in 0..config::TWI_MAX_ITER {
            match self.write_once(addr, prefix, buf, owned) {
                Err(e) if e.restartable() => continue,
                other => return other,
            }
        }
        Err(TwiError::RetriesExhausted)
    }

    fn write_once(
        &mut self,
        addr: u8,
        prefix: &[u8],
        buf: &[u8],
        owned: &mut bool,
    ) -> Result<usize, TwiError> {
        self.start(BusStatus::StartSent)?;
        *owned = true;
        self.address(addr, Direction::Write)?;
        self.settle();

        for &byte in prefix.iter().chain(buf.iter()) {
            self.data_tx(byte)?;
            self.settle();
        }
        Ok(buf.len())
    }

    fn read_attempts(
        &mut self,
        addr: u8,
        prefix: &[u8],
        buf: &mut [u8],
        owned: &mut bool,
    ) -> Result<usize, TwiError> {
        for _ in 0..config::TWI_MAX_ITER {
            match self.read_once(addr, prefix, buf, owned) {
                // a declined pointer byte restarts the transaction just like
                // a declined select; payload bytes only flow on reads here
                Err(e) if e.restartable() => continue,
                Err(TwiError::DataNack) if !prefix.is_empty() => continue,
                other => return other,
            }
        }
        Err(TwiError::RetriesExhausted)
    }

    fn read_once(
        &mut self,
        addr: u8,
        prefix: &[u8],
        buf: &mut [u8],
        owned: &mut bool,
    ) -> Result<usize, TwiError> {
        self.start(BusStatus::StartSent)?;
        *owned = true;

        if !prefix.is_empty() {
            self.address(addr, Direction::Write)?;
            self.settle();
            for &byte in prefix {
                self.data_tx(byte)?;
                self.settle();
            }
            // change direction while keeping ownership of the bus
            self.start(BusStatus::RepeatedStartSent)?;
        }

        self.address(addr, Direction::Read)?;

        let len = buf.len();
        let mut count = 0;
        for (i, slot) in buf.iter_mut().enumerate() {
            // acknowledge every byte but the last: the NACK tells the slave
            // to stop sending
            let ack = i + 1 < len;
            let (byte, more) = self.data_rx(ack)?;
            *slot = byte;
            count += 1;
            if !more {
                break;
            }
        }
        Ok(count)
    }

    fn settle(&mut self) {
        self.delay_ms(config::TWI_SETTLE_MS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_encoding_widths() {
        assert_eq!(RegisterPointer::None.encode().as_slice(), &[]);
        assert_eq!(RegisterPointer::Byte(0x42).encode().as_slice(), &[0x42]);
        assert_eq!(
            RegisterPointer::Word(0x1234).encode().as_slice(),
            &[0x12, 0x34]
        );
    }
}
