//! Two-wire bus master: polled transaction engine, addressed read/write
//! primitives, and the address scanner.

mod engine;
mod error;
mod scan;
mod status;
mod transfer;

pub use engine::{Direction, Phase};
pub use error::TwiError;
pub use scan::{ScanResults, SCAN_CAPACITY};
pub use status::BusStatus;
pub use transfer::RegisterPointer;

use crate::hw::{Millis, TwiPort};
use crate::support::delay::delay_ms;

/// Bus master over an injected port and clock.
///
/// Holds no transfer state between calls: a transaction lives exactly as
/// long as one primitive call, and the bus is released before that call
/// returns, even on failure.
pub struct Twi<P, C> {
    port: P,
    clock: C,
    verbose: bool,
    phase: Phase,
}

impl<P, C> Twi<P, C>
where
    P: TwiPort,
    C: Millis,
{
    pub fn new(port: P, clock: C) -> Self {
        Self {
            port,
            clock,
            verbose: false,
            phase: Phase::Idle,
        }
    }

    /// Gate for per-failure status/control diagnostics.
    pub fn set_verbose(&mut self, on: bool) {
        self.verbose = on;
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Release the underlying port and clock.
    pub fn free(self) -> (P, C) {
        (self.port, self.clock)
    }

    /// Bounded busy-wait against the injected clock.
    pub fn delay_ms(&mut self, ms: u32) {
        delay_ms(&mut self.clock, ms);
    }
}

impl<P, C> embedded_hal::blocking::i2c::Read for Twi<P, C>
where
    P: TwiPort,
    C: Millis,
{
    type Error = TwiError;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Self::Error> {
        self.read_bytes(address, buffer).map(|_| ())
    }
}

impl<P, C> embedded_hal::blocking::i2c::Write for Twi<P, C>
where
    P: TwiPort,
    C: Millis,
{
    type Error = TwiError;

    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), Self::Error> {
        self.write_bytes(addr, bytes).map(|_| ())
    }
}

impl<P, C> embedded_hal::blocking::i2c::WriteRead for Twi<P, C>
where
    P: TwiPort,
    C: Millis,
{
    type Error = TwiError;

    fn write_read(
        &mut self,
        address: u8,
        bytes: &[u8],
        buffer: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.read_transfer(address, bytes, buffer).map(|_| ())
    }
}
