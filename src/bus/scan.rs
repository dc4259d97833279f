//! Bus scanner: probe every valid 7-bit address and report the responders.

use crate::config;
use crate::hw::{Millis, TwiPort};

use super::{BusStatus, Direction, Twi, TwiError};

/// Enough room for every probeable address, so recording can never drop a
/// responder.
pub const SCAN_CAPACITY: usize =
    (config::SCAN_ADDR_MAX - config::SCAN_ADDR_MIN + 1) as usize;

/// Responding addresses, ascending.
pub type ScanResults = heapless::Vec<u8, SCAN_CAPACITY>;

impl<P, C> Twi<P, C>
where
    P: TwiPort,
    C: Millis,
{
    /// Probe one address: does anything acknowledge its SLA+W?
    ///
    /// A START failure is not an answer about the device; it is propagated
    /// so the caller can tell bus trouble from an empty address.
    pub fn probe(&mut self, addr: u8) -> Result<bool, TwiError> {
        self.start(BusStatus::StartSent)?;

        let present = match self.address(addr, Direction::Write) {
            Ok(()) => true,
            Err(TwiError::AddressNack) => false,
            Err(e) => {
                self.stop();
                return Err(e);
            }
        };
        self.stop();
        Ok(present)
    }

    /// Probe the whole 7-bit address space and list the responders.
    ///
    /// A failed START aborts the scan: the bus itself is unavailable, and
    /// carrying on would misreport every remaining address as absent.
    pub fn scan(&mut self) -> Result<ScanResults, TwiError> {
        let mut found = ScanResults::new();

        for addr in config::SCAN_ADDR_MIN..=config::SCAN_ADDR_MAX {
            if self.probe(addr)? {
                #[cfg(feature = "defmt")]
                defmt::debug!("twi scan: device at 0x{:02x}", addr);
                let _ = found.push(addr);
            }
            self.delay_ms(config::SCAN_SETTLE_MS);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("twi scan: {} device(s) found", found.len());
        Ok(found)
    }
}
