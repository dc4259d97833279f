//! TI PCA9546A four-channel bus switch with an active-low reset line.
//!
//! The switch is shared: its mask is re-read from the device on every
//! mutation instead of trusting a local copy, and the actual post-write
//! state is read back and reported.

use embedded_hal::digital::v2::OutputPin;

use crate::bus::{Twi, TwiError};
use crate::config;
use crate::hw::{Millis, TwiPort};

/// Pressure transducer selection. Both transducers answer the same wire
/// address, each behind its own switch channel, so only one may be routed
/// at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressureChannel {
    Differential,
    Absolute,
}

impl PressureChannel {
    pub const fn channel(self) -> u8 {
        match self {
            PressureChannel::Differential => config::MUX_DIFF_PRESSURE_CHANNEL,
            PressureChannel::Absolute => config::MUX_ABS_PRESSURE_CHANNEL,
        }
    }

    const fn counterpart(self) -> Self {
        match self {
            PressureChannel::Differential => PressureChannel::Absolute,
            PressureChannel::Absolute => PressureChannel::Differential,
        }
    }
}

/// Switch driver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MuxError {
    /// Channel index outside the switch's four downstream channels;
    /// rejected before any bus traffic.
    InvalidChannel(u8),
    /// The reset line driver reported a fault.
    ResetPin,
    /// Transport failure underneath the driver.
    Bus(TwiError),
}

impl From<TwiError> for MuxError {
    fn from(e: TwiError) -> Self {
        MuxError::Bus(e)
    }
}

/// Driver for one PCA9546A and its reset pin.
pub struct Pca9546<RST> {
    address: u8,
    reset_line: RST,
}

impl<RST> Pca9546<RST>
where
    RST: OutputPin,
{
    pub fn new(reset_line: RST) -> Self {
        Self {
            address: config::MUX_ADDR,
            reset_line,
        }
    }

    /// A switch strapped to a non-default address.
    pub fn at(address: u8, reset_line: RST) -> Self {
        Self {
            address,
            reset_line,
        }
    }

    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Release the reset pin.
    pub fn free(self) -> RST {
        self.reset_line
    }

    /// Pulse /RESET and report the mask read back afterwards; a healthy
    /// part comes up with every channel disabled.
    pub fn reset<P, C>(&mut self, bus: &mut Twi<P, C>) -> Result<u8, MuxError>
    where
        P: TwiPort,
        C: Millis,
    {
        self.reset_line.set_low().map_err(|_| MuxError::ResetPin)?;
        bus.delay_ms(config::MUX_RESET_PULSE_MS);
        self.reset_line.set_high().map_err(|_| MuxError::ResetPin)?;
        bus.delay_ms(config::MUX_RESET_PULSE_MS);

        let mask = self.mask(bus)?;
        #[cfg(feature = "defmt")]
        if mask != 0 {
            defmt::warn!("pca9546: mask 0x{:02x} right after reset", mask);
        }
        Ok(mask)
    }

    /// Power-on bring-up: reset, then route the humidity sensor channels.
    pub fn init<P, C>(&mut self, bus: &mut Twi<P, C>) -> Result<u8, MuxError>
    where
        P: TwiPort,
        C: Millis,
    {
        self.reset(bus)?;

        let mut mask = 0;
        for channel in config::MUX_HUMIDITY_CHANNELS {
            mask = self.enable_channel(bus, channel)?;
        }
        Ok(mask)
    }

    /// Current channel-enable mask, read from the control register.
    pub fn mask<P, C>(&self, bus: &mut Twi<P, C>) -> Result<u8, MuxError>
    where
        P: TwiPort,
        C: Millis,
    {
        let mut buf = [0u8; 1];
        bus.read_bytes(self.address, &mut buf)?;
        Ok(buf[0])
    }

    /// Enable `channel`, read-modify-write, and return the mask the device
    /// actually holds afterwards.
    pub fn enable_channel<P, C>(&mut self, bus: &mut Twi<P, C>, channel: u8) -> Result<u8, MuxError>
    where
        P: TwiPort,
        C: Millis,
    {
        let bit = Self::channel_bit(channel)?;
        let mask = self.mask(bus)?;
        self.write_mask(bus, mask | bit)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("pca9546: enable channel {}", channel);
        self.mask(bus)
    }

    /// Disable `channel`; same discipline as [`enable_channel`](Self::enable_channel).
    pub fn disable_channel<P, C>(&mut self, bus: &mut Twi<P, C>, channel: u8) -> Result<u8, MuxError>
    where
        P: TwiPort,
        C: Millis,
    {
        let bit = Self::channel_bit(channel)?;
        let mask = self.mask(bus)?;
        self.write_mask(bus, mask & !bit)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("pca9546: disable channel {}", channel);
        self.mask(bus)
    }

    /// Route one pressure transducer, making sure the other is cut off
    /// first so both are never on the bus at once.
    pub fn set_pressure_channel<P, C>(
        &mut self,
        bus: &mut Twi<P, C>,
        which: PressureChannel,
    ) -> Result<u8, MuxError>
    where
        P: TwiPort,
        C: Millis,
    {
        self.disable_channel(bus, which.counterpart().channel())?;
        self.enable_channel(bus, which.channel())
    }

    fn write_mask<P, C>(&self, bus: &mut Twi<P, C>, mask: u8) -> Result<(), MuxError>
    where
        P: TwiPort,
        C: Millis,
    {
        bus.write_bytes(self.address, &[mask])?;
        Ok(())
    }

    fn channel_bit(channel: u8) -> Result<u8, MuxError> {
        if channel >= config::MUX_CHANNEL_COUNT {
            return Err(MuxError::InvalidChannel(channel));
        }
        Ok(1 << channel)
    }
}
