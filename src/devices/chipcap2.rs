//! Telaire ChipCap2 humidity/temperature sensor.
//!
//! The part sleeps until addressed and starts a measurement as a side effect
//! of being selected, so a zero-length write doubles as the wake pulse.
//! While a measurement is pending, reads return the previous data flagged
//! stale.

use crate::bus::{Twi, TwiError};
use crate::config;
use crate::hw::{Millis, TwiPort};

/// Data freshness, bits 7:6 of the first readout byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorStatus {
    /// Measurement finished and not yet read out.
    Valid,
    /// Already read; no new measurement has completed since.
    Stale,
    /// The part is in command mode.
    CommandMode,
    Reserved,
}

impl SensorStatus {
    fn from_byte(byte0: u8) -> Self {
        match (byte0 & 0xC0) >> 6 {
            0 => SensorStatus::Valid,
            1 => SensorStatus::Stale,
            2 => SensorStatus::CommandMode,
            _ => SensorStatus::Reserved,
        }
    }
}

/// One decoded readout. Never cached: every reading is authoritative only
/// for the instant it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pub status: SensorStatus,
    /// Percent relative humidity, truncated to integer.
    pub humidity: i32,
    /// Degrees Celsius, truncated; absent when the readout was short.
    pub temperature: Option<i32>,
    /// Raw bytes as read, zero-padded past `len`.
    pub raw: [u8; 4],
    /// How many raw bytes the readout actually carried.
    pub len: usize,
}

impl Reading {
    /// Decode a readout of up to 4 bytes.
    ///
    /// Fixed-point, integer division throughout. The fourth byte's
    /// fractional temperature term keeps the device's historical evaluation
    /// order, under which it truncates to zero for nearly every code; the
    /// integer part from byte 2 is what carries the temperature.
    pub fn decode(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 4];
        let len = bytes.len().min(4);
        raw[..len].copy_from_slice(&bytes[..len]);

        let status = SensorStatus::from_byte(raw[0]);

        let rh_high = (raw[0] & 0x3F) as i32 * 256;
        let rh_low = raw[1] as i32;
        let humidity = (rh_high + rh_low) * 100 / 16384;

        let temperature = if len >= 3 {
            let temp_high = ((raw[2] as i32 * 64) * 165) / 16384 - 40;
            let temp_low = if len == 4 {
                let code = ((raw[3] & 0xFC) >> 2) as i32;
                ((code / 4) * 165) / 16384
            } else {
                0
            };
            Some(temp_high + temp_low)
        } else {
            None
        };

        Reading {
            status,
            humidity,
            temperature,
            raw,
            len,
        }
    }
}

/// Driver for one ChipCap2 on the bus.
pub struct ChipCap2 {
    address: u8,
}

impl ChipCap2 {
    pub const fn new() -> Self {
        Self {
            address: config::HUMIDITY_SENSOR_ADDR,
        }
    }

    /// A sensor strapped to a non-default address.
    pub const fn at(address: u8) -> Self {
        Self { address }
    }

    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Wake the sensor and kick off a measurement.
    ///
    /// Purely an addressing pulse, no payload. A NACK means the sensor did
    /// not wake and is reported, never swallowed.
    pub fn measurement_request<P, C>(&self, bus: &mut Twi<P, C>) -> Result<(), TwiError>
    where
        P: TwiPort,
        C: Millis,
    {
        #[cfg(feature = "defmt")]
        defmt::debug!("chipcap2: measurement request to 0x{:02x}", self.address);
        bus.write_bytes(self.address, &[]).map(|_| ())
    }

    /// Read and decode the 4-byte measurement frame.
    pub fn read<P, C>(&self, bus: &mut Twi<P, C>) -> Result<Reading, TwiError>
    where
        P: TwiPort,
        C: Millis,
    {
        let mut raw = [0u8; 4];
        let n = bus.read_bytes(self.address, &mut raw)?;
        let reading = Reading::decode(&raw[..n]);

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "chipcap2: status {} humidity {}% temperature {}",
            reading.status,
            reading.humidity,
            reading.temperature
        );
        Ok(reading)
    }

    /// Request a measurement, then re-read until the data is no longer
    /// stale or the retry budget runs out.
    ///
    /// Exhaustion is not an error: the last reading is returned and its
    /// status is the caller's signal.
    pub fn measurement_update<P, C>(&self, bus: &mut Twi<P, C>) -> Result<Reading, TwiError>
    where
        P: TwiPort,
        C: Millis,
    {
        self.measurement_request(bus)?;

        let mut reading = self.read(bus)?;
        for _ in 1..config::SENSOR_READ_RETRIES {
            if reading.status != SensorStatus::Stale {
                break;
            }
            bus.delay_ms(config::SENSOR_RETRY_DELAY_MS);
            reading = self.read(bus)?;
        }
        Ok(reading)
    }
}

impl Default for ChipCap2 {
    fn default() -> Self {
        Self::new()
    }
}
