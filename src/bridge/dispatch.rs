use embedded_hal::digital::v2::OutputPin;

use crate::bus::{ScanResults, Twi};
use crate::devices::{ChipCap2, Pca9546, Reading};
use crate::hw::{Millis, TwiPort};

use super::{BridgeError, Command};

/// Outcome of one dispatched command, ready for whatever link carries the
/// replies upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    Reading(Reading),
    RequestSent,
    Mask(u8),
    Scan(ScanResults),
    Verbose(bool),
}

/// Run one command against the bus and its devices.
pub fn dispatch<P, C, RST>(
    command: Command,
    bus: &mut Twi<P, C>,
    sensor: &ChipCap2,
    mux: &mut Pca9546<RST>,
) -> Result<Reply, BridgeError>
where
    P: TwiPort,
    C: Millis,
    RST: OutputPin,
{
    match command {
        Command::HumidRead => Ok(Reply::Reading(sensor.read(bus)?)),
        Command::HumidMeasurementRequest => {
            sensor.measurement_request(bus)?;
            Ok(Reply::RequestSent)
        }
        Command::HumidUpdate => Ok(Reply::Reading(sensor.measurement_update(bus)?)),
        Command::HumidScan | Command::I2cScan => {
            let found = bus.scan()?;
            #[cfg(feature = "defmt")]
            for addr in &found {
                match crate::devices::known_device(*addr) {
                    Some(name) => defmt::info!("  0x{:02x} ({})", *addr, name),
                    None => defmt::info!("  0x{:02x}", *addr),
                }
            }
            Ok(Reply::Scan(found))
        }
        Command::MuxConfig => Ok(Reply::Mask(mux.mask(bus)?)),
        Command::MuxEnable(channel) => Ok(Reply::Mask(mux.enable_channel(bus, channel)?)),
        Command::MuxDisable(channel) => Ok(Reply::Mask(mux.disable_channel(bus, channel)?)),
        Command::MuxReset => Ok(Reply::Mask(mux.reset(bus)?)),
        Command::MuxPressure(which) => Ok(Reply::Mask(mux.set_pressure_channel(bus, which)?)),
        Command::I2cVerbose => {
            let on = !bus.verbose();
            bus.set_verbose(on);
            Ok(Reply::Verbose(on))
        }
    }
}
