use crate::devices::PressureChannel;

use super::BridgeError;

/// One parsed upstream command. Each variant maps 1:1 onto a driver
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    HumidRead,
    HumidScan,
    HumidMeasurementRequest,
    HumidUpdate,
    MuxConfig,
    MuxEnable(u8),
    MuxDisable(u8),
    MuxReset,
    MuxPressure(PressureChannel),
    I2cScan,
    I2cVerbose,
}

impl Command {
    /// Parse one whitespace-delimited command line.
    pub fn parse(line: &str) -> Result<Command, BridgeError> {
        let mut tokens = line.split_whitespace();
        let family = tokens.next().ok_or(BridgeError::UnknownCommand)?;

        match family {
            "humid" | "hu" => match tokens.next().ok_or(BridgeError::UnknownCommand)? {
                "read" | "rd" => Ok(Command::HumidRead),
                "scan" => Ok(Command::HumidScan),
                "mr" => Ok(Command::HumidMeasurementRequest),
                "update" | "up" => Ok(Command::HumidUpdate),
                _ => Err(BridgeError::UnknownCommand),
            },
            "mux" => match tokens.next().ok_or(BridgeError::UnknownCommand)? {
                "cfg" => Ok(Command::MuxConfig),
                "ena" => Ok(Command::MuxEnable(arg_u8(&mut tokens)?)),
                "dis" => Ok(Command::MuxDisable(arg_u8(&mut tokens)?)),
                "reset" => Ok(Command::MuxReset),
                "pres" => match arg_u8(&mut tokens)? {
                    0 => Ok(Command::MuxPressure(PressureChannel::Differential)),
                    1 => Ok(Command::MuxPressure(PressureChannel::Absolute)),
                    _ => Err(BridgeError::InvalidArgument),
                },
                _ => Err(BridgeError::UnknownCommand),
            },
            "i2c" => match tokens.next().ok_or(BridgeError::UnknownCommand)? {
                "scan" => Ok(Command::I2cScan),
                "verbose" | "terr" => Ok(Command::I2cVerbose),
                _ => Err(BridgeError::UnknownCommand),
            },
            _ => Err(BridgeError::UnknownCommand),
        }
    }
}

fn arg_u8<'a>(tokens: &mut impl Iterator<Item = &'a str>) -> Result<u8, BridgeError> {
    tokens
        .next()
        .ok_or(BridgeError::InvalidArgument)?
        .parse()
        .map_err(|_| BridgeError::InvalidArgument)
}
