use crate::bus::TwiError;
use crate::devices::MuxError;

/// Command-layer failures reported back over the upstream link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Not a known command family or subcommand.
    UnknownCommand,
    /// A required argument is missing or does not parse.
    InvalidArgument,
    /// The transport failed underneath a device operation.
    Bus(TwiError),
    /// The switch driver rejected the request.
    Mux(MuxError),
}

impl From<TwiError> for BridgeError {
    fn from(e: TwiError) -> Self {
        BridgeError::Bus(e)
    }
}

impl From<MuxError> for BridgeError {
    fn from(e: MuxError) -> Self {
        BridgeError::Mux(e)
    }
}
