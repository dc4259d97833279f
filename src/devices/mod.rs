mod chipcap2;
mod pca9546;

pub use chipcap2::{ChipCap2, Reading, SensorStatus};
pub use pca9546::{MuxError, Pca9546, PressureChannel};

use crate::config;

/// Name for a wire address this firmware knows about, for scan reports.
pub fn known_device(addr: u8) -> Option<&'static str> {
    match addr {
        config::HUMIDITY_SENSOR_ADDR => Some("ChipCap2"),
        config::MUX_ADDR => Some("PCA9546A"),
        _ => None,
    }
}
