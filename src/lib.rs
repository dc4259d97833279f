//! Single-master two-wire (I2C) bus core: a polled transaction engine,
//! addressed read/write primitives, a bus scanner, and drivers for the
//! devices hanging off the bus: a Telaire ChipCap2 humidity/temperature
//! sensor and a TI PCA9546A channel switch.
//!
//! All hardware access goes through two injected capabilities: [`hw::TwiPort`]
//! (the control/status/data register surface) and [`hw::Millis`] (a
//! resettable millisecond counter). Board crates implement both for real
//! silicon; tests substitute a scripted port and a fake clock.

#![cfg_attr(not(test), no_std)]

pub mod bridge;
pub mod bus;
pub mod config;
pub mod devices;
pub mod hw;
pub mod support;

pub use bus::{BusStatus, Direction, Phase, RegisterPointer, ScanResults, Twi, TwiError};
pub use devices::{ChipCap2, MuxError, Pca9546, PressureChannel, Reading, SensorStatus};
