use static_assertions::const_assert;

//-----------------------------------------------------------------------------

/// Upper bound on any single polled bus wait, in milliseconds.
pub const TWI_TIMEOUT_MS: u32 = 180;

/// Whole-transaction restarts allowed within one primitive call.
pub const TWI_MAX_ITER: u8 = 250;

/// Settle after an acknowledged select or data byte on the write path.
/// Parts on this bus drop back-to-back bytes without it.
pub const TWI_SETTLE_MS: u32 = 1;

//-----------------------------------------------------------------------------

pub const HUMIDITY_SENSOR_ADDR: u8 = 0x28;

pub const SENSOR_READ_RETRIES: u8 = 10;
pub const SENSOR_RETRY_DELAY_MS: u32 = 50;

//-----------------------------------------------------------------------------

pub const MUX_ADDR: u8 = 0x70;

pub const MUX_CHANNEL_COUNT: u8 = 4;

/// /RESET hold time; the part needs nanoseconds, this is generous.
pub const MUX_RESET_PULSE_MS: u32 = 5;

/// Switch channels routing the humidity sensor.
pub const MUX_HUMIDITY_CHANNELS: [u8; 2] = [2, 3];

/// Differential pressure transducer sits behind this channel.
pub const MUX_DIFF_PRESSURE_CHANNEL: u8 = 0;
/// Absolute pressure transducer sits behind this channel.
pub const MUX_ABS_PRESSURE_CHANNEL: u8 = 1;

//-----------------------------------------------------------------------------

/// 0x00 (general call) and 0x7F are reserved, never probed.
pub const SCAN_ADDR_MIN: u8 = 0x01;
pub const SCAN_ADDR_MAX: u8 = 0x7E;

pub const SCAN_SETTLE_MS: u32 = 1;

//-----------------------------------------------------------------------------

const_assert!(TWI_MAX_ITER > 0);
const_assert!(SENSOR_READ_RETRIES > 0);
const_assert!(HUMIDITY_SENSOR_ADDR <= 0x7F);
const_assert!(MUX_ADDR <= 0x7F);
const_assert!(SCAN_ADDR_MIN >= 1);
const_assert!(SCAN_ADDR_MAX <= 0x7E);
