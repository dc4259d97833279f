//! Upstream command interface: text commands parsed into typed operations
//! and dispatched onto the drivers. The link that carries the text lives
//! outside this crate.

mod command;
mod dispatch;
mod error;

pub use command::Command;
pub use dispatch::{dispatch, Reply};
pub use error::BridgeError;
