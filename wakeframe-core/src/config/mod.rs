//! Device configuration
//!
//! The configuration comes from `device.toml`, embedded in the firmware
//! image and parsed at boot. The remote configuration fetched each cycle
//! lives in [`crate::remote`].

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
