//! Device configuration
//!
//! `device.toml` is embedded at build time and parsed by the core crate's
//! line parser.

pub mod loader;

pub use loader::{load_config, log_config_summary, ConfigError};
