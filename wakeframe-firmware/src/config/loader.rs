//! Embedded configuration loading

use defmt::*;

use wakeframe_core::config::{parse_config, DeviceConfig, ParseError};

/// Embedded configuration (compiled into firmware)
/// Edit device.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../device.toml");

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ConfigError {
    /// device.toml did not parse on the device
    Parse(ParseError),
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

/// Parse the embedded configuration
///
/// build.rs has already checked the file, so an error here means the build
/// check and the device parser disagree.
pub fn load_config() -> Result<DeviceConfig, ConfigError> {
    debug!("Parsing {} bytes of embedded device.toml", EMBEDDED_CONFIG.len());
    let config = parse_config(EMBEDDED_CONFIG)?;
    log_config_summary(&config);
    Ok(config)
}

/// Log a summary of the effective configuration
pub fn log_config_summary(config: &DeviceConfig) {
    info!("Configuration loaded");
    info!(
        "  server {}:{} bitmap={} config={}",
        config.server.host.as_str(),
        config.server.port,
        config.server.bitmap_path.as_str(),
        config.server.config_path.as_str()
    );
    info!(
        "  panel {}x{} at ({}, {}) color={} fw={}",
        config.display.width,
        config.display.height,
        config.display.x,
        config.display.y,
        config.display.color.as_str(),
        config.display.firmware.as_str()
    );
    debug!(
        "  sync: {} attempts, {} ms retry delay, {} ms read timeout",
        config.sync.policy.max_attempts,
        config.sync.policy.retry_delay_ms,
        config.sync.timeouts.read_timeout_ms
    );
    debug!(
        "  sleep: normal={}s temporary={}s permanent={}s",
        config.sleep.normal_s, config.sleep.temporary_error_s, config.sleep.permanent_error_s
    );
    debug!(
        "  battery: critical below {} mV, divider x{}/1000",
        config.battery.critical_mv, config.battery.divider_x1000
    );
    debug!("  watchdog: {}s", config.watchdog.timeout_s);
}
