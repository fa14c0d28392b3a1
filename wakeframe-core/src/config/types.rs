//! Configuration type definitions

use heapless::String;
use wakeframe_protocol::ColorMode;

use crate::power::{BatteryConfig, SleepPolicy};
use crate::sync::{FrameRequest, RequestError, RetryPolicy, MAX_PATH_LEN};
use crate::transport::ReadTimeouts;

/// Maximum server host name length
pub const MAX_HOST_LEN: usize = 64;

/// Maximum firmware label length
pub const MAX_FIRMWARE_LEN: usize = 16;

/// Image server
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServerConfig {
    /// Host name or dotted IPv4 address
    pub host: String<MAX_HOST_LEN>,
    /// TCP port
    pub port: u16,
    /// Path of the image resource
    pub bitmap_path: String<MAX_PATH_LEN>,
    /// Path of the remote configuration resource
    pub config_path: String<MAX_PATH_LEN>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let mut bitmap_path = String::new();
        let _ = bitmap_path.push_str("/bitmap");
        let mut config_path = String::new();
        let _ = config_path.push_str("/config");

        Self {
            host: String::new(),
            port: 80,
            bitmap_path,
            config_path,
        }
    }
}

/// Panel and image region
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelConfig {
    /// Region width in pixels
    pub width: u16,
    /// Region height in pixels
    pub height: u16,
    /// Region left edge
    pub x: u16,
    /// Region top edge
    pub y: u16,
    /// Color capability
    pub color: ColorMode,
    /// Firmware label reported to the server
    pub firmware: String<MAX_FIRMWARE_LEN>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        let mut firmware = String::new();
        let _ = firmware.push_str(env!("CARGO_PKG_VERSION"));

        Self {
            width: 800,
            height: 480,
            x: 0,
            y: 0,
            color: ColorMode::BlackWhite,
            firmware,
        }
    }
}

impl PanelConfig {
    /// Build the image request for this region
    pub fn frame_request(&self, path: &str, device_id: &str) -> Result<FrameRequest, RequestError> {
        FrameRequest::new(
            path,
            device_id,
            self.x,
            self.y,
            self.width,
            self.height,
            self.color.planes(),
        )
    }
}

/// Sync retry and read timing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncConfig {
    pub policy: RetryPolicy,
    pub timeouts: ReadTimeouts,
}

/// Watchdog settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogConfig {
    /// Reset if not fed within this many seconds
    pub timeout_s: u32,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self { timeout_s: 120 }
    }
}

/// Complete device configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub server: ServerConfig,
    pub display: PanelConfig,
    pub sync: SyncConfig,
    pub sleep: SleepPolicy,
    pub battery: BatteryConfig,
    pub watchdog: WatchdogConfig,
}

impl DeviceConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }
}
