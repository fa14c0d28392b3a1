//! Parsing of the remote configuration body

use serde::Deserialize;
use wakeframe_hal::ResetReason;

/// Errors parsing the configuration body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum JsonError {
    /// Body is not a JSON object
    NotAnObject,
    /// A known field has a value of the wrong type
    BadValue,
    /// Body is not well-formed JSON
    Malformed,
}

impl From<serde_json_core::de::Error> for JsonError {
    fn from(e: serde_json_core::de::Error) -> Self {
        match e {
            serde_json_core::de::Error::InvalidType | serde_json_core::de::Error::InvalidNumber => {
                JsonError::BadValue
            }
            _ => JsonError::Malformed,
        }
    }
}

/// Body as the server sends it; unknown fields are skipped
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WireConfig {
    sleep: Option<f32>,
    battery_percent: Option<f32>,
    ota_mode: Option<bool>,
}

/// Settings the server sends back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RemoteConfig {
    /// Sleep interval override in seconds; `None` keeps the configured one
    pub sleep_s: Option<u32>,
    /// Battery percentage as the server computes it
    pub battery_percent: Option<u8>,
    /// Server asks the device to stay up for a firmware update
    pub ota_mode: bool,
}

impl RemoteConfig {
    /// Parse the JSON body
    ///
    /// Missing fields keep their defaults and `null` counts as missing.
    /// A sleep below one second keeps the configured interval.
    pub fn parse(body: &[u8]) -> Result<Self, JsonError> {
        let first = body.iter().find(|b| !b.is_ascii_whitespace());
        if first != Some(&b'{') {
            return Err(JsonError::NotAnObject);
        }

        let (wire, _): (WireConfig, usize) = serde_json_core::from_slice(body)?;

        Ok(Self {
            // float to int `as` saturates and maps NaN to 0
            sleep_s: wire.sleep.map(|s| s as u32).filter(|&s| s > 0),
            battery_percent: wire.battery_percent.map(|p| p.clamp(0.0, 100.0) as u8),
            ota_mode: wire.ota_mode.unwrap_or(false),
        })
    }

    /// Whether an OTA session should be started this cycle
    ///
    /// OTA mode sticks on the server, so it is only honoured after a reset
    /// the user caused; software and deep-sleep resets skip it.
    pub fn ota_allowed(&self, reset: ResetReason) -> bool {
        self.ota_mode && !reset.is_self_inflicted()
    }
}
