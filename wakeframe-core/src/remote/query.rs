//! Query string sent with the configuration request

use core::fmt::{self, Write};

use heapless::String;
use wakeframe_hal::{ResetReason, WakeupReason};
use wakeframe_protocol::ColorMode;

use crate::http::MAX_TARGET_LEN;
use crate::power::{BatteryConfig, BatteryReading};
use crate::sync::RequestError;

/// Millivolts rendered as volts with three decimals
struct Volts(u32);

impl fmt::Display for Volts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}", self.0 / 1000, self.0 % 1000)
    }
}

/// Device report sent as the configuration request query
#[derive(Debug, Clone, Copy)]
pub struct ConfigQuery<'a> {
    /// Device identifier (MAC address)
    pub device_id: &'a str,
    /// Battery reading, if the sensor worked
    pub battery: Option<BatteryReading>,
    /// Battery thresholds reported alongside the reading
    pub battery_config: &'a BatteryConfig,
    /// Panel width in pixels
    pub width: u16,
    /// Panel height in pixels
    pub height: u16,
    /// Panel color capability
    pub color: ColorMode,
    /// Firmware label
    pub firmware: &'a str,
    /// Why the chip last reset
    pub reset: ResetReason,
    /// What woke the chip
    pub wakeup: WakeupReason,
}

impl ConfigQuery<'_> {
    /// Request target: `path` plus the query string
    pub fn target(&self, path: &str) -> Result<String<MAX_TARGET_LEN>, RequestError> {
        let mut target = String::new();
        self.write_target(&mut target, path)
            .map_err(|_| RequestError::TargetTooLong)?;
        Ok(target)
    }

    fn write_target(&self, out: &mut impl Write, path: &str) -> fmt::Result {
        write!(out, "{}?mac={}", path, self.device_id)?;

        match self.battery {
            Some(reading) => write!(out, "&adc={}&v={}", reading.raw, Volts(reading.millivolts))?,
            None => out.write_str("&adc=-1&v=-1")?,
        }

        let battery = self.battery_config;
        write!(
            out,
            "&vmin={}&vmax={}&vlmin={}&vlmax={}",
            Volts(battery.min_mv),
            Volts(battery.max_mv),
            Volts(battery.linear_min_mv),
            Volts(battery.linear_max_mv)
        )?;

        write!(
            out,
            "&w={}&h={}&c={}&fw={}&reset={}&wakeup={}",
            self.width,
            self.height,
            self.color.as_str(),
            self.firmware,
            self.reset.as_str(),
            self.wakeup.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(battery: Option<BatteryReading>, config: &BatteryConfig) -> ConfigQuery<'_> {
        ConfigQuery {
            device_id: "24:6F:28:AA:BB:CC",
            battery,
            battery_config: config,
            width: 800,
            height: 480,
            color: ColorMode::BlackWhite,
            firmware: "2.1",
            reset: ResetReason::DeepSleep,
            wakeup: WakeupReason::Timer,
        }
    }

    #[test]
    fn test_target_with_reading() {
        let config = BatteryConfig::default();
        let reading = BatteryReading {
            raw: 2048,
            millivolts: 4012,
        };
        let target = query(Some(reading), &config).target("/config").unwrap();
        assert_eq!(
            target.as_str(),
            "/config?mac=24:6F:28:AA:BB:CC&adc=2048&v=4.012\
             &vmin=3.300&vmax=4.200&vlmin=3.500&vlmax=4.100\
             &w=800&h=480&c=BW&fw=2.1&reset=DEEPSLEEP&wakeup=TIMER"
        );
    }

    #[test]
    fn test_target_without_reading() {
        let config = BatteryConfig::default();
        let target = query(None, &config).target("/config").unwrap();
        assert!(target.contains("&adc=-1&v=-1&vmin="));
    }

    #[test]
    fn test_volts_padding() {
        let mut s: String<16> = String::new();
        write!(s, "{}", Volts(3005)).unwrap();
        assert_eq!(s.as_str(), "3.005");
    }
}
