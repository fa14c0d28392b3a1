//! Battery voltage averaging and thresholds

use wakeframe_hal::{AdcError, BatterySensor};

/// Battery measurement settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryConfig {
    /// Divider ratio x1000 (battery mV = pin mV * divider / 1000)
    pub divider_x1000: u32,
    /// Samples averaged per reading
    pub samples: u8,
    /// Below this the device stops syncing (mV)
    pub critical_mv: u32,
    /// Empty battery, reported to the server (mV)
    pub min_mv: u32,
    /// Full battery, reported to the server (mV)
    pub max_mv: u32,
    /// 0% point of the linear percentage scale (mV)
    pub linear_min_mv: u32,
    /// 100% point of the linear percentage scale (mV)
    pub linear_max_mv: u32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            divider_x1000: 2371,
            samples: 5,
            critical_mv: 3300,
            min_mv: 3300,
            max_mv: 4200,
            linear_min_mv: 3500,
            linear_max_mv: 4100,
        }
    }
}

/// One averaged battery measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryReading {
    /// Averaged raw ADC code
    pub raw: u16,
    /// Battery voltage after the divider (mV)
    pub millivolts: u32,
}

/// Averages battery samples and applies the configured thresholds
pub struct BatteryMonitor<B> {
    sensor: B,
    config: BatteryConfig,
}

impl<B: BatterySensor> BatteryMonitor<B> {
    pub fn new(sensor: B, config: BatteryConfig) -> Self {
        Self { sensor, config }
    }

    pub fn config(&self) -> &BatteryConfig {
        &self.config
    }

    /// Take an averaged reading
    pub fn sample(&mut self) -> Result<BatteryReading, AdcError> {
        let samples = u32::from(self.config.samples.max(1));
        let mut raw_sum = 0u32;
        let mut pin_sum = 0u32;

        for _ in 0..samples {
            raw_sum += u32::from(self.sensor.read_raw()?);
            pin_sum += self.sensor.read_pin_millivolts()?;
        }

        let pin_mv = pin_sum / samples;
        let millivolts = (u64::from(pin_mv) * u64::from(self.config.divider_x1000) / 1000) as u32;

        Ok(BatteryReading {
            raw: (raw_sum / samples) as u16,
            millivolts,
        })
    }

    /// Whether the battery is too low to run a sync
    pub fn is_critical(&self, reading: &BatteryReading) -> bool {
        reading.millivolts < self.config.critical_mv
    }

    /// Charge estimate in percent, linear between the configured points
    pub fn percent(&self, reading: &BatteryReading) -> u8 {
        let lo = self.config.linear_min_mv;
        let hi = self.config.linear_max_mv;
        if reading.millivolts <= lo || hi <= lo {
            return 0;
        }
        if reading.millivolts >= hi {
            return 100;
        }
        ((reading.millivolts - lo) * 100 / (hi - lo)) as u8
    }
}
