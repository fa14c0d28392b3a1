//! Battery sense on ADC1
//!
//! The ESP32 has no factory ADC calibration usable here, so the pin
//! voltage is a linear estimate over the 11 dB range.

use esp_hal::analog::adc::{Adc, AdcConfig, AdcPin, Attenuation};
use esp_hal::peripherals::{ADC1, GPIO32};
use esp_hal::Blocking;
use wakeframe_hal::{AdcError, BatterySensor};

/// Full-scale input at 11 dB attenuation (mV)
const FULL_SCALE_MV: u32 = 3_300;

/// Largest 12-bit code
const MAX_CODE: u32 = 4_095;

/// Battery divider on GPIO32
pub struct AdcBattery {
    adc: Adc<'static, ADC1<'static>, Blocking>,
    pin: AdcPin<GPIO32<'static>, ADC1<'static>>,
}

impl AdcBattery {
    pub fn new(adc1: ADC1<'static>, pin: GPIO32<'static>) -> Self {
        let mut config = AdcConfig::new();
        let pin = config.enable_pin(pin, Attenuation::_11dB);
        let adc = Adc::new(adc1, config);
        Self { adc, pin }
    }
}

impl BatterySensor for AdcBattery {
    fn read_raw(&mut self) -> Result<u16, AdcError> {
        nb::block!(self.adc.read_oneshot(&mut self.pin)).map_err(|_| AdcError::ConversionError)
    }

    fn read_pin_millivolts(&mut self) -> Result<u32, AdcError> {
        let raw = u32::from(self.read_raw()?);
        Ok(raw.min(MAX_CODE) * FULL_SCALE_MV / MAX_CODE)
    }
}
