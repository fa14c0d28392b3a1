//! Battery voltage sensing

/// Errors that can occur while sampling the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcError {
    /// No sense pin on this board
    NotFitted,
    /// ADC conversion error
    ConversionError,
}

/// Battery voltage sensor behind a resistor divider
///
/// Readings are taken at the ADC pin; scaling by the divider ratio is done
/// by the caller so the same driver works for every board variant.
pub trait BatterySensor {
    /// Read the raw ADC code
    fn read_raw(&mut self) -> Result<u16, AdcError>;

    /// Read the voltage at the ADC pin in millivolts
    ///
    /// Takes `&mut self` because ADC reads typically require mutable access.
    fn read_pin_millivolts(&mut self) -> Result<u32, AdcError>;
}
