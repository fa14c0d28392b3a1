//! Reset and wakeup causes
//!
//! Reported to the server with every config request and used to decide
//! whether a remote request for update mode is honored.

/// Why the chip last reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetReason {
    /// Power applied
    PowerOn,
    /// Reset pin or external reset
    External,
    /// Software requested restart
    Software,
    /// Panic handler restart
    Panic,
    /// Any watchdog fired
    Watchdog,
    /// Woke from deep sleep
    DeepSleep,
    /// Supply dipped below the brownout threshold
    Brownout,
    /// Anything the chip does not classify
    Unknown,
}

impl ResetReason {
    /// Short name used in query strings and logs
    pub const fn as_str(self) -> &'static str {
        match self {
            ResetReason::PowerOn => "POWERON",
            ResetReason::External => "EXT",
            ResetReason::Software => "SW",
            ResetReason::Panic => "PANIC",
            ResetReason::Watchdog => "WDT",
            ResetReason::DeepSleep => "DEEPSLEEP",
            ResetReason::Brownout => "BROWNOUT",
            ResetReason::Unknown => "UNKNOWN",
        }
    }

    /// Check if the reset was caused by the firmware itself
    pub const fn is_self_inflicted(self) -> bool {
        matches!(self, ResetReason::Software | ResetReason::DeepSleep)
    }
}

/// What woke the chip from deep sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeupReason {
    /// Sleep timer expired
    Timer,
    /// GPIO wake source
    Gpio,
    /// Not a wake from sleep
    Undefined,
    /// Another wake source
    Other,
}

impl WakeupReason {
    /// Short name used in query strings and logs
    pub const fn as_str(self) -> &'static str {
        match self {
            WakeupReason::Timer => "TIMER",
            WakeupReason::Gpio => "GPIO",
            WakeupReason::Undefined => "UNDEFINED",
            WakeupReason::Other => "OTHER",
        }
    }
}
