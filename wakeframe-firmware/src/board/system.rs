//! Reset cause, wakeup cause and device identity

use core::fmt::Write;

use esp_hal::rtc_cntl::{reset_reason as soc_reset_reason, wakeup_cause, SocResetReason};
use esp_hal::system::{Cpu, SleepSource};
use heapless::String;
use wakeframe_core::sync::MAX_DEVICE_ID_LEN;
use wakeframe_hal::{ResetReason, WakeupReason};

/// MAC address rendered as `AA:BB:CC:DD:EE:FF`
pub type DeviceId = String<MAX_DEVICE_ID_LEN>;

/// Why the CPU last reset
pub fn reset_reason() -> ResetReason {
    match soc_reset_reason(Cpu::ProCpu) {
        Some(SocResetReason::ChipPowerOn) => ResetReason::PowerOn,
        Some(SocResetReason::CoreSw | SocResetReason::Cpu0Sw) => ResetReason::Software,
        Some(SocResetReason::CoreDeepSleep) => ResetReason::DeepSleep,
        Some(
            SocResetReason::CoreMwdt0
            | SocResetReason::CoreMwdt1
            | SocResetReason::CoreRtcWdt
            | SocResetReason::Cpu0Mwdt0
            | SocResetReason::Cpu0RtcWdt
            | SocResetReason::SysRtcWdt,
        ) => ResetReason::Watchdog,
        Some(SocResetReason::SysBrownOut) => ResetReason::Brownout,
        Some(_) => ResetReason::External,
        None => ResetReason::Unknown,
    }
}

/// What woke the chip
pub fn wakeup_reason() -> WakeupReason {
    match wakeup_cause() {
        SleepSource::Timer => WakeupReason::Timer,
        SleepSource::Ext0 | SleepSource::Ext1 | SleepSource::Gpio => WakeupReason::Gpio,
        SleepSource::Undefined => WakeupReason::Undefined,
        _ => WakeupReason::Other,
    }
}

/// Device identifier sent with every request
pub fn device_id(mac: [u8; 6]) -> DeviceId {
    let mut id = DeviceId::new();
    for (i, byte) in mac.iter().enumerate() {
        let sep = if i == 0 { "" } else { ":" };
        // 17 bytes always fit
        let _ = write!(id, "{}{:02X}", sep, byte);
    }
    id
}
