//! RTC watchdog and deep sleep
//!
//! The RTC watchdog keeps running in deep sleep, so it is disabled right
//! before the chip goes down.

use core::time::Duration as SleepDuration;

use defmt::*;
use esp_hal::rtc_cntl::sleep::TimerWakeupSource;
use esp_hal::rtc_cntl::{Rtc, RwdtStage, RwdtStageAction};
use esp_hal::time::Duration;
use wakeframe_hal::Watchdog;

/// RTC watchdog that resets the whole system on expiry
pub struct RtcWatchdog<'d> {
    rtc: Rtc<'d>,
}

impl<'d> RtcWatchdog<'d> {
    /// Arm the watchdog with `timeout_s`
    pub fn start(mut rtc: Rtc<'d>, timeout_s: u32) -> Self {
        rtc.rwdt
            .set_timeout(RwdtStage::Stage0, Duration::from_secs(u64::from(timeout_s)));
        rtc.rwdt
            .set_stage_action(RwdtStage::Stage0, RwdtStageAction::ResetSystem);
        rtc.rwdt.enable();
        rtc.rwdt.feed();
        info!("RTC watchdog armed: {}s", timeout_s);
        Self { rtc }
    }

    /// Disarm the watchdog and sleep for `seconds`
    pub fn sleep_deep(&mut self, seconds: u32) -> ! {
        self.rtc.rwdt.disable();
        let timer = TimerWakeupSource::new(SleepDuration::from_secs(u64::from(seconds)));
        self.rtc.sleep_deep(&[&timer])
    }
}

impl Watchdog for RtcWatchdog<'_> {
    fn feed(&mut self) {
        self.rtc.rwdt.feed();
    }
}
