//! ESP32 board support
//!
//! Implements the `wakeframe-hal` traits on esp-hal peripherals:
//!
//! | Trait           | Implementation                       |
//! |-----------------|--------------------------------------|
//! | `Watchdog`      | RTC watchdog, also owns deep sleep   |
//! | `RetainedStore` | RTC fast memory record               |
//! | `BatterySensor` | ADC1 on GPIO32 behind a divider      |
//! | reset / wakeup  | ROM reset reason and sleep source    |

pub mod battery;
pub mod retained;
pub mod system;
pub mod watchdog;

pub use battery::AdcBattery;
pub use retained::RtcStore;
pub use system::{device_id, reset_reason, wakeup_reason, DeviceId};
pub use watchdog::RtcWatchdog;
