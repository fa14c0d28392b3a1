//! Battery supervision and sleep interval selection

pub mod battery;
pub mod sleep;

pub use battery::{BatteryConfig, BatteryMonitor, BatteryReading};
pub use sleep::{SleepPolicy, SleepReason};
