//! Wakeframe Hardware Abstraction Layer
//!
//! This crate defines the board-facing traits the wake cycle depends on.
//! Chip support lives in the firmware crate; the core crate only ever
//! sees these traits, which keeps it testable on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  wakeframe-firmware (ESP32 board)       │
//! └─────────────────────────────────────────┘
//!            │ implements         │ drives
//!            ▼                    ▼
//! ┌──────────────────────┐  ┌──────────────────────┐
//! │ wakeframe-hal        │◄─│ wakeframe-core       │
//! │ (this crate, traits) │  │ (sync engine, state) │
//! └──────────────────────┘  └──────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`watchdog::Watchdog`] - Hardware watchdog refresh
//! - [`update::UpdateListener`] - Remote firmware update servicing
//! - [`retained::RetainedStore`] - Memory that survives deep sleep
//! - [`battery::BatterySensor`] - Battery voltage sampling

#![no_std]
#![deny(unsafe_code)]

pub mod battery;
pub mod retained;
pub mod system;
pub mod update;
pub mod watchdog;

// Re-export key traits at crate root for convenience
pub use battery::{AdcError, BatterySensor};
pub use retained::{RetainedError, RetainedStore};
pub use system::{ResetReason, WakeupReason};
pub use update::{NoUpdates, UpdateListener, UpdateStatus};
pub use watchdog::Watchdog;
