//! Board-agnostic core logic for the e-paper frame firmware
//!
//! This crate contains all wake-cycle logic that does not depend on a
//! specific board:
//!
//! - Collaborator traits (byte stream, connector, display sink, liveness)
//! - Chunked transport reader with bounded, watchdog-safe reads
//! - Bitmap sync engine (checksum gating, row streaming, retries)
//! - Persisted state carried across deep sleep
//! - Sleep and battery policy
//! - Configuration types and the `device.toml` parser
//! - Remote configuration fetch
//! - Text screens for error reporting
//!
//! ```text
//!  wake ──► PersistedState::load ──► fetch_remote_config ──► SyncEngine::synchronize
//!                                                                │
//!               ┌────────────────────────────────────────────────┘
//!               ▼
//!   Unchanged / Updated / Failed ──► SleepPolicy ──► PersistedState::store ──► sleep
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod config;
pub mod http;
pub mod power;
pub mod remote;
pub mod render;
pub mod state;
pub mod sync;
pub mod traits;
pub mod transport;

#[cfg(test)]
mod testing;
