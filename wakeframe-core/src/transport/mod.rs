//! Chunked reads over a [`ByteStream`](crate::traits::ByteStream)
//!
//! Every wait in here is bounded and calls the liveness hook, so a stalled
//! server can never starve the watchdog.

pub mod reader;

pub use reader::{ChunkedReader, LineRead, ReadTimeouts};

use embedded_hal_async::delay::DelayNs;

use crate::traits::Liveness;

/// Longest single sleep between liveness ticks during a pause
pub const PAUSE_SLICE_MS: u32 = 100;

/// Sleep for `ms` milliseconds in slices, ticking between them
pub async fn pause<L: Liveness, D: DelayNs>(liveness: &mut L, delay: &mut D, ms: u32) {
    let mut remaining = ms;
    while remaining > 0 {
        liveness.tick().await;
        let slice = remaining.min(PAUSE_SLICE_MS);
        delay.delay_ms(slice).await;
        remaining -= slice;
    }
}
