//! Retry policy for server requests

use super::outcome::FailureReason;

/// Attempts per image sync when nothing else is configured
pub const MAX_ATTEMPTS: u8 = 5;

/// Delay between attempts when nothing else is configured (ms)
pub const RETRY_DELAY_MS: u32 = 1000;

/// How failures are retried and what they do to the stored checksum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u8,
    /// Pause before each retry (ms)
    pub retry_delay_ms: u32,
    /// Retry when the magic line is wrong
    pub retry_on_bad_magic: bool,
    /// Forget the stored checksum when every attempt fails
    pub clear_on_failure: bool,
    /// Treat HTTP 304 as "unchanged"
    pub honor_not_modified: bool,
}

impl RetryPolicy {
    /// Default policy for image sync
    pub const fn new() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            retry_delay_ms: RETRY_DELAY_MS,
            retry_on_bad_magic: false,
            clear_on_failure: true,
            honor_not_modified: true,
        }
    }

    /// Lighter policy for small requests such as the remote config
    pub const fn light() -> Self {
        Self {
            max_attempts: 3,
            ..Self::new()
        }
    }

    /// Attempts, never fewer than one
    pub const fn attempts(&self) -> u8 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }

    /// Whether a failed attempt with `reason` may be retried
    pub const fn should_retry(&self, reason: FailureReason) -> bool {
        match reason {
            FailureReason::MalformedHeader => self.retry_on_bad_magic,
            FailureReason::InvalidRequest => false,
            _ => true,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
