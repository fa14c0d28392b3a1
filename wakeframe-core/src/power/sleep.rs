//! How long to sleep after a wake cycle

use crate::sync::{FailureReason, TransferOutcome};

/// Why the device is going back to sleep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepReason {
    /// Cycle completed
    Normal,
    /// Something that may work on the next wake (network, server)
    TemporaryError,
    /// Something that needs attention (bad image, panel, battery)
    PermanentError,
}

impl SleepReason {
    /// Reason for a finished sync cycle
    pub const fn for_outcome(outcome: &TransferOutcome) -> Self {
        match outcome {
            TransferOutcome::Updated | TransferOutcome::Unchanged => SleepReason::Normal,
            TransferOutcome::Failed(reason) => Self::for_failure(*reason),
        }
    }

    /// Reason for a failed transfer
    pub const fn for_failure(reason: FailureReason) -> Self {
        if reason.is_permanent() {
            SleepReason::PermanentError
        } else {
            SleepReason::TemporaryError
        }
    }
}

/// Sleep intervals in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SleepPolicy {
    /// After a completed cycle
    pub normal_s: u32,
    /// After a transient failure
    pub temporary_error_s: u32,
    /// After a failure that will not fix itself
    pub permanent_error_s: u32,
}

impl SleepPolicy {
    pub const fn new() -> Self {
        Self {
            normal_s: 3600,
            temporary_error_s: 600,
            permanent_error_s: 21_600,
        }
    }

    /// Apply the server's `sleep` value; zero keeps the configured interval
    pub fn with_override(mut self, normal_s: Option<u32>) -> Self {
        if let Some(s) = normal_s.filter(|&s| s > 0) {
            self.normal_s = s;
        }
        self
    }

    /// Interval for `reason`
    pub const fn seconds(&self, reason: SleepReason) -> u32 {
        match reason {
            SleepReason::Normal => self.normal_s,
            SleepReason::TemporaryError => self.temporary_error_s,
            SleepReason::PermanentError => self.permanent_error_s,
        }
    }
}

impl Default for SleepPolicy {
    fn default() -> Self {
        Self::new()
    }
}
