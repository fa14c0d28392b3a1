//! Result of a sync cycle

use core::fmt;

/// Why a sync cycle did not update the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FailureReason {
    /// Connect failed, or the stream ended inside the HTTP head or the
    /// body header lines
    Connection,
    /// Server answered with an unexpected status
    Status(u16),
    /// First body line was not the magic token
    MalformedHeader,
    /// A row could not be read in full
    ShortRead,
    /// All rows arrived but the byte count disagrees with the response
    ByteCountMismatch,
    /// The requested rectangle cannot be streamed
    InvalidRequest,
    /// The panel rejected a row or the refresh
    Display,
}

impl FailureReason {
    /// Whether another wake cycle is unlikely to fix it
    pub const fn is_permanent(self) -> bool {
        matches!(
            self,
            FailureReason::MalformedHeader | FailureReason::InvalidRequest | FailureReason::Display
        )
    }

    /// Short message for the on-panel error screen
    pub const fn describe(self) -> &'static str {
        match self {
            FailureReason::Connection => "Failed to download image",
            FailureReason::Status(_) => "Server error",
            FailureReason::MalformedHeader => "Invalid bitmap",
            FailureReason::ShortRead => "Image download incomplete",
            FailureReason::ByteCountMismatch => "Image size mismatch",
            FailureReason::InvalidRequest => "Invalid display region",
            FailureReason::Display => "Display error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(code) => write!(
                f,
                "{} (HTTP {} {})",
                self.describe(),
                code,
                wakeframe_protocol::status_text(*code)
            ),
            _ => f.write_str(self.describe()),
        }
    }
}

/// Outcome of [`SyncEngine::synchronize`](super::SyncEngine::synchronize)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferOutcome {
    /// Server reported the same image (checksum match or 304)
    Unchanged,
    /// A new image was streamed and the panel refreshed
    Updated,
    /// Every attempt failed; holds the reason of the last one
    Failed(FailureReason),
}

impl TransferOutcome {
    /// Whether the panel now shows the server's current image
    pub const fn is_current(&self) -> bool {
        matches!(self, TransferOutcome::Unchanged | TransferOutcome::Updated)
    }
}
