//! Sync cycle state machine

use super::outcome::FailureReason;

/// Where a sync cycle currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncState {
    /// No request in flight
    #[default]
    Idle,
    /// Request written, waiting for the response head
    RequestSent,
    /// Magic and checksum lines read
    HeaderParsed,
    /// Rows are being painted
    StreamingRows,
    /// Panel refreshed with the new image
    Committed,
    /// Last attempt failed
    Failed(FailureReason),
}

/// Events driving [`SyncState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncEvent {
    /// Connection opened and request written
    RequestIssued,
    /// Server answered 304
    NotModified,
    /// Magic and checksum lines accepted
    HeaderAccepted,
    /// Checksum equals the stored one
    ChecksumMatched,
    /// Checksum differs, rows follow
    ChecksumChanged,
    /// All rows painted and the panel refreshed
    FrameCommitted,
    /// The attempt failed
    Fault(FailureReason),
}

impl SyncState {
    /// Whether a request is in flight
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SyncState::RequestSent | SyncState::HeaderParsed | SyncState::StreamingRows
        )
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SyncEvent) -> Self {
        use SyncEvent::*;
        use SyncState::*;

        match (self, event) {
            (Idle, RequestIssued) => RequestSent,
            // Retry
            (Failed(_), RequestIssued) => RequestSent,

            (RequestSent, NotModified) => Idle,
            (RequestSent, HeaderAccepted) => HeaderParsed,

            (HeaderParsed, ChecksumMatched) => Idle,
            (HeaderParsed, ChecksumChanged) => StreamingRows,

            (StreamingRows, FrameCommitted) => Committed,

            (Committed, _) => self,
            (_, Fault(reason)) => Failed(reason),

            _ => self,
        }
    }
}
