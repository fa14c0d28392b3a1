//! Checksum of the image currently on the panel

use serde::{Deserialize, Serialize};
use wakeframe_protocol::Checksum;

/// Last successfully displayed checksum
///
/// `Undefined` and `Cleared` both force the next download; they are kept
/// apart so logs can tell a cold boot from a failed cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoredChecksum {
    /// Nothing stored yet (cold boot)
    #[default]
    Undefined,
    /// Cleared after a failed cycle
    Cleared,
    /// Checksum of the image on the panel
    Known(Checksum),
}

impl StoredChecksum {
    /// Whether `incoming` names the image already displayed
    pub fn matches(&self, incoming: &Checksum) -> bool {
        match self {
            StoredChecksum::Known(stored) => stored == incoming,
            _ => false,
        }
    }

    /// Record a newly displayed image
    pub fn set(&mut self, checksum: Checksum) {
        *self = StoredChecksum::Known(checksum);
    }

    /// Force the next cycle to download
    pub fn clear(&mut self) {
        *self = StoredChecksum::Cleared;
    }
}
