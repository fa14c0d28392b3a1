//! Body header: magic line and checksum line.
//!
//! Both lines are newline terminated; a trailing `\r` is stripped by the
//! line reader before the bytes get here.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magic token on the first body line
pub const MAGIC: &[u8] = b"MM";

/// Maximum stored checksum length in bytes
pub const MAX_CHECKSUM_LEN: usize = 64;

/// Errors from header validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// First line is not the magic token
    BadMagic,
}

/// Check the first body line against the magic token
///
/// The comparison is exact: `"MM "` or `"mm"` are rejected.
pub fn check_magic(line: &[u8]) -> Result<(), HeaderError> {
    if line == MAGIC {
        Ok(())
    } else {
        Err(HeaderError::BadMagic)
    }
}

/// Server supplied checksum of the current image
///
/// Stored as raw bytes; the server normally sends hex but nothing here
/// depends on that. Values longer than [`MAX_CHECKSUM_LEN`] are truncated,
/// and both sides of a comparison go through the same truncation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Checksum {
    bytes: Vec<u8, MAX_CHECKSUM_LEN>,
}

impl Checksum {
    /// Build a checksum from a header line, truncating to the maximum length
    pub fn from_bytes(line: &[u8]) -> Self {
        let len = line.len().min(MAX_CHECKSUM_LEN);
        let mut bytes = Vec::new();
        // Cannot fail: len is clamped to capacity
        let _ = bytes.extend_from_slice(&line[..len]);
        Self { bytes }
    }

    /// Raw checksum bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Checksum as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Check if the checksum is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Checksum {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[u8]:a}", self.bytes.as_slice());
    }
}
