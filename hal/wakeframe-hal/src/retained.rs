//! Retained memory abstractions
//!
//! Small records that must survive deep sleep live in a memory region that
//! stays powered while the main domain is gated (RTC memory on ESP32).
//! The region is lost on a full power cycle, so implementations must be
//! able to tell a valid record from power-on garbage.

/// Errors from retained storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetainedError {
    /// No valid record (cold boot or invalidated)
    Empty,
    /// Buffer too small for the stored record
    BufferTooSmall,
    /// Record exceeds the retained region
    TooLarge,
}

/// Storage that survives deep sleep but not power loss
///
/// Implementations should:
/// - Report [`RetainedError::Empty`] after a cold boot
/// - Replace the previous record atomically from the reader's point of view
pub trait RetainedStore {
    /// Maximum record size in bytes
    fn capacity(&self) -> usize;

    /// Read the stored record into `buffer`
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RetainedError>;

    /// Replace the stored record
    fn write(&mut self, data: &[u8]) -> Result<(), RetainedError>;

    /// Drop the stored record so the next read reports `Empty`
    fn invalidate(&mut self);
}
