//! Record kept in retained memory across deep sleep
//!
//! Encoded with postcard behind a version byte. Anything that does not
//! decode is treated like a cold boot.

use serde::{Deserialize, Serialize};
use wakeframe_hal::{RetainedError, RetainedStore};

use super::checksum::StoredChecksum;

/// Record layout version
pub const RECORD_VERSION: u8 = 1;

/// Upper bound on the encoded record size
pub const MAX_RECORD_LEN: usize = 96;

/// Errors loading or storing the record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateError {
    /// Retained store failure
    Store(RetainedError),
    /// Record could not be encoded
    Encode,
    /// Record could not be decoded
    Decode,
    /// Record was written by a different layout version
    Version(u8),
}

impl From<RetainedError> for StateError {
    fn from(e: RetainedError) -> Self {
        StateError::Store(e)
    }
}

/// Everything that survives deep sleep
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistedState {
    /// Wake cycles since the last cold boot
    pub boot_count: u32,
    /// Image currently on the panel
    pub checksum: StoredChecksum,
}

impl PersistedState {
    /// Load the record, falling back to a fresh state on any error
    pub fn load<R: RetainedStore>(store: &mut R) -> Self {
        Self::try_load(store).unwrap_or_default()
    }

    /// Load the record
    pub fn try_load<R: RetainedStore>(store: &mut R) -> Result<Self, StateError> {
        let mut buf = [0u8; MAX_RECORD_LEN];
        let len = store.read(&mut buf)?;
        let (&version, body) = buf[..len].split_first().ok_or(StateError::Decode)?;
        if version != RECORD_VERSION {
            return Err(StateError::Version(version));
        }
        postcard::from_bytes(body).map_err(|_| StateError::Decode)
    }

    /// Replace the stored record
    pub fn store<R: RetainedStore>(&self, store: &mut R) -> Result<(), StateError> {
        let mut buf = [0u8; MAX_RECORD_LEN];
        buf[0] = RECORD_VERSION;
        let used = postcard::to_slice(self, &mut buf[1..])
            .map_err(|_| StateError::Encode)?
            .len();
        store.write(&buf[..1 + used])?;
        Ok(())
    }

    /// Count a new wake cycle and return its number
    pub fn begin_cycle(&mut self) -> u32 {
        self.boot_count = self.boot_count.wrapping_add(1);
        self.boot_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use wakeframe_protocol::{Checksum, MAX_CHECKSUM_LEN};

    #[test]
    fn test_cold_boot_is_default() {
        let mut store = MemoryStore::new(MAX_RECORD_LEN);
        assert_eq!(
            PersistedState::try_load(&mut store),
            Err(StateError::Store(RetainedError::Empty))
        );
        assert_eq!(PersistedState::load(&mut store), PersistedState::default());
    }

    #[test]
    fn test_survives_sleep() {
        let mut store = MemoryStore::new(MAX_RECORD_LEN);
        let mut state = PersistedState::default();
        state.begin_cycle();
        state.checksum.set(Checksum::from_bytes(&[b'f'; MAX_CHECKSUM_LEN]));
        state.store(&mut store).unwrap();

        let loaded = PersistedState::load(&mut store);
        assert_eq!(loaded, state);
        assert_eq!(loaded.boot_count, 1);
    }

    #[test]
    fn test_cleared_survives_sleep() {
        let mut store = MemoryStore::new(MAX_RECORD_LEN);
        let state = PersistedState {
            boot_count: 7,
            checksum: StoredChecksum::Cleared,
        };
        state.store(&mut store).unwrap();
        assert_eq!(PersistedState::load(&mut store).checksum, StoredChecksum::Cleared);
    }

    #[test]
    fn test_garbage_is_cold_boot() {
        let mut store = MemoryStore::new(MAX_RECORD_LEN);
        store.data = Some(std::vec![RECORD_VERSION, 0xff, 0xff, 0xff]);
        assert_eq!(PersistedState::try_load(&mut store), Err(StateError::Decode));
        assert_eq!(PersistedState::load(&mut store), PersistedState::default());
    }

    #[test]
    fn test_other_version_rejected() {
        let mut store = MemoryStore::new(MAX_RECORD_LEN);
        store.data = Some(std::vec![9, 0, 0]);
        assert_eq!(PersistedState::try_load(&mut store), Err(StateError::Version(9)));
    }

    #[test]
    fn test_store_too_small() {
        let mut store = MemoryStore::new(4);
        let mut state = PersistedState::default();
        state.checksum.set(Checksum::from_bytes(b"0123456789"));
        assert_eq!(
            state.store(&mut store),
            Err(StateError::Store(RetainedError::TooLarge))
        );
    }

    #[test]
    fn test_begin_cycle_wraps() {
        let mut state = PersistedState {
            boot_count: u32::MAX,
            ..Default::default()
        };
        assert_eq!(state.begin_cycle(), 0);
    }
}
