//! State carried from one wake cycle to the next

pub mod checksum;
pub mod persisted;

pub use checksum::StoredChecksum;
pub use persisted::{PersistedState, StateError, MAX_RECORD_LEN};
