//! Retained record in RTC fast memory
//!
//! RTC fast memory survives deep sleep but not a power cycle. A magic word
//! marks the record valid; anything else reads as empty.

use core::sync::atomic::{AtomicBool, Ordering};

use wakeframe_core::state::MAX_RECORD_LEN;
use wakeframe_hal::{RetainedError, RetainedStore};

/// Marks a written record
const RECORD_MAGIC: u32 = 0x5746_524D;

#[repr(C)]
pub struct RetainedRecord {
    magic: u32,
    len: u16,
    data: [u8; MAX_RECORD_LEN],
}

impl RetainedRecord {
    const fn new() -> Self {
        Self {
            magic: 0,
            len: 0,
            data: [0; MAX_RECORD_LEN],
        }
    }
}

#[esp_hal::ram(unstable(rtc_fast))]
static mut RECORD: RetainedRecord = RetainedRecord::new();

static TAKEN: AtomicBool = AtomicBool::new(false);

/// [`RetainedStore`] over the RTC fast memory record
pub struct RtcStore {
    record: &'static mut RetainedRecord,
}

impl RtcStore {
    /// Take the record; `None` after the first call
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }
        // SAFETY: TAKEN guarantees this is the only reference ever created
        let record = unsafe { &mut *(&raw mut RECORD) };
        Some(Self { record })
    }
}

impl RetainedStore for RtcStore {
    fn capacity(&self) -> usize {
        MAX_RECORD_LEN
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, RetainedError> {
        let len = usize::from(self.record.len);
        if self.record.magic != RECORD_MAGIC || len > MAX_RECORD_LEN {
            return Err(RetainedError::Empty);
        }
        let dest = buffer
            .get_mut(..len)
            .ok_or(RetainedError::BufferTooSmall)?;
        dest.copy_from_slice(&self.record.data[..len]);
        Ok(len)
    }

    fn write(&mut self, data: &[u8]) -> Result<(), RetainedError> {
        if data.len() > MAX_RECORD_LEN {
            return Err(RetainedError::TooLarge);
        }
        self.record.magic = 0;
        self.record.data[..data.len()].copy_from_slice(data);
        self.record.len = data.len() as u16;
        self.record.magic = RECORD_MAGIC;
        Ok(())
    }

    fn invalidate(&mut self) {
        self.record.magic = 0;
    }
}
