//! Remote firmware update listener
//!
//! The transport behind an update session (OTA over TCP, serial, ...) is
//! board specific. The wake cycle only needs to give it CPU time while a
//! long download is in progress.

/// State reported by an update listener after servicing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UpdateStatus {
    /// Nothing pending
    Idle,
    /// A session is receiving an image
    Receiving,
    /// An image was written and the device is about to restart
    Finished,
}

/// Listener for remote firmware updates
pub trait UpdateListener {
    /// Service any pending update session without blocking
    fn poll(&mut self) -> UpdateStatus;
}

impl<T: UpdateListener + ?Sized> UpdateListener for &mut T {
    fn poll(&mut self) -> UpdateStatus {
        (**self).poll()
    }
}

/// Listener for boards without an update transport
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUpdates;

impl UpdateListener for NoUpdates {
    fn poll(&mut self) -> UpdateStatus {
        UpdateStatus::Idle
    }
}
