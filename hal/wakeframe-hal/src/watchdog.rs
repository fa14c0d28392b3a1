//! Watchdog abstraction

/// Hardware watchdog
///
/// The device resets if `feed` is not called within the configured
/// timeout. Every long-running loop in the wake cycle must reach a feed.
pub trait Watchdog {
    /// Restart the watchdog countdown
    fn feed(&mut self);
}

impl<T: Watchdog + ?Sized> Watchdog for &mut T {
    fn feed(&mut self) {
        (**self).feed()
    }
}
