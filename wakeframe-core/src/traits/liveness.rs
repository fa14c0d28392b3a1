//! Liveness hook called from every wait loop
//!
//! Long transfers must keep the hardware watchdog fed and let background
//! work (the update listener) make progress.

use core::future::Future;

use wakeframe_hal::{UpdateListener, UpdateStatus, Watchdog};

/// Periodic hook for long-running loops
pub trait Liveness {
    /// Feed the watchdog and service background work
    fn tick(&mut self) -> impl Future<Output = ()>;
}

impl<T: Liveness> Liveness for &mut T {
    fn tick(&mut self) -> impl Future<Output = ()> {
        (**self).tick()
    }
}

/// [`Liveness`] backed by a hardware watchdog and an update listener
pub struct WatchdogLiveness<W, U> {
    watchdog: W,
    updates: U,
    ticks: u32,
    last_update: UpdateStatus,
}

impl<W: Watchdog, U: UpdateListener> WatchdogLiveness<W, U> {
    /// Create a new liveness hook
    pub fn new(watchdog: W, updates: U) -> Self {
        Self {
            watchdog,
            updates,
            ticks: 0,
            last_update: UpdateStatus::Idle,
        }
    }

    /// Number of ticks since creation
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Update listener status seen on the last tick
    pub fn update_status(&self) -> UpdateStatus {
        self.last_update
    }

    /// Access the watchdog directly
    pub fn watchdog_mut(&mut self) -> &mut W {
        &mut self.watchdog
    }
}

impl<W: Watchdog, U: UpdateListener> Liveness for WatchdogLiveness<W, U> {
    async fn tick(&mut self) {
        self.watchdog.feed();
        self.last_update = self.updates.poll();
        self.ticks = self.ticks.wrapping_add(1);
        embassy_futures::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    struct CountingDog(u32);

    impl Watchdog for CountingDog {
        fn feed(&mut self) {
            self.0 += 1;
        }
    }

    struct Scripted(UpdateStatus);

    impl UpdateListener for Scripted {
        fn poll(&mut self) -> UpdateStatus {
            self.0
        }
    }

    #[test]
    fn test_tick_feeds_and_polls() {
        let mut live = WatchdogLiveness::new(CountingDog(0), Scripted(UpdateStatus::Receiving));
        block_on(async {
            live.tick().await;
            live.tick().await;
        });

        assert_eq!(live.ticks(), 2);
        assert_eq!(live.watchdog_mut().0, 2);
        assert_eq!(live.update_status(), UpdateStatus::Receiving);
    }

    #[test]
    fn test_tick_through_reference() {
        let mut live = WatchdogLiveness::new(CountingDog(0), wakeframe_hal::NoUpdates);
        async fn drive<L: Liveness>(mut liveness: L) {
            liveness.tick().await;
        }

        block_on(drive(&mut live));
        assert_eq!(live.ticks(), 1);
    }
}
