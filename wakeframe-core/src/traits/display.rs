//! Display sink trait for row-at-a-time panel updates

use core::future::Future;

/// Errors that can occur while driving the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// SPI or GPIO failure
    Bus,
    /// Panel stayed busy past its deadline
    BusyTimeout,
    /// Row or window outside the panel
    OutOfBounds,
    /// Plane count does not match the panel
    PlaneMismatch,
}

/// Receives image rows and refreshes the panel
///
/// Rows arrive top to bottom. Nothing becomes visible until
/// [`commit_frame`](Self::commit_frame) is called.
pub trait DisplaySink {
    /// Write one row at (`x`, `y`)
    ///
    /// `planes` holds one packed slice per plane (1 bit per pixel, MSB
    /// first), each `ceil(width / 8)` bytes long. A set bit is white in
    /// the first plane and "no accent" in the second.
    fn paint_row(
        &mut self,
        planes: &[&[u8]],
        x: u16,
        y: u16,
        width: u16,
    ) -> impl Future<Output = Result<(), DisplayError>>;

    /// Refresh the panel with everything painted so far
    fn commit_frame(&mut self) -> impl Future<Output = Result<(), DisplayError>>;
}

impl<T: DisplaySink> DisplaySink for &mut T {
    fn paint_row(
        &mut self,
        planes: &[&[u8]],
        x: u16,
        y: u16,
        width: u16,
    ) -> impl Future<Output = Result<(), DisplayError>> {
        (**self).paint_row(planes, x, y, width)
    }

    fn commit_frame(&mut self) -> impl Future<Output = Result<(), DisplayError>> {
        (**self).commit_frame()
    }
}
