//! Band buffer covering a horizontal slice of the frame

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use wakeframe_protocol::row_bytes;

/// Rows held by one band
pub const BAND_ROWS: usize = 16;

/// A byte of white pixels
pub const WHITE: u8 = 0xFF;

/// One band of a frame, `ROW` bytes wide
///
/// Exposes the full frame size to `embedded-graphics` so layouts are
/// computed in frame coordinates. Pixels outside the current band are
/// dropped. `BinaryColor::On` is ink.
pub struct BandBuffer<const ROW: usize> {
    rows: [[u8; ROW]; BAND_ROWS],
    width: u16,
    height: u16,
    top: u16,
}

impl<const ROW: usize> BandBuffer<ROW> {
    /// Create a buffer for a `width` × `height` frame, band at the top
    ///
    /// Width is clamped to what fits in `ROW` bytes.
    pub fn new(width: u16, height: u16) -> Self {
        let max_width = u16::try_from(ROW * 8).unwrap_or(u16::MAX);
        Self {
            rows: [[WHITE; ROW]; BAND_ROWS],
            width: width.min(max_width),
            height,
            top: 0,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    /// First frame row of the current band
    pub fn top(&self) -> u16 {
        self.top
    }

    /// Rows of the frame the current band covers
    pub fn band_height(&self) -> u16 {
        self.height.saturating_sub(self.top).min(BAND_ROWS as u16)
    }

    /// Move the band to start at frame row `top` and clear it
    pub fn start_band(&mut self, top: u16) {
        self.top = top;
        for row in self.rows.iter_mut() {
            row.fill(WHITE);
        }
    }

    /// Packed bytes of band row `row`
    pub fn row(&self, row: usize) -> Option<&[u8]> {
        if row >= usize::from(self.band_height()) {
            return None;
        }
        Some(&self.rows[row][..row_bytes(self.width)])
    }

    fn band_area(&self) -> Rectangle {
        Rectangle::new(
            Point::new(0, i32::from(self.top)),
            Size::new(u32::from(self.width), u32::from(self.band_height())),
        )
    }

    fn set_pixel(&mut self, x: i32, y: i32, ink: bool) {
        if x < 0 || x >= i32::from(self.width) {
            return;
        }
        let local_y = y - i32::from(self.top);
        if local_y < 0 || local_y >= i32::from(self.band_height()) {
            return;
        }

        let x = x as usize;
        let byte = &mut self.rows[local_y as usize][x / 8];
        let bit = 0x80 >> (x % 8);
        if ink {
            *byte &= !bit;
        } else {
            *byte |= bit;
        }
    }
}

impl<const ROW: usize> OriginDimensions for BandBuffer<ROW> {
    fn size(&self) -> Size {
        Size::new(u32::from(self.width), u32::from(self.height))
    }
}

impl<const ROW: usize> DrawTarget for BandBuffer<ROW> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color == BinaryColor::On);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let ink = color == BinaryColor::On;
        for point in area.intersection(&self.band_area()).points() {
            self.set_pixel(point.x, point.y, ink);
        }
        Ok(())
    }
}
