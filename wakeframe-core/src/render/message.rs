//! Centred text message painted over the whole frame

use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use wakeframe_protocol::RasterGeometry;

use super::band::{BandBuffer, BAND_ROWS, WHITE};
use crate::traits::{DisplayError, DisplaySink, Liveness};

/// A message screen, e.g. "Failed to load config\nHTTP: 500 Internal Server Error"
pub struct MessageScreen<'a> {
    text: &'a str,
}

impl<'a> MessageScreen<'a> {
    pub const fn new(text: &'a str) -> Self {
        Self { text }
    }

    pub fn text(&self) -> &str {
        self.text
    }

    fn line_count(&self) -> i32 {
        self.text.lines().count().max(1) as i32
    }

    fn draw<const ROW: usize>(&self, band: &mut BandBuffer<ROW>) {
        let size = band.size();
        let line_height = FONT_10X20.character_size.height as i32;
        let center = Point::new(
            size.width as i32 / 2,
            size.height as i32 / 2 - (self.line_count() - 1) * line_height / 2,
        );

        let character = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
        let layout = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();

        let _ = Text::with_text_style(self.text, center, character, layout).draw(band);
    }

    /// Paint the message into the `geometry` window at (`x`, `y`) and refresh
    ///
    /// The accent plane, when present, is left blank.
    pub async fn render<S, L, const ROW: usize>(
        &self,
        sink: &mut S,
        liveness: &mut L,
        geometry: RasterGeometry,
        x: u16,
        y: u16,
    ) -> Result<(), DisplayError>
    where
        S: DisplaySink,
        L: Liveness,
    {
        if geometry.row_bytes() > ROW {
            return Err(DisplayError::OutOfBounds);
        }

        let mut band = BandBuffer::<ROW>::new(geometry.width, geometry.height);
        let accent = [WHITE; ROW];
        let plane_count = geometry.planes.count();

        let mut top = 0u16;
        while top < geometry.height {
            liveness.tick().await;
            band.start_band(top);
            self.draw(&mut band);

            for row in 0..band.band_height() {
                let Some(mono) = band.row(usize::from(row)) else {
                    break;
                };
                let planes: [&[u8]; 2] = [mono, &accent[..mono.len()]];
                sink.paint_row(
                    &planes[..plane_count],
                    x,
                    y.saturating_add(top + row),
                    geometry.width,
                )
                .await?;
            }

            top = top.saturating_add(BAND_ROWS as u16);
        }

        liveness.tick().await;
        sink.commit_frame().await
    }
}
