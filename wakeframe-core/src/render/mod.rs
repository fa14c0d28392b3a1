//! Text screens for error reporting
//!
//! The frame never fits in RAM, so screens are drawn one band at a time:
//!
//! ```text
//!  for each band of BAND_ROWS rows:
//!      clear band ──► draw text (clipped to band) ──► paint_row × rows
//!  commit_frame
//! ```

pub mod band;
pub mod message;

pub use band::{BandBuffer, BAND_ROWS, WHITE};
pub use message::MessageScreen;
