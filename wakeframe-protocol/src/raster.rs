//! Raster geometry.
//!
//! Pixels are packed 8 to a byte, MSB first. A row that is not a multiple
//! of 8 pixels wide is padded to the next byte.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of color planes per row
pub const MAX_PLANES: usize = 2;

/// Bytes needed for one scanline of one plane
pub const fn row_bytes(width: u16) -> usize {
    (width as usize + 7) / 8
}

/// Number of bit planes sent per row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlaneCount {
    /// Black/white
    #[default]
    Mono,
    /// Black/white plus one accent color
    MonoAccent,
}

impl PlaneCount {
    /// Number of planes as a count
    pub const fn count(self) -> usize {
        match self {
            PlaneCount::Mono => 1,
            PlaneCount::MonoAccent => 2,
        }
    }

    /// Create from a plane count
    pub const fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(PlaneCount::Mono),
            2 => Some(PlaneCount::MonoAccent),
            _ => None,
        }
    }
}

/// Panel color capability as configured and reported to the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ColorMode {
    /// Black and white
    #[default]
    BlackWhite,
    /// Black, white and one accent color (red or yellow)
    ThreeColor,
}

impl ColorMode {
    /// Planes the server sends for this mode
    pub const fn planes(self) -> PlaneCount {
        match self {
            ColorMode::BlackWhite => PlaneCount::Mono,
            ColorMode::ThreeColor => PlaneCount::MonoAccent,
        }
    }

    /// Name used in the config query string
    pub const fn as_str(self) -> &'static str {
        match self {
            ColorMode::BlackWhite => "BW",
            ColorMode::ThreeColor => "3C",
        }
    }

    /// Parse the config file spelling (`bw` or `3c`, any case)
    pub fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("bw") {
            Some(ColorMode::BlackWhite)
        } else if value.eq_ignore_ascii_case("3c") {
            Some(ColorMode::ThreeColor)
        } else {
            None
        }
    }
}

/// Shape of the row data that follows the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RasterGeometry {
    /// Width in pixels
    pub width: u16,
    /// Height in rows
    pub height: u16,
    /// Planes per row
    pub planes: PlaneCount,
}

impl RasterGeometry {
    /// Create a geometry
    pub const fn new(width: u16, height: u16, planes: PlaneCount) -> Self {
        Self {
            width,
            height,
            planes,
        }
    }

    /// Bytes per row of one plane
    pub const fn row_bytes(&self) -> usize {
        row_bytes(self.width)
    }

    /// Bytes per row across all planes
    pub const fn row_stride(&self) -> usize {
        self.row_bytes() * self.planes.count()
    }

    /// Bytes of row data for the whole frame
    pub const fn frame_bytes(&self) -> usize {
        self.row_stride() * self.height as usize
    }

    /// Expected body length given the header length in bytes
    pub const fn expected_body_len(&self, header_len: usize) -> usize {
        header_len + self.frame_bytes()
    }
}
