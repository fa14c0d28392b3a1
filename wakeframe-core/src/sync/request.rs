//! What to ask the server for

use core::fmt::Write;

use heapless::String;
use wakeframe_protocol::{PlaneCount, RasterGeometry};

use crate::http::MAX_TARGET_LEN;

/// Longest image path
pub const MAX_PATH_LEN: usize = 64;

/// Longest device identifier (a MAC address needs 17)
pub const MAX_DEVICE_ID_LEN: usize = 32;

/// Errors while building a [`FrameRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RequestError {
    /// Path longer than [`MAX_PATH_LEN`]
    PathTooLong,
    /// Device id longer than [`MAX_DEVICE_ID_LEN`]
    DeviceIdTooLong,
    /// Request target does not fit [`MAX_TARGET_LEN`]
    TargetTooLong,
}

/// Image request for one panel region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameRequest {
    path: String<MAX_PATH_LEN>,
    device_id: String<MAX_DEVICE_ID_LEN>,
    /// Left edge of the region on the panel
    pub x: u16,
    /// Top edge of the region on the panel
    pub y: u16,
    /// Size and plane layout of the streamed rows
    pub geometry: RasterGeometry,
}

impl FrameRequest {
    /// Create a request for a `width` x `height` region at (`x`, `y`)
    pub fn new(
        path: &str,
        device_id: &str,
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        planes: PlaneCount,
    ) -> Result<Self, RequestError> {
        Ok(Self {
            path: String::try_from(path).map_err(|_| RequestError::PathTooLong)?,
            device_id: String::try_from(device_id).map_err(|_| RequestError::DeviceIdTooLong)?,
            x,
            y,
            geometry: RasterGeometry::new(width, height, planes),
        })
    }

    /// Image path on the server
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Identifier sent as `mac=`
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Region width in pixels
    pub fn width(&self) -> u16 {
        self.geometry.width
    }

    /// Region height in rows
    pub fn height(&self) -> u16 {
        self.geometry.height
    }

    /// Bytes per row of one plane
    pub fn row_bytes(&self) -> usize {
        self.geometry.row_bytes()
    }

    /// Planes per row
    pub fn planes(&self) -> PlaneCount {
        self.geometry.planes
    }

    /// Request target: path plus the identifying query
    pub fn target(&self) -> Result<String<MAX_TARGET_LEN>, RequestError> {
        let mut target = String::new();
        let separator = if self.path.contains('?') { '&' } else { '?' };
        write!(target, "{}{}mac={}", self.path, separator, self.device_id)
            .map_err(|_| RequestError::TargetTooLong)?;
        Ok(target)
    }
}
