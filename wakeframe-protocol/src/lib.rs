//! Wakeframe raster wire format
//!
//! This crate defines the body the server sends for a frame request and the
//! small slice of HTTP/1.1 the device needs to read it. It holds no I/O; the
//! streaming reader and the sync engine live in `wakeframe-core`.
//!
//! # Body Layout
//!
//! ```text
//! ┌──────┬───────────────┬──────────────────────────────────────────────┐
//! │ "MM" │ checksum      │ rows                                         │
//! │ \n   │ ≤64B text \n  │ height × planes × ceil(width / 8) bytes      │
//! └──────┴───────────────┴──────────────────────────────────────────────┘
//! ```
//!
//! Each row carries one bit-packed scanline per plane, plane 0 first. The
//! checksum is an opaque cache key computed by the server; the device only
//! compares it for equality.

#![no_std]
#![deny(unsafe_code)]

pub mod header;
pub mod http;
pub mod raster;

pub use header::{check_magic, Checksum, HeaderError, MAGIC, MAX_CHECKSUM_LEN};
pub use http::{parse_content_length, parse_status_line, status_text, STATUS_NOT_MODIFIED, STATUS_OK};
pub use raster::{row_bytes, ColorMode, PlaneCount, RasterGeometry, MAX_PLANES};
