//! E-paper panel driver

pub mod gd7965;

pub use gd7965::{Gd7965, HEIGHT, WIDTH};
