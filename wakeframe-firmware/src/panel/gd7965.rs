//! GD7965 (UC8179) 7.5" 800x480 e-paper driver
//!
//! No framebuffer: every row is written straight into panel RAM through a
//! one-row partial window, then [`DisplaySink::commit_frame`] runs a full
//! refresh.
//!
//! ```text
//!  paint_row:  0x91 partial in ─► 0x90 window(x, y, w, 1)
//!              ─► 0x10 plane 0 [─► 0x13 plane 1] ─► 0x92 partial out
//!  commit:     0x12 refresh ─► BUSY
//! ```
//!
//! Mono panels take the row on 0x13 (new data). Three-color panels take
//! black/white on 0x10 and the accent plane, inverted, on 0x13.

use defmt::*;
use embassy_time::{with_timeout, Duration, Timer};
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use embedded_hal_async::digital::Wait;
use wakeframe_core::traits::{DisplayError, DisplaySink};
use wakeframe_protocol::{row_bytes, ColorMode};

pub const WIDTH: u16 = 800;
pub const HEIGHT: u16 = 480;

const POWER_ON_TIMEOUT_MS: u64 = 500;
const POWER_OFF_TIMEOUT_MS: u64 = 500;
const MONO_REFRESH_TIMEOUT_MS: u64 = 10_000;
const ACCENT_REFRESH_TIMEOUT_MS: u64 = 30_000;

// UC8179 commands
#[allow(dead_code)]
mod cmd {
    pub const PANEL_SETTING: u8 = 0x00;
    pub const POWER_SETTING: u8 = 0x01;
    pub const POWER_OFF: u8 = 0x02;
    pub const POWER_ON: u8 = 0x04;
    pub const BOOSTER_SOFT_START: u8 = 0x06;
    pub const DEEP_SLEEP: u8 = 0x07;
    pub const DATA_START_OLD: u8 = 0x10;
    pub const DISPLAY_REFRESH: u8 = 0x12;
    pub const DATA_START_NEW: u8 = 0x13;
    pub const DUAL_SPI: u8 = 0x15;
    pub const VCOM_DATA_INTERVAL: u8 = 0x50;
    pub const TCON_SETTING: u8 = 0x60;
    pub const RESOLUTION: u8 = 0x61;
    pub const PARTIAL_WINDOW: u8 = 0x90;
    pub const PARTIAL_IN: u8 = 0x91;
    pub const PARTIAL_OUT: u8 = 0x92;
}

/// Deep sleep check code
const DEEP_SLEEP_CHECK: u8 = 0xA5;

/// Largest row on this panel
const MAX_ROW_BYTES: usize = WIDTH as usize / 8;

pub struct Gd7965<SPI, DC, RST, BUSY> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    color: ColorMode,
    powered: bool,
}

impl<SPI, DC, RST, BUSY> Gd7965<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: Wait,
{
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, color: ColorMode) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            color,
            powered: false,
        }
    }

    async fn reset(&mut self) {
        let _ = self.rst.set_high();
        Timer::after_millis(20).await;
        let _ = self.rst.set_low();
        Timer::after_millis(2).await;
        let _ = self.rst.set_high();
        Timer::after_millis(20).await;
    }

    /// Reset the controller, load the panel settings and power on
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        self.reset().await;

        self.command(cmd::POWER_SETTING, &[0x07, 0x07, 0x3F, 0x3F])?;
        self.command(cmd::BOOSTER_SOFT_START, &[0x17, 0x17, 0x28, 0x17])?;
        self.command(cmd::POWER_ON, &[])?;
        self.wait_idle(POWER_ON_TIMEOUT_MS).await?;

        let panel = match self.color {
            ColorMode::BlackWhite => 0x1F,
            ColorMode::ThreeColor => 0x0F,
        };
        self.command(cmd::PANEL_SETTING, &[panel])?;
        self.command(cmd::RESOLUTION, &[0x03, 0x20, 0x01, 0xE0])?;
        self.command(cmd::DUAL_SPI, &[0x00])?;
        self.command(cmd::VCOM_DATA_INTERVAL, &[0x29, 0x07])?;
        self.command(cmd::TCON_SETTING, &[0x22])?;

        self.powered = true;
        info!("GD7965 ready ({})", self.color.as_str());
        Ok(())
    }

    /// Power the panel down and put the controller into deep sleep
    pub async fn sleep(&mut self) -> Result<(), DisplayError> {
        if self.powered {
            self.command(cmd::POWER_OFF, &[])?;
            self.wait_idle(POWER_OFF_TIMEOUT_MS).await?;
            self.powered = false;
        }
        self.command(cmd::DEEP_SLEEP, &[DEEP_SLEEP_CHECK])
    }

    fn command(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::Bus)?;
        self.spi.write(&[command]).map_err(|_| DisplayError::Bus)?;
        if !data.is_empty() {
            self.send_data(data)?;
        }
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::Bus)?;
        self.spi.write(data).map_err(|_| DisplayError::Bus)
    }

    /// BUSY is low while the controller works
    async fn wait_idle(&mut self, timeout_ms: u64) -> Result<(), DisplayError> {
        match with_timeout(Duration::from_millis(timeout_ms), self.busy.wait_for_high()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(DisplayError::Bus),
            Err(_) => {
                warn!("GD7965 busy for more than {} ms", timeout_ms);
                Err(DisplayError::BusyTimeout)
            }
        }
    }

    fn set_row_window(&mut self, x: u16, y: u16, width: u16) -> Result<(), DisplayError> {
        let x_end = x + width - 1;
        self.command(
            cmd::PARTIAL_WINDOW,
            &[
                (x >> 8) as u8,
                (x & 0xF8) as u8,
                (x_end >> 8) as u8,
                (x_end | 0x07) as u8,
                (y >> 8) as u8,
                y as u8,
                (y >> 8) as u8,
                y as u8,
                0x01,
            ],
        )
    }

    fn write_inverted(&mut self, plane: &[u8]) -> Result<(), DisplayError> {
        let mut inverted = [0u8; MAX_ROW_BYTES];
        for (out, byte) in inverted.iter_mut().zip(plane) {
            *out = !byte;
        }
        self.send_data(&inverted[..plane.len()])
    }
}

impl<SPI, DC, RST, BUSY> DisplaySink for Gd7965<SPI, DC, RST, BUSY>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: Wait,
{
    async fn paint_row(
        &mut self,
        planes: &[&[u8]],
        x: u16,
        y: u16,
        width: u16,
    ) -> Result<(), DisplayError> {
        let right = u32::from(x) + u32::from(width);
        if width == 0 || x % 8 != 0 || y >= HEIGHT || right > u32::from(WIDTH) {
            return Err(DisplayError::OutOfBounds);
        }
        if planes.len() != self.color.planes().count() {
            return Err(DisplayError::PlaneMismatch);
        }
        let len = row_bytes(width);
        if planes.iter().any(|plane| plane.len() != len) {
            return Err(DisplayError::PlaneMismatch);
        }

        self.command(cmd::PARTIAL_IN, &[])?;
        self.set_row_window(x, y, width)?;
        match planes {
            [mono] => {
                self.command(cmd::DATA_START_NEW, &[])?;
                self.send_data(mono)?;
            }
            [mono, accent] => {
                self.command(cmd::DATA_START_OLD, &[])?;
                self.send_data(mono)?;
                self.command(cmd::DATA_START_NEW, &[])?;
                self.write_inverted(accent)?;
            }
            _ => return Err(DisplayError::PlaneMismatch),
        }
        self.command(cmd::PARTIAL_OUT, &[])
    }

    async fn commit_frame(&mut self) -> Result<(), DisplayError> {
        if !self.powered {
            self.init().await?;
        }
        let timeout = match self.color {
            ColorMode::BlackWhite => MONO_REFRESH_TIMEOUT_MS,
            ColorMode::ThreeColor => ACCENT_REFRESH_TIMEOUT_MS,
        };
        debug!("GD7965 refresh");
        self.command(cmd::DISPLAY_REFRESH, &[])?;
        Timer::after_millis(1).await;
        self.wait_idle(timeout).await
    }
}
