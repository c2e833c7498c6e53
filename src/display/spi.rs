//! SPI communication wrapper for the e-paper display.
//!
//! Write-only link: the controller never answers over SPI, the BUSY line is
//! the only thing read back. Chip select is driven through GPIO so that every
//! command or data run is framed exactly like the controller datasheet shows.

use super::gpio::GpioController;
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use thiserror::Error;

/// SPI configuration
pub mod config {
    /// Default SPI clock speed in Hz (1 MHz)
    pub const CLOCK_SPEED: u32 = 1_000_000;

    /// Largest single transfer handed to the kernel driver
    pub const CHUNK_SIZE: usize = 4096;
}

/// SPI-related errors
#[derive(Error, Debug)]
pub enum SpiError {
    #[error("SPI initialization failed: {0}")]
    InitError(#[from] rppal::spi::Error),

    #[error("SPI write failed: {0}")]
    WriteError(String),
}

/// SPI display interface
pub struct SpiDisplay {
    spi: Spi,
}

impl SpiDisplay {
    /// Initialize SPI for display communication
    ///
    /// Uses SPI0, Mode 0 (CPOL=0, CPHA=0)
    pub fn new(clock_speed: u32) -> Result<Self, SpiError> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, clock_speed, Mode::Mode0)?;

        tracing::debug!(
            "SPI initialized: Bus=SPI0, Speed={}Hz, Mode=0",
            clock_speed
        );

        Ok(Self { spi })
    }

    /// Send a command byte to the display
    ///
    /// Sets DC pin LOW (command mode) inside a chip select frame
    pub fn write_command(&mut self, gpio: &mut GpioController, cmd: u8) -> Result<(), SpiError> {
        gpio.cs_release();
        gpio.dc_low();
        gpio.cs_assert();
        let result = self.write_all(&[cmd]);
        gpio.cs_release();
        result
    }

    /// Send a run of data bytes to the display
    ///
    /// Sets DC pin HIGH (data mode) inside a single chip select frame
    pub fn write_data(&mut self, gpio: &mut GpioController, data: &[u8]) -> Result<(), SpiError> {
        gpio.cs_release();
        gpio.dc_high();
        gpio.cs_assert();
        let result = self.write_all(data);
        gpio.cs_release();
        result
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), SpiError> {
        for chunk in data.chunks(config::CHUNK_SIZE) {
            self.spi
                .write(chunk)
                .map_err(|e| SpiError::WriteError(e.to_string()))?;
        }
        Ok(())
    }
}
