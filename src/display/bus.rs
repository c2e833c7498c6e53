//! Command/data transport between the host and the display controller.
//!
//! The controller protocol only needs four primitives: a hardware reset,
//! a framed command byte, a framed run of data bytes and a wait on the BUSY
//! line. [`DisplayBus`] captures exactly that, so the protocol can run over
//! the real GPIO/SPI pair or over a recording double in tests.

use super::gpio::{GpioController, GpioError, Pins};
use super::spi::{SpiDisplay, SpiError};
use std::time::Duration;
use thiserror::Error;

/// Transport errors
#[derive(Error, Debug)]
pub enum BusError {
    #[error("GPIO error: {0}")]
    Gpio(#[from] GpioError),

    #[error("SPI error: {0}")]
    Spi(#[from] SpiError),
}

impl BusError {
    /// True when the controller never released BUSY
    pub fn is_timeout(&self) -> bool {
        matches!(self, BusError::Gpio(GpioError::BusyTimeout(_)))
    }
}

/// Write-only link to the controller
pub trait DisplayBus {
    /// Pulse the reset line
    fn reset(&mut self) -> Result<(), BusError>;

    /// Send one command byte (DC low)
    fn send_command(&mut self, command: u8) -> Result<(), BusError>;

    /// Send one or more data bytes (DC high) in a single transaction
    fn send_data(&mut self, data: &[u8]) -> Result<(), BusError>;

    /// Block until the controller reports idle
    fn wait_until_idle(&mut self) -> Result<(), BusError>;
}

/// Hardware settings for the real transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConfig {
    pub pins: Pins,
    pub spi_clock_hz: u32,
    pub busy_timeout: Duration,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            pins: Pins::default(),
            spi_clock_hz: super::spi::config::CLOCK_SPEED,
            busy_timeout: Duration::from_secs(30),
        }
    }
}

/// GPIO + SPI transport on a Raspberry Pi
pub struct HardwareBus {
    gpio: GpioController,
    spi: SpiDisplay,
}

impl HardwareBus {
    pub fn new(config: &BusConfig) -> Result<Self, BusError> {
        let gpio = GpioController::new(&config.pins, config.busy_timeout)?;
        let spi = SpiDisplay::new(config.spi_clock_hz)?;
        Ok(Self { gpio, spi })
    }
}

impl DisplayBus for HardwareBus {
    fn reset(&mut self) -> Result<(), BusError> {
        self.gpio.reset();
        Ok(())
    }

    fn send_command(&mut self, command: u8) -> Result<(), BusError> {
        self.spi.write_command(&mut self.gpio, command)?;
        Ok(())
    }

    fn send_data(&mut self, data: &[u8]) -> Result<(), BusError> {
        self.spi.write_data(&mut self.gpio, data)?;
        Ok(())
    }

    fn wait_until_idle(&mut self) -> Result<(), BusError> {
        self.gpio.wait_idle()?;
        Ok(())
    }
}
