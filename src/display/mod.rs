//! Display module for e-paper display control.
//!
//! This module provides the interface to the Waveshare 2.66" black/white
//! e-Paper panel connected via SPI, with hand-driven chip select.

pub mod bus;
pub mod epd2in66;
pub mod gpio;
pub mod lut;
pub mod spi;

#[cfg(test)]
pub(crate) mod mock;

// Re-export main types
pub use bus::{BusConfig, BusError, DisplayBus, HardwareBus};
pub use epd2in66::{ControllerState, DisplayError, Epd2in66, RefreshMode, landscape_to_native};
pub use lut::WaveformLut;
