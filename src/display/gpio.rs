//! GPIO controller for the e-paper display.
//!
//! Manages the control lines of the 2.66" panel:
//! - RST (Reset), output
//! - DC (Data/Command), output
//! - CS (Chip Select), output, driven by hand around every transaction
//! - BUSY, input with pull-up (HIGH while the controller is busy)

use rppal::gpio::{Gpio, InputPin, Level, OutputPin};
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Settle delay between reset line transitions
const RESET_SETTLE: Duration = Duration::from_millis(200);

/// Interval between BUSY samples, also used as the settle time around a wait
pub const BUSY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// GPIO pin assignments (BCM numbering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pins {
    pub rst: u8,
    pub dc: u8,
    pub cs: u8,
    pub busy: u8,
}

impl Default for Pins {
    fn default() -> Self {
        Self {
            rst: 19,
            dc: 17,
            cs: 18,
            busy: 14,
        }
    }
}

impl Pins {
    /// All four pins, in RST, DC, CS, BUSY order
    pub fn as_array(&self) -> [u8; 4] {
        [self.rst, self.dc, self.cs, self.busy]
    }
}

/// GPIO-related errors
#[derive(Error, Debug)]
pub enum GpioError {
    #[error("GPIO initialization failed: {0}")]
    InitError(#[from] rppal::gpio::Error),

    #[error("Busy timeout: display did not respond within {0}ms")]
    BusyTimeout(u64),
}

/// GPIO controller for the e-paper display
pub struct GpioController {
    rst: OutputPin,
    dc: OutputPin,
    cs: OutputPin,
    busy: InputPin,
    busy_timeout: Duration,
}

impl GpioController {
    /// Claim the control pins and drive them to their idle levels
    pub fn new(pins: &Pins, busy_timeout: Duration) -> Result<Self, GpioError> {
        let gpio = Gpio::new()?;

        let mut rst = gpio.get(pins.rst)?.into_output();
        let mut dc = gpio.get(pins.dc)?.into_output();
        let mut cs = gpio.get(pins.cs)?.into_output();
        let busy = gpio.get(pins.busy)?.into_input_pullup();

        rst.set_high();
        dc.set_low();
        cs.set_high();

        tracing::debug!(
            "GPIO initialized: RST={}, DC={}, CS={}, BUSY={}",
            pins.rst,
            pins.dc,
            pins.cs,
            pins.busy
        );

        Ok(Self {
            rst,
            dc,
            cs,
            busy,
            busy_timeout,
        })
    }

    /// Perform hardware reset sequence
    pub fn reset(&mut self) {
        tracing::debug!("Performing hardware reset");

        self.rst.set_high();
        thread::sleep(RESET_SETTLE);

        self.rst.set_low();
        thread::sleep(RESET_SETTLE);

        self.rst.set_high();
        thread::sleep(RESET_SETTLE);
    }

    /// Wait for the controller to release BUSY, bounded by the configured timeout
    pub fn wait_idle(&self) -> Result<(), GpioError> {
        self.wait_idle_timeout(self.busy_timeout)
    }

    /// Wait for the controller with a custom timeout
    ///
    /// The controller holds BUSY HIGH while it works. The first sample is
    /// taken only after one poll interval, because BUSY rises a little after
    /// the command that started the operation.
    pub fn wait_idle_timeout(&self, timeout: Duration) -> Result<(), GpioError> {
        tracing::debug!("e-Paper busy");
        let start = Instant::now();

        thread::sleep(BUSY_POLL_INTERVAL);
        while self.busy.read() == Level::High {
            if start.elapsed() > timeout {
                tracing::warn!("BUSY still asserted after {:?}", timeout);
                return Err(GpioError::BusyTimeout(timeout.as_millis() as u64));
            }
            thread::sleep(BUSY_POLL_INTERVAL);
        }

        tracing::debug!("e-Paper busy release after {:?}", start.elapsed());
        thread::sleep(BUSY_POLL_INTERVAL);

        Ok(())
    }

    /// Set DC pin low (command mode)
    #[inline]
    pub fn dc_low(&mut self) {
        self.dc.set_low();
    }

    /// Set DC pin high (data mode)
    #[inline]
    pub fn dc_high(&mut self) {
        self.dc.set_high();
    }

    /// Assert chip select (active low)
    #[inline]
    pub fn cs_assert(&mut self) {
        self.cs.set_low();
    }

    /// Deassert chip select
    #[inline]
    pub fn cs_release(&mut self) {
        self.cs.set_high();
    }
}

impl Drop for GpioController {
    fn drop(&mut self) {
        // Leave the bus deselected
        self.cs.set_high();
        tracing::debug!("GPIO controller dropped, chip select released");
    }
}
