//! Waveshare 2.66" e-Paper (SSD1680-class controller) driver.
//!
//! Black/white panel, 152 x 296 pixels, 1 bit per pixel (8 pixels per byte).
//! RAM is written row-major with 19 bytes per row; the X address window is
//! byte-granular, so the low three bits of every X coordinate are dropped.
//!
//! Based on the vendor MicroPython driver for the RP2040 badge board.

use super::bus::{BusError, DisplayBus};
use super::lut::WaveformLut;
use thiserror::Error;

/// Display dimensions
pub const WIDTH: u16 = 152;
pub const HEIGHT: u16 = 296;

/// EPD commands
pub mod cmd {
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const DISPLAY_UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_RAM: u8 = 0x24;
    pub const WRITE_LUT: u8 = 0x32;
    pub const DISPLAY_OPTION: u8 = 0x37;
    pub const BORDER_WAVEFORM: u8 = 0x3C;
    pub const SET_RAM_X_WINDOW: u8 = 0x44;
    pub const SET_RAM_Y_WINDOW: u8 = 0x45;
    pub const SET_RAM_X_COUNTER: u8 = 0x4E;
    pub const SET_RAM_Y_COUNTER: u8 = 0x4F;
}

/// X increment, Y increment
const DATA_ENTRY_XY_INC: u8 = 0x03;
/// Window X start; the first byte column is not wired to the glass
const WINDOW_X_START: u16 = 8;
const BORDER_FULL: u8 = 0x01;
const BORDER_PARTIAL: u8 = 0x80;
const UPDATE_SEQUENCE_PARTIAL: u8 = 0xCF;
/// Register 0x37 payload enabling the partial-refresh ping-pong mode
const DISPLAY_OPTIONS_PARTIAL: [u8; 10] = [0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x00, 0x00];
const DEEP_SLEEP_MODE_1: u8 = 0x01;

/// Refresh mode selected by [`Epd2in66::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Full refresh with the controller's built-in waveform
    Full,
    /// Partial refresh driven by the uploaded waveform table
    Partial,
}

impl RefreshMode {
    /// Decode the numeric mode used by the vendor driver (0 = full, 1 = partial)
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RefreshMode::Full),
            1 => Some(RefreshMode::Partial),
            _ => None,
        }
    }
}

/// Controller state as tracked by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Idle(RefreshMode),
    /// A refresh was started and has not been seen to finish
    Refreshing,
    /// Deep sleep; only `init` may follow
    Sleeping,
}

/// Display driver errors
#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),

    #[error("Display not initialized")]
    NotInitialized,

    #[error("Display is in deep sleep, re-initialize first")]
    Asleep,

    #[error("Previous refresh did not complete, re-initialize first")]
    RefreshIncomplete,

    #[error("Invalid buffer size: expected {expected}, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },
}

/// Number of bytes per RAM row for a panel `width` pixels wide
pub fn row_bytes(width: u16) -> usize {
    (width as usize).div_ceil(8)
}

/// Reorder a landscape (vertically packed) buffer into the controller's native row-major order
///
/// `width_bytes` is the number of bytes per native row and `height` the number
/// of native rows. Byte `i` of native row `j` comes from
/// `buffer[(width_bytes - 1 - i) * height + j]`, i.e. landscape pages are read
/// in reverse.
pub fn landscape_to_native(buffer: &[u8], width_bytes: usize, height: usize) -> Vec<u8> {
    let mut native = Vec::with_capacity(width_bytes * height);
    for j in 0..height {
        for i in 0..width_bytes {
            native.push(buffer[(width_bytes - 1 - i) * height + j]);
        }
    }
    native
}

/// EPD 2.66" display driver
pub struct Epd2in66<B: DisplayBus> {
    bus: B,
    lut: WaveformLut,
    width: u16,
    height: u16,
    state: ControllerState,
}

impl<B: DisplayBus> Epd2in66<B> {
    /// Create a driver for the stock 152 x 296 panel; the controller is not touched yet
    pub fn new(bus: B, lut: WaveformLut) -> Self {
        Self::with_dimensions(bus, lut, WIDTH, HEIGHT)
    }

    pub fn with_dimensions(bus: B, lut: WaveformLut, width: u16, height: u16) -> Self {
        Self {
            bus,
            lut,
            width,
            height,
            state: ControllerState::Uninitialized,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// The underlying transport
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Size in bytes of a full frame
    pub fn buffer_size(&self) -> usize {
        row_bytes(self.width) * self.height as usize
    }

    /// Reset and configure the controller for `mode`
    pub fn init(&mut self, mode: RefreshMode) -> Result<(), DisplayError> {
        tracing::info!(
            "Initializing EPD 2.66\" display ({}x{}, {:?} refresh)",
            self.width,
            self.height,
            mode
        );
        self.state = ControllerState::Uninitialized;

        self.bus.reset()?;

        self.send_command(cmd::SW_RESET)?;
        self.bus.wait_until_idle()?;

        self.send_command_data(cmd::DATA_ENTRY_MODE, &[DATA_ENTRY_XY_INC])?;
        self.write_window(WINDOW_X_START, 0, self.width, self.height)?;

        match mode {
            RefreshMode::Full => {
                self.send_command_data(cmd::BORDER_WAVEFORM, &[BORDER_FULL])?;
            }
            RefreshMode::Partial => {
                self.send_lut()?;
                self.send_command_data(cmd::DISPLAY_OPTION, &DISPLAY_OPTIONS_PARTIAL)?;
                self.send_command_data(cmd::BORDER_WAVEFORM, &[BORDER_PARTIAL])?;
                self.send_command_data(cmd::DISPLAY_UPDATE_CONTROL_2, &[UPDATE_SEQUENCE_PARTIAL])?;
                self.send_command(cmd::MASTER_ACTIVATION)?;
                self.bus.wait_until_idle()?;
            }
        }

        self.state = ControllerState::Idle(mode);
        tracing::info!("Display initialized successfully");
        Ok(())
    }

    /// Initialize from a numeric mode code
    ///
    /// Unknown codes are reported and ignored: nothing is sent and the state
    /// is left as it was.
    pub fn init_code(&mut self, code: u8) -> Result<(), DisplayError> {
        match RefreshMode::from_code(code) {
            Some(mode) => self.init(mode),
            None => {
                tracing::warn!("There is no such mode: {}", code);
                Ok(())
            }
        }
    }

    /// Set the RAM address window
    ///
    /// X positions are byte addresses on the controller, so `x_start` and
    /// `x_end` lose their low three bits.
    pub fn set_window(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
    ) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        self.write_window(x_start, y_start, x_end, y_end)
    }

    /// Set the RAM address counters
    pub fn set_cursor(&mut self, x: u16, y: u16) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        self.write_cursor(x, y)
    }

    /// Start a refresh and wait for it to finish
    pub fn turn_on_display(&mut self) -> Result<(), DisplayError> {
        let mode = self.ensure_ready()?;
        self.state = ControllerState::Refreshing;
        self.send_command(cmd::MASTER_ACTIVATION)?;
        self.bus.wait_until_idle()?;
        self.state = ControllerState::Idle(mode);
        Ok(())
    }

    /// Write a native row-major frame and refresh
    pub fn display(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        self.check_size(buffer.len())?;

        tracing::info!("Sending image data to display ({} bytes)", buffer.len());
        self.write_cursor(1, self.height.saturating_sub(1))?;
        self.send_command_data(cmd::WRITE_RAM, buffer)?;
        self.turn_on_display()?;

        tracing::info!("Display refresh complete");
        Ok(())
    }

    /// Write a landscape (vertically packed, rotated) frame and refresh
    pub fn display_landscape(&mut self, buffer: &[u8]) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        self.check_size(buffer.len())?;

        let native = landscape_to_native(buffer, row_bytes(self.width), self.height as usize);

        tracing::info!("Sending landscape frame to display ({} bytes)", native.len());
        self.write_cursor(1, self.height.saturating_sub(1))?;
        self.send_command_data(cmd::WRITE_RAM, &native)?;
        self.turn_on_display()?;

        tracing::info!("Display refresh complete");
        Ok(())
    }

    /// Fill the panel RAM with `color` and refresh
    pub fn clear(&mut self, color: u8) -> Result<(), DisplayError> {
        self.ensure_ready()?;

        let frame = vec![color; self.height as usize * (self.width as usize / 8)];

        tracing::info!("Clearing display to {:#04x}", color);
        self.send_command_data(cmd::WRITE_RAM, &frame)?;
        self.turn_on_display()
    }

    /// Put display into deep sleep mode
    pub fn sleep(&mut self) -> Result<(), DisplayError> {
        self.ensure_ready()?;
        tracing::info!("Putting display to sleep");

        self.send_command_data(cmd::DEEP_SLEEP, &[DEEP_SLEEP_MODE_1])?;
        self.state = ControllerState::Sleeping;
        Ok(())
    }

    /// Upload the waveform table, one byte per transaction
    fn send_lut(&mut self) -> Result<(), DisplayError> {
        self.send_command(cmd::WRITE_LUT)?;
        for &byte in self.lut.upload_bytes() {
            self.bus.send_data(&[byte])?;
        }
        self.bus.wait_until_idle()?;
        Ok(())
    }

    fn write_window(
        &mut self,
        x_start: u16,
        y_start: u16,
        x_end: u16,
        y_end: u16,
    ) -> Result<(), DisplayError> {
        self.send_command_data(
            cmd::SET_RAM_X_WINDOW,
            &[((x_start >> 3) & 0xFF) as u8, ((x_end >> 3) & 0xFF) as u8],
        )?;
        let [ys_lo, ys_hi] = y_start.to_le_bytes();
        let [ye_lo, ye_hi] = y_end.to_le_bytes();
        self.send_command_data(cmd::SET_RAM_Y_WINDOW, &[ys_lo, ys_hi, ye_lo, ye_hi])
    }

    fn write_cursor(&mut self, x: u16, y: u16) -> Result<(), DisplayError> {
        self.send_command_data(cmd::SET_RAM_X_COUNTER, &[(x & 0xFF) as u8])?;
        let [y_lo, y_hi] = y.to_le_bytes();
        self.send_command_data(cmd::SET_RAM_Y_COUNTER, &[y_lo, y_hi])
    }

    fn ensure_ready(&self) -> Result<RefreshMode, DisplayError> {
        match self.state {
            ControllerState::Idle(mode) => Ok(mode),
            ControllerState::Uninitialized => Err(DisplayError::NotInitialized),
            ControllerState::Refreshing => Err(DisplayError::RefreshIncomplete),
            ControllerState::Sleeping => Err(DisplayError::Asleep),
        }
    }

    fn check_size(&self, actual: usize) -> Result<(), DisplayError> {
        let expected = self.buffer_size();
        if actual != expected {
            tracing::warn!(
                "Buffer size mismatch: expected {} bytes for {}x{}, got {} bytes",
                expected,
                self.width,
                self.height,
                actual
            );
            return Err(DisplayError::InvalidBufferSize { expected, actual });
        }
        Ok(())
    }

    /// Send command to display
    fn send_command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.bus.send_command(cmd)?;
        Ok(())
    }

    /// Send command with data to display
    fn send_command_data(&mut self, cmd: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.bus.send_command(cmd)?;
        if !data.is_empty() {
            self.bus.send_data(data)?;
        }
        Ok(())
    }
}

impl<B: DisplayBus> Drop for Epd2in66<B> {
    fn drop(&mut self) {
        if matches!(self.state, ControllerState::Idle(_)) {
            let _ = self.sleep();
        }
    }
}
