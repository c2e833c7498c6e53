//! Configuration management for the badge.
//!
//! Loads the badge owner's identity and the display wiring from the JSON file
//! written by the badge upload tool.

use crate::display::BusConfig;
use crate::display::gpio::Pins;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Party number as entered in the upload tool, either a number or free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PartyNumber {
    Number(i64),
    Text(String),
}

impl fmt::Display for PartyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartyNumber::Number(n) => write!(f, "{}", n),
            PartyNumber::Text(s) => f.write_str(s),
        }
    }
}

/// Display wiring and timing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareConfig {
    /// GPIO pins (BCM numbering)
    pub pins: Pins,
    /// SPI clock in Hz
    pub spi_clock_hz: u32,
    /// Longest wait for the BUSY line before giving up, in milliseconds
    pub busy_timeout_ms: u64,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        let bus = BusConfig::default();
        Self {
            pins: bus.pins,
            spi_clock_hz: bus.spi_clock_hz,
            busy_timeout_ms: bus.busy_timeout.as_millis() as u64,
        }
    }
}

impl HardwareConfig {
    /// Validate wiring values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let pins = self.pins.as_array();
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ConfigError::ValidationError(format!(
                    "GPIO {} is assigned to more than one display line",
                    pin
                )));
            }
        }

        if self.spi_clock_hz == 0 {
            return Err(ConfigError::ValidationError(
                "spi_clock_hz must be greater than 0".to_string(),
            ));
        }

        if self.busy_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "busy_timeout_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Transport settings for [`crate::display::HardwareBus`]
    pub fn bus_config(&self) -> BusConfig {
        BusConfig {
            pins: self.pins,
            spi_clock_hz: self.spi_clock_hz,
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}

/// Application configuration
///
/// Identity fields use the camelCase keys of the upload tool; any of them may
/// be missing, in which case the badge shows the "Configuration Missing"
/// screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub user_name: Option<String>,

    #[serde(default)]
    pub user_pronouns: Option<String>,

    #[serde(default)]
    pub user_handle: Option<String>,

    #[serde(default)]
    pub party_number: Option<PartyNumber>,

    /// Scale of the name line
    #[serde(default)]
    pub name_scale: Option<u32>,

    /// Staff badges show "Staff" instead of a party number
    #[serde(default)]
    pub is_staff: Option<bool>,

    #[serde(default)]
    pub hardware: HardwareConfig,
}

/// Fully configured badge owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeIdentity {
    pub name: String,
    pub pronouns: String,
    pub handle: String,
    pub party: PartyNumber,
    pub name_scale: u32,
    pub is_staff: bool,
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, or fall back to an unconfigured badge
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Config error ({}): {}", path.display(), e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.hardware.validate()
    }

    /// The badge owner, if every identity field is present
    ///
    /// `isStaff` is optional and defaults to false.
    pub fn identity(&self) -> Option<BadgeIdentity> {
        Some(BadgeIdentity {
            name: self.user_name.clone()?,
            pronouns: self.user_pronouns.clone()?,
            handle: self.user_handle.clone()?,
            party: self.party_number.clone()?,
            name_scale: self.name_scale?,
            is_staff: self.is_staff.unwrap_or(false),
        })
    }
}
