//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! The configuration is read once at startup, validated, and never mutated
//! afterwards; validation failures are fatal before the session loop starts.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::mapping::MappingMode;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub mapping: MappingConfig,

    #[serde(default)]
    pub gamepad: GamepadConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SerialConfig {
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Bounded line-read timeout; one loop cycle never blocks longer.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Orientation-to-stick mapping configuration
#[derive(Debug, Deserialize, Clone)]
pub struct MappingConfig {
    /// Which angles drive the stick and how the baseline is captured.
    #[serde(default = "default_mode")]
    pub mode: MappingMode,

    /// Degrees of tilt away from neutral producing full stick deflection.
    #[serde(default = "default_max_angle_deg")]
    pub max_angle_deg: f64,
}

/// Virtual gamepad configuration
#[derive(Debug, Deserialize, Clone)]
pub struct GamepadConfig {
    #[serde(default = "default_device_name")]
    pub device_name: String,
}

// Default value functions
fn default_serial_port() -> String { "/dev/ttyUSB0".to_string() }
fn default_baud_rate() -> u32 { 115200 }
fn default_timeout_ms() -> u64 { 50 }

fn default_mode() -> MappingMode { MappingMode::RollPitch }
fn default_max_angle_deg() -> f64 { 45.0 }

fn default_device_name() -> String { "TiltStick Virtual Gamepad".to_string() }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            max_angle_deg: default_max_angle_deg(),
        }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            mapping: MappingConfig::default(),
            gamepad: GamepadConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// * `Result<Config>` - Loaded and validated configuration
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range.
    /// Called once at load; the session loop never sees an invalid config.
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(crate::error::TiltStickError::Config(
                toml::de::Error::custom("serial port cannot be empty")
            ));
        }

        if ![9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600]
            .contains(&self.serial.baud_rate)
        {
            return Err(crate::error::TiltStickError::Config(
                toml::de::Error::custom(
                    "baud_rate must be one of: 9600, 19200, 38400, 57600, 115200, 230400, 460800, 921600",
                )
            ));
        }

        if self.serial.timeout_ms == 0 || self.serial.timeout_ms > 10000 {
            return Err(crate::error::TiltStickError::Config(
                toml::de::Error::custom("timeout_ms must be between 1 and 10000")
            ));
        }

        // A non-positive limit would make the mapping divide by zero or flip sign
        if !self.mapping.max_angle_deg.is_finite() || self.mapping.max_angle_deg <= 0.0 {
            return Err(crate::error::TiltStickError::Config(
                toml::de::Error::custom("max_angle_deg must be a positive number")
            ));
        }

        if self.mapping.max_angle_deg > 180.0 {
            return Err(crate::error::TiltStickError::Config(
                toml::de::Error::custom("max_angle_deg must be at most 180")
            ));
        }

        if self.gamepad.device_name.is_empty() {
            return Err(crate::error::TiltStickError::Config(
                toml::de::Error::custom("gamepad device_name cannot be empty")
            ));
        }

        Ok(())
    }
}
