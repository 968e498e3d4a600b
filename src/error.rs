//! # Error Types
//!
//! Custom error types for TiltStick using `thiserror`.

use thiserror::Error;

/// Main error type for TiltStick
#[derive(Debug, Error)]
pub enum TiltStickError {
    /// No serial port could be opened at the configured path
    #[error("Serial port not found: {0}")]
    SerialPortNotFound(String),

    /// Serial port errors (open or read failures)
    #[error("Serial error: {0}")]
    Serial(String),

    /// Virtual gamepad errors (uinput creation or emit failures)
    #[error("Gamepad error: {0}")]
    Gamepad(String),

    /// Calibration requested before any orientation sample arrived
    #[error("Cannot calibrate: no orientation sample received yet")]
    CalibrationUnavailable,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TiltStick
pub type Result<T> = std::result::Result<T, TiltStickError>;
