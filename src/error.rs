//! # Error Types
//!
//! Custom error types for Maestro Drive using `thiserror`.

use thiserror::Error;

/// Main error type for Maestro Drive
#[derive(Debug, Error)]
pub enum DriveError {
    /// Invalid calibration, channel ids or configuration values
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration file could not be parsed
    #[error("Config file error: {0}")]
    ConfigFile(#[from] toml::de::Error),

    /// Driver rejected the initial acceleration/speed setup
    #[error("Driver initialization failed: {0}")]
    Initialization(String),

    /// Actuator write failed
    #[error("Driver write failed on channel {channel}: {reason}")]
    DriverWrite { channel: u8, reason: String },

    /// Value or channel outside what the Maestro wire protocol can carry
    #[error("Maestro protocol error: {0}")]
    Protocol(String),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate serial ports could be opened
    #[error("No Maestro found (tried: {0})")]
    SerialPortNotFound(String),

    /// Gamepad errors
    #[error("Controller error: {0}")]
    Controller(String),

    /// No gamepad found under /dev/input
    #[error("No gamepad found")]
    ControllerNotFound,

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Maestro Drive
pub type Result<T> = std::result::Result<T, DriveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_write_message_names_channel() {
        let err = DriveError::DriverWrite {
            channel: 3,
            reason: "broken pipe".to_string(),
        };
        assert_eq!(err.to_string(), "Driver write failed on channel 3: broken pipe");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DriveError = io.into();
        assert!(matches!(err, DriveError::Io(_)));
    }
}
