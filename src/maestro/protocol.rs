//! # Maestro Protocol Constants and Types
//!
//! Core definitions for the Pololu Maestro serial command set.
//!
//! Two framings are supported:
//!
//! - **Compact**: `command, channel, data...` (command byte has the MSB set)
//! - **Pololu**: `0xAA, device_number, command & 0x7F, channel, data...`
//!
//! The Pololu framing addresses one Maestro on a shared serial line by its
//! device number.

use crate::error::{DriveError, Result};

/// Set Target command byte
pub const CMD_SET_TARGET: u8 = 0x84;

/// Set Speed command byte
pub const CMD_SET_SPEED: u8 = 0x87;

/// Set Acceleration command byte
pub const CMD_SET_ACCELERATION: u8 = 0x89;

/// Pololu protocol start byte
pub const POLOLU_START_BYTE: u8 = 0xAA;

/// Factory default device number
pub const DEFAULT_DEVICE_NUMBER: u8 = 12;

/// Highest device number representable in the Pololu protocol
pub const MAX_DEVICE_NUMBER: u8 = 0x7F;

/// Channel count of the largest Maestro (Mini Maestro 24)
pub const MAESTRO_MAX_CHANNELS: u8 = 24;

/// Data values are sent as two 7-bit bytes
pub const MAESTRO_VALUE_MAX: u16 = 0x3FFF;

/// Maestro acceleration setting range (0 = unlimited)
pub const MAESTRO_ACCEL_MAX: u16 = 255;

/// Serial framing used when talking to the Maestro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaestroProtocol {
    /// Compact protocol, single device on the line
    #[default]
    Compact,
    /// Pololu protocol, addresses a device number
    Pololu { device_number: u8 },
}

impl MaestroProtocol {
    /// Select the protocol from an optional device number
    ///
    /// `None` selects the compact protocol.
    ///
    /// # Errors
    ///
    /// Returns `Protocol` if the device number exceeds 127
    pub fn from_device_number(device_number: Option<u8>) -> Result<Self> {
        match device_number {
            None => Ok(Self::Compact),
            Some(n) if n <= MAX_DEVICE_NUMBER => Ok(Self::Pololu { device_number: n }),
            Some(n) => Err(DriveError::Protocol(format!(
                "device number {} exceeds maximum {}",
                n, MAX_DEVICE_NUMBER
            ))),
        }
    }
}

/// A single Maestro command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaestroCommand {
    /// Pulse width target in quarter-microseconds
    SetTarget { channel: u8, value: u16 },
    /// Speed limit in 0.25us / 10ms units (0 = unlimited)
    SetSpeed { channel: u8, value: u16 },
    /// Acceleration limit in 0.25us / 10ms / 80ms units (0 = unlimited)
    SetAcceleration { channel: u8, value: u16 },
}

impl MaestroCommand {
    /// Compact-protocol command byte
    #[must_use]
    pub fn command_byte(&self) -> u8 {
        match self {
            Self::SetTarget { .. } => CMD_SET_TARGET,
            Self::SetSpeed { .. } => CMD_SET_SPEED,
            Self::SetAcceleration { .. } => CMD_SET_ACCELERATION,
        }
    }

    /// Target channel
    #[must_use]
    pub fn channel(&self) -> u8 {
        match *self {
            Self::SetTarget { channel, .. }
            | Self::SetSpeed { channel, .. }
            | Self::SetAcceleration { channel, .. } => channel,
        }
    }

    /// Data value
    #[must_use]
    pub fn value(&self) -> u16 {
        match *self {
            Self::SetTarget { value, .. }
            | Self::SetSpeed { value, .. }
            | Self::SetAcceleration { value, .. } => value,
        }
    }

    /// Check channel and value fit the wire format
    ///
    /// # Errors
    ///
    /// Returns `Protocol` if the channel is not below 24 or the value exceeds
    /// 14 bits
    pub fn validate(&self) -> Result<()> {
        if self.channel() >= MAESTRO_MAX_CHANNELS {
            return Err(DriveError::Protocol(format!(
                "channel {} out of range (must be 0-{})",
                self.channel(),
                MAESTRO_MAX_CHANNELS - 1
            )));
        }

        if self.value() > MAESTRO_VALUE_MAX {
            return Err(DriveError::Protocol(format!(
                "value {} exceeds 14-bit maximum {}",
                self.value(),
                MAESTRO_VALUE_MAX
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_constants() {
        assert_eq!(CMD_SET_TARGET, 0x84);
        assert_eq!(CMD_SET_SPEED, 0x87);
        assert_eq!(CMD_SET_ACCELERATION, 0x89);
        assert_eq!(POLOLU_START_BYTE, 0xAA);
    }

    #[test]
    fn test_protocol_from_device_number() {
        assert_eq!(MaestroProtocol::from_device_number(None).unwrap(), MaestroProtocol::Compact);
        assert_eq!(
            MaestroProtocol::from_device_number(Some(12)).unwrap(),
            MaestroProtocol::Pololu { device_number: 12 }
        );
        assert!(MaestroProtocol::from_device_number(Some(128)).is_err());
    }

    #[test]
    fn test_command_accessors() {
        let cmd = MaestroCommand::SetSpeed { channel: 2, value: 60 };
        assert_eq!(cmd.command_byte(), CMD_SET_SPEED);
        assert_eq!(cmd.channel(), 2);
        assert_eq!(cmd.value(), 60);
    }

    #[test]
    fn test_validate_channel_range() {
        assert!(MaestroCommand::SetTarget { channel: 23, value: 6000 }.validate().is_ok());
        assert!(MaestroCommand::SetTarget { channel: 24, value: 6000 }.validate().is_err());
    }

    #[test]
    fn test_validate_value_range() {
        let widest = MaestroCommand::SetTarget { channel: 0, value: MAESTRO_VALUE_MAX };
        let too_wide = MaestroCommand::SetTarget { channel: 0, value: MAESTRO_VALUE_MAX + 1 };
        assert!(widest.validate().is_ok());
        assert!(too_wide.validate().is_err());
    }
}
