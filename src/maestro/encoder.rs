//! # Maestro Command Encoder
//!
//! Encodes [`MaestroCommand`]s into serial frames.

use bytes::{BufMut, Bytes, BytesMut};

use super::protocol::*;
use crate::error::Result;

/// Encode a command into a complete frame
///
/// # Arguments
///
/// * `protocol` - Framing to use (compact or Pololu)
/// * `command` - Command to encode
///
/// # Returns
///
/// * `Result<Bytes>` - 4-byte compact frame or 6-byte Pololu frame
///
/// # Errors
///
/// Returns `Protocol` if the channel or value does not fit the wire format
///
/// # Examples
///
/// ```
/// use maestro_drive::maestro::encoder::encode_command;
/// use maestro_drive::maestro::protocol::{MaestroCommand, MaestroProtocol};
///
/// let cmd = MaestroCommand::SetTarget { channel: 0, value: 6000 };
/// let frame = encode_command(MaestroProtocol::Compact, &cmd).unwrap();
/// assert_eq!(&frame[..], &[0x84, 0x00, 0x70, 0x2E]);
/// ```
pub fn encode_command(protocol: MaestroProtocol, command: &MaestroCommand) -> Result<Bytes> {
    command.validate()?;

    let mut frame = BytesMut::with_capacity(6);

    match protocol {
        MaestroProtocol::Compact => {
            frame.put_u8(command.command_byte());
        }
        MaestroProtocol::Pololu { device_number } => {
            frame.put_u8(POLOLU_START_BYTE);
            frame.put_u8(device_number & 0x7F);
            // Pololu framing drops the command MSB
            frame.put_u8(command.command_byte() & 0x7F);
        }
    }

    frame.put_u8(command.channel());
    let (low, high) = split_value(command.value());
    frame.put_u8(low);
    frame.put_u8(high);

    Ok(frame.freeze())
}

/// Split a 14-bit value into its low and high 7-bit bytes
///
/// # Examples
///
/// ```
/// use maestro_drive::maestro::encoder::split_value;
///
/// // 6000 = 0b101110_1110000
/// assert_eq!(split_value(6000), (0x70, 0x2E));
/// ```
#[must_use]
pub fn split_value(value: u16) -> (u8, u8) {
    let value = value.min(MAESTRO_VALUE_MAX);
    ((value & 0x7F) as u8, ((value >> 7) & 0x7F) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_set_target_frame() {
        let cmd = MaestroCommand::SetTarget { channel: 1, value: 8000 };
        let frame = encode_command(MaestroProtocol::Compact, &cmd).unwrap();

        // 8000 = 62 * 128 + 64
        assert_eq!(&frame[..], &[CMD_SET_TARGET, 0x01, 0x40, 0x3E]);
    }

    #[test]
    fn test_compact_set_speed_frame() {
        let cmd = MaestroCommand::SetSpeed { channel: 0, value: 60 };
        let frame = encode_command(MaestroProtocol::Compact, &cmd).unwrap();
        assert_eq!(&frame[..], &[CMD_SET_SPEED, 0x00, 60, 0x00]);
    }

    #[test]
    fn test_compact_set_acceleration_unlimited() {
        let cmd = MaestroCommand::SetAcceleration { channel: 5, value: 0 };
        let frame = encode_command(MaestroProtocol::Compact, &cmd).unwrap();
        assert_eq!(&frame[..], &[CMD_SET_ACCELERATION, 0x05, 0x00, 0x00]);
    }

    #[test]
    fn test_pololu_frame_structure() {
        let cmd = MaestroCommand::SetTarget { channel: 0, value: 4000 };
        let protocol = MaestroProtocol::Pololu { device_number: DEFAULT_DEVICE_NUMBER };
        let frame = encode_command(protocol, &cmd).unwrap();

        // 4000 = 31 * 128 + 32
        assert_eq!(frame.len(), 6);
        assert_eq!(&frame[..], &[POLOLU_START_BYTE, 12, 0x04, 0x00, 0x20, 0x1F]);
    }

    #[test]
    fn test_data_bytes_have_msb_clear() {
        for value in [0, 1, 127, 128, 6000, 8000, MAESTRO_VALUE_MAX] {
            let (low, high) = split_value(value);
            assert_eq!(low & 0x80, 0);
            assert_eq!(high & 0x80, 0);
            assert_eq!(u16::from(low) | (u16::from(high) << 7), value);
        }
    }

    #[test]
    fn test_split_value_clamps() {
        assert_eq!(split_value(u16::MAX), split_value(MAESTRO_VALUE_MAX));
    }

    #[test]
    fn test_encode_rejects_out_of_range_channel() {
        let cmd = MaestroCommand::SetTarget { channel: 30, value: 6000 };
        assert!(encode_command(MaestroProtocol::Compact, &cmd).is_err());
    }

    #[test]
    fn test_encode_rejects_wide_value() {
        let cmd = MaestroCommand::SetSpeed { channel: 0, value: 0x4000 };
        assert!(encode_command(MaestroProtocol::Compact, &cmd).is_err());
    }
}
