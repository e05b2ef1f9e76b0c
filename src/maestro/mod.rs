//! # Maestro Module
//!
//! Serial communication with a Pololu Maestro servo controller.
//!
//! This module handles:
//! - Opening the Maestro command port (USB virtual COM or TTL serial)
//! - Encoding compact and Pololu protocol commands
//! - Exposing the controller through the [`MotorDriver`] trait

pub mod driver;
pub mod encoder;
pub mod protocol;

use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::SerialConfig;
use crate::error::{DriveError, Result};
use driver::{ChannelId, MotorDriver};
use encoder::encode_command;
use protocol::{MaestroCommand, MaestroProtocol};

/// Default Maestro command port paths to try (in order of preference)
const DEFAULT_DEVICE_PATHS: &[&str] = &[
    "/dev/ttyACM0", // Maestro USB command port
    "/dev/ttyACM1",
];

/// Maestro Command Port Handler
///
/// Writes encoded commands to any `Write` sink; on hardware the sink is the
/// serial port opened by [`Maestro::open`].
pub struct Maestro<W: Write + Send> {
    /// Command port
    port: W,
    /// Wire framing
    protocol: MaestroProtocol,
    /// Device path (e.g., /dev/ttyACM0)
    device_path: String,
}

impl<W: Write + Send> std::fmt::Debug for Maestro<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Maestro")
            .field("device_path", &self.device_path)
            .field("protocol", &self.protocol)
            .finish_non_exhaustive()
    }
}

impl Maestro<Box<dyn tokio_serial::SerialPort>> {
    /// Open the Maestro described by the serial configuration
    ///
    /// An empty `port` auto-detects among the default command port paths.
    ///
    /// # Errors
    ///
    /// Returns error if the device number is invalid, or no port can be opened
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use maestro_drive::config::SerialConfig;
    /// use maestro_drive::maestro::Maestro;
    ///
    /// let maestro = Maestro::open(&SerialConfig::default())?;
    /// println!("Maestro at {}", maestro.device_path());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let protocol = MaestroProtocol::from_device_number(config.device_number)?;
        let timeout = Duration::from_millis(config.timeout_ms);

        if config.port.is_empty() {
            Self::open_with_paths(DEFAULT_DEVICE_PATHS, config.baud_rate, timeout, protocol)
        } else {
            Self::open_with_paths(&[config.port.as_str()], config.baud_rate, timeout, protocol)
        }
    }

    /// Open the first of `paths` that succeeds
    ///
    /// # Errors
    ///
    /// Returns `SerialPortNotFound` listing every path tried
    pub fn open_with_paths(
        paths: &[&str],
        baud_rate: u32,
        timeout: Duration,
        protocol: MaestroProtocol,
    ) -> Result<Self> {
        for path in paths {
            debug!("Trying to open Maestro command port: {}", path);

            match Self::open_port(path, baud_rate, timeout) {
                Ok(port) => {
                    info!("Opened Maestro at {} ({:?})", path, protocol);
                    return Ok(Self {
                        port,
                        protocol,
                        device_path: path.to_string(),
                    });
                }
                Err(e) => {
                    warn!("Failed to open {}: {}", path, e);
                }
            }
        }

        Err(DriveError::SerialPortNotFound(paths.join(", ")))
    }

    fn open_port(
        path: &str,
        baud_rate: u32,
        timeout: Duration,
    ) -> Result<Box<dyn tokio_serial::SerialPort>> {
        tokio_serial::new(path, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .timeout(timeout)
            .open()
            .map_err(|e| DriveError::Serial(format!("Failed to open {}: {}", path, e)))
    }
}

impl<W: Write + Send> Maestro<W> {
    /// Wrap an already open command port
    pub fn new(port: W, protocol: MaestroProtocol, device_path: impl Into<String>) -> Self {
        Self {
            port,
            protocol,
            device_path: device_path.into(),
        }
    }

    /// Path of the opened command port
    pub fn device_path(&self) -> &str {
        &self.device_path
    }

    /// Wire framing in use
    pub fn protocol(&self) -> MaestroProtocol {
        self.protocol
    }

    /// Encode and write one command
    ///
    /// # Errors
    ///
    /// - `Protocol` if the command does not fit the wire format
    /// - `DriverWrite` if the port rejects the write or flush
    pub fn send_command(&mut self, command: MaestroCommand) -> Result<()> {
        let frame = encode_command(self.protocol, &command)?;
        let channel = command.channel();

        self.port
            .write_all(&frame)
            .and_then(|_| self.port.flush())
            .map_err(|e| DriveError::DriverWrite {
                channel,
                reason: e.to_string(),
            })?;

        debug!("Sent {:?} ({} bytes)", command, frame.len());
        Ok(())
    }

    /// Consume the handle and return the port
    pub fn into_inner(self) -> W {
        self.port
    }
}

impl<W: Write + Send> MotorDriver for Maestro<W> {
    fn set_target(&mut self, channel: ChannelId, value: u16) -> Result<()> {
        self.send_command(MaestroCommand::SetTarget { channel, value })
    }

    fn set_accel(&mut self, channel: ChannelId, value: u16) -> Result<()> {
        self.send_command(MaestroCommand::SetAcceleration { channel, value })
    }

    fn set_speed(&mut self, channel: ChannelId, value: u16) -> Result<()> {
        self.send_command(MaestroCommand::SetSpeed { channel, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct BrokenPort;

    impl Write for BrokenPort {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "Mock write error"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_default_device_paths() {
        assert_eq!(DEFAULT_DEVICE_PATHS[0], "/dev/ttyACM0");
        assert_eq!(DEFAULT_DEVICE_PATHS.len(), 2);
    }

    #[test]
    fn test_set_target_writes_compact_frame() {
        let mut maestro = Maestro::new(Vec::new(), MaestroProtocol::Compact, "mem");
        maestro.set_target(0, 6000).unwrap();
        assert_eq!(maestro.into_inner(), vec![0x84, 0x00, 0x70, 0x2E]);
    }

    #[test]
    fn test_init_sequence_bytes() {
        let mut maestro = Maestro::new(Vec::new(), MaestroProtocol::Compact, "mem");
        maestro.set_accel(0, 0).unwrap();
        maestro.set_speed(0, 60).unwrap();
        assert_eq!(
            maestro.into_inner(),
            vec![0x89, 0x00, 0x00, 0x00, 0x87, 0x00, 60, 0x00]
        );
    }

    #[test]
    fn test_pololu_protocol_frames() {
        let protocol = MaestroProtocol::Pololu { device_number: 12 };
        let mut maestro = Maestro::new(Vec::new(), protocol, "mem");
        maestro.set_target(1, 6000).unwrap();
        assert_eq!(maestro.into_inner(), vec![0xAA, 12, 0x04, 0x01, 0x70, 0x2E]);
    }

    #[test]
    fn test_write_failure_maps_to_driver_write() {
        let mut maestro = Maestro::new(BrokenPort, MaestroProtocol::Compact, "broken");
        match maestro.set_target(3, 6000) {
            Err(DriveError::DriverWrite { channel, reason }) => {
                assert_eq!(channel, 3);
                assert!(reason.contains("Mock write error"));
            }
            other => panic!("Expected DriverWrite, got: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_channel_is_protocol_error() {
        let mut maestro = Maestro::new(Vec::new(), MaestroProtocol::Compact, "mem");
        assert!(matches!(maestro.set_target(40, 6000), Err(DriveError::Protocol(_))));
        assert!(maestro.into_inner().is_empty());
    }

    #[test]
    fn test_open_with_invalid_paths_returns_error() {
        let invalid_paths = &["/dev/nonexistent0", "/dev/nonexistent1"];
        let result = Maestro::open_with_paths(
            invalid_paths,
            9600,
            Duration::from_millis(100),
            MaestroProtocol::Compact,
        );

        match result {
            Err(DriveError::SerialPortNotFound(msg)) => {
                assert!(msg.contains("/dev/nonexistent0"));
                assert!(msg.contains("/dev/nonexistent1"));
            }
            other => panic!("Expected SerialPortNotFound error, got: {:?}", other),
        }
    }

    #[test]
    fn test_open_rejects_bad_device_number() {
        let config = SerialConfig {
            device_number: Some(200),
            ..SerialConfig::default()
        };
        assert!(matches!(Maestro::open(&config), Err(DriveError::Protocol(_))));
    }

    // Integration test - only runs with real hardware
    #[test]
    #[ignore]
    fn test_open_with_real_hardware() {
        let maestro = Maestro::open(&SerialConfig::default()).expect("Maestro not found");
        assert!(maestro.device_path().starts_with("/dev/tty"));
    }
}
