//! Trait abstraction over the motor controller to enable testing

use crate::error::Result;

/// Addressable output on the motor controller
pub type ChannelId = u8;

/// Motor controller operations consumed by the drive core
///
/// Values are in the controller's native units (quarter-microseconds for
/// targets on a Maestro).
#[cfg_attr(test, mockall::automock)]
pub trait MotorDriver: Send {
    /// Set the pulse-width target of a channel
    fn set_target(&mut self, channel: ChannelId, value: u16) -> Result<()>;

    /// Set the acceleration limit of a channel (0 = unlimited)
    fn set_accel(&mut self, channel: ChannelId, value: u16) -> Result<()>;

    /// Set the speed ramp limit of a channel (0 = unlimited)
    fn set_speed(&mut self, channel: ChannelId, value: u16) -> Result<()>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use crate::error::DriveError;
    use std::collections::HashSet;

    /// A call recorded by [`RecordingDriver`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DriverCall {
        Target(ChannelId, u16),
        Accel(ChannelId, u16),
        Speed(ChannelId, u16),
    }

    /// Driver that records every call and can fail writes on chosen channels
    #[derive(Debug, Default)]
    pub struct RecordingDriver {
        pub calls: Vec<DriverCall>,
        pub failing_channels: HashSet<ChannelId>,
    }

    impl RecordingDriver {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_on(channel: ChannelId) -> Self {
            let mut driver = Self::new();
            driver.failing_channels.insert(channel);
            driver
        }

        /// Target writes only, in order
        pub fn targets(&self) -> Vec<(ChannelId, u16)> {
            self.calls
                .iter()
                .filter_map(|call| match *call {
                    DriverCall::Target(ch, v) => Some((ch, v)),
                    _ => None,
                })
                .collect()
        }

        /// Most recent target written to a channel
        pub fn last_target(&self, channel: ChannelId) -> Option<u16> {
            self.targets()
                .into_iter()
                .rev()
                .find(|(ch, _)| *ch == channel)
                .map(|(_, v)| v)
        }

        fn record(&mut self, channel: ChannelId, call: DriverCall) -> Result<()> {
            self.calls.push(call);
            if self.failing_channels.contains(&channel) {
                return Err(DriveError::DriverWrite {
                    channel,
                    reason: "mock write failure".to_string(),
                });
            }
            Ok(())
        }
    }

    impl MotorDriver for RecordingDriver {
        fn set_target(&mut self, channel: ChannelId, value: u16) -> Result<()> {
            self.record(channel, DriverCall::Target(channel, value))
        }

        fn set_accel(&mut self, channel: ChannelId, value: u16) -> Result<()> {
            self.record(channel, DriverCall::Accel(channel, value))
        }

        fn set_speed(&mut self, channel: ChannelId, value: u16) -> Result<()> {
            self.record(channel, DriverCall::Speed(channel, value))
        }
    }
}
