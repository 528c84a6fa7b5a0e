//! Feetech bus configuration

use std::time::Duration;

use crate::hardware::{Joint, NUM_JOINTS};
use crate::{Error, Result};

/// Configuration for connecting to the SO-100 servo bus
#[derive(Debug, Clone)]
pub struct FeetechConfig {
    /// Serial port path (e.g., "/dev/ttyACM0")
    pub port: String,
    /// Baud rate (default: 1,000,000)
    pub baudrate: u32,
    /// Per-packet response timeout
    pub timeout: Duration,
    /// Servo id of each joint, in joint order
    pub servo_ids: [u8; NUM_JOINTS],
    /// Enable torque on every servo after connecting
    pub torque_on_connect: bool,
}

impl FeetechConfig {
    /// Default baud rate for the STS3215 (1 Mbps)
    pub const DEFAULT_BAUDRATE: u32 = 1_000_000;

    /// Default response timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(100);

    /// Factory servo ids for the SO-100 (1-indexed, base to gripper)
    pub const DEFAULT_SERVO_IDS: [u8; NUM_JOINTS] = [1, 2, 3, 4, 5, 6];

    /// Create a configuration for the given port with default settings
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baudrate: Self::DEFAULT_BAUDRATE,
            timeout: Self::DEFAULT_TIMEOUT,
            servo_ids: Self::DEFAULT_SERVO_IDS,
            torque_on_connect: true,
        }
    }

    /// Set the baud rate
    pub fn with_baudrate(mut self, baudrate: u32) -> Self {
        self.baudrate = baudrate;
        self
    }

    /// Set the response timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the servo id map
    pub fn with_servo_ids(mut self, servo_ids: [u8; NUM_JOINTS]) -> Self {
        self.servo_ids = servo_ids;
        self
    }

    /// Choose whether torque is enabled on connect
    pub fn with_torque_on_connect(mut self, enabled: bool) -> Self {
        self.torque_on_connect = enabled;
        self
    }

    /// Servo id for a joint
    #[inline]
    pub fn servo_id(&self, joint: Joint) -> u8 {
        self.servo_ids[joint.index()]
    }

    /// Check the configuration before opening the port
    pub fn validate(&self) -> Result<()> {
        if self.port.trim().is_empty() {
            return Err(Error::Config("Serial port path is empty".into()));
        }
        if self.baudrate == 0 {
            return Err(Error::Config("Baud rate must be positive".into()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Config("Timeout must be positive".into()));
        }
        for (i, &id) in self.servo_ids.iter().enumerate() {
            if id >= super::protocol::BROADCAST_ID {
                return Err(Error::Config(format!(
                    "Servo id {} for {} is reserved",
                    id,
                    Joint::ALL[i]
                )));
            }
            if self.servo_ids[..i].contains(&id) {
                return Err(Error::Config(format!("Servo id {} is used twice", id)));
            }
        }
        Ok(())
    }
}

impl Default for FeetechConfig {
    fn default() -> Self {
        Self::new("/dev/ttyACM0")
    }
}
