//! SO-100 servo bus driver
//!
//! The SO-100 follower arm chains six Feetech STS3215 servos on one
//! half-duplex serial line. [`FeetechBus`] implements [`MotorBus`] on top of
//! it, one register transaction per call.
//!
//! # Example
//!
//! ```no_run
//! use so100_core::hardware::{FeetechBus, FeetechConfig, Joint, MotorBus, Register};
//!
//! let mut bus = FeetechBus::new(FeetechConfig::new("/dev/ttyACM0"));
//! bus.connect()?;
//!
//! let pan = bus.read(Register::PresentPosition, Joint::ShoulderPan)?;
//! bus.write(Register::GoalPosition, pan.position() + 100.0, Joint::ShoulderPan)?;
//!
//! bus.disconnect()?;
//! # Ok::<(), so100_core::Error>(())
//! ```

mod config;
mod protocol;

pub use config::FeetechConfig;
pub use protocol::{FeetechProtocol, Instruction, BROADCAST_ID};

use std::io::{Read, Write};

use serialport::SerialPort;

use super::{Joint, MotorBus, Reading, Register};
use crate::{Error, Result};

/// Highest raw position of an STS3215 (12-bit encoder)
pub const MAX_POSITION: u16 = 4095;

/// Opens the serial stream on connect
type Opener<S> = fn(&FeetechConfig) -> Result<S>;

/// Feetech servo bus over a serial port
pub struct FeetechBus<S = Box<dyn SerialPort>> {
    config: FeetechConfig,
    protocol: Option<FeetechProtocol<S>>,
    open: Opener<S>,
}

impl FeetechBus {
    /// Create a disconnected bus; the port is opened by [`MotorBus::connect`]
    pub fn new(config: FeetechConfig) -> Self {
        Self {
            config,
            protocol: None,
            open: open_serial,
        }
    }
}

fn open_serial(config: &FeetechConfig) -> Result<Box<dyn SerialPort>> {
    serialport::new(&config.port, config.baudrate)
        .timeout(config.timeout)
        .open()
        .map_err(|e| Error::Connection(format!("Failed to open port {}: {}", config.port, e)))
}

impl<S> FeetechBus<S>
where
    S: Read + Write,
{
    /// Get the configuration
    pub fn config(&self) -> &FeetechConfig {
        &self.config
    }

    /// Adopt an already-open serial stream and run the connect handshake
    ///
    /// Once disconnected, such a bus cannot be reconnected.
    pub fn with_stream(config: FeetechConfig, stream: S) -> Result<Self> {
        config.validate()?;
        let mut bus = Self {
            protocol: Some(FeetechProtocol::new(stream, config.timeout)),
            config,
            open: |config| {
                Err(Error::Connection(format!(
                    "Stream for {} was closed and cannot be reopened",
                    config.port
                )))
            },
        };
        bus.handshake()?;
        Ok(bus)
    }

    fn protocol(&mut self) -> Result<&mut FeetechProtocol<S>> {
        self.protocol
            .as_mut()
            .ok_or_else(|| Error::InvalidState(format!("{} is not connected", self.config.port)))
    }

    /// Ping every servo and apply the torque setting
    fn handshake(&mut self) -> Result<()> {
        let ids = self.config.servo_ids;
        let torque = self.config.torque_on_connect;
        let proto = self.protocol()?;

        for (joint, id) in Joint::ALL.into_iter().zip(ids) {
            if !proto.ping(id) {
                tracing::warn!("Servo {} ({}) did not respond to ping", id, joint);
            }
        }

        if torque {
            for (joint, id) in Joint::ALL.into_iter().zip(ids) {
                proto
                    .write_register(id, Register::TorqueEnable.address(), &[1])
                    .map_err(|e| {
                        Error::Connection(format!("Failed to enable torque on {}: {}", joint, e))
                    })?;
            }
        }
        Ok(())
    }
}

impl<S> MotorBus for FeetechBus<S>
where
    S: Read + Write,
{
    fn connect(&mut self) -> Result<()> {
        if self.protocol.is_some() {
            return Ok(());
        }
        self.config.validate()?;

        tracing::info!(
            "Connecting to SO-100 on {} at {} baud",
            self.config.port,
            self.config.baudrate
        );
        let stream = (self.open)(&self.config)?;
        self.protocol = Some(FeetechProtocol::new(stream, self.config.timeout));

        if let Err(e) = self.handshake() {
            self.protocol = None;
            return Err(e);
        }

        tracing::info!("SO-100 connected successfully");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if let Some(proto) = self.protocol.take() {
            tracing::info!("Disconnecting from SO-100");
            let mut stream = proto.into_inner();
            stream
                .flush()
                .map_err(|e| Error::Connection(format!("Failed to flush port: {}", e)))?;
            tracing::info!("SO-100 disconnected");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.protocol.is_some()
    }

    fn read(&mut self, register: Register, joint: Joint) -> Result<Reading> {
        let id = self.config.servo_id(joint);
        let data = self
            .protocol()?
            .read_register(id, register.address(), register.width())?;

        let raw = match data.as_slice() {
            [low, high] => u16::from_le_bytes([*low, *high]),
            [value] => u16::from(*value),
            _ => return Ok(Reading::Empty),
        };
        tracing::debug!("{} {} = {}", joint, register, raw);
        Ok(Reading::Value(f64::from(raw)))
    }

    fn write(&mut self, register: Register, value: f64, joint: Joint) -> Result<()> {
        if !register.is_writable() {
            return Err(Error::InvalidState(format!("{} is read-only", register)));
        }
        let id = self.config.servo_id(joint);
        let raw = to_raw(register, value)?;
        tracing::debug!("{} {} <- {}", joint, register, raw);

        let bytes = raw.to_le_bytes();
        let data = &bytes[..register.width() as usize];
        self.protocol()?.write_register(id, register.address(), data)
    }
}

/// Convert a register value to its raw wire form
///
/// Positions are rounded and clamped to the encoder range; the servo would
/// reject anything outside it.
fn to_raw(register: Register, value: f64) -> Result<u16> {
    if !value.is_finite() {
        return Err(Error::Hardware(format!(
            "Cannot write non-finite value {} to {}",
            value, register
        )));
    }
    let max = match register.width() {
        1 => f64::from(u8::MAX),
        _ => f64::from(MAX_POSITION),
    };
    Ok(value.round().clamp(0.0, max) as u16)
}
