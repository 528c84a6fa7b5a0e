//! so100-core: direct joint control for the SO-100 follower arm
//!
//! A small teleoperation console that drives a six-joint arm one joint at a
//! time, talking to the servos through a [`MotorBus`] adapter.
//!
//! # Modules
//!
//! - [`hardware`] - Joint model, register model, bus contract, Feetech and mock adapters
//! - [`console`] - Command parsing, console state, dispatcher and session loop
//!
//! # Architecture
//!
//! ```text
//!  operator                Console                   MotorBus
//! ┌────────┐  line   ┌──────────────────┐  write   ┌──────────────┐
//! │ stdin  │────────►│ Command::parse   │─────────►│ FeetechBus / │
//! │ Ctrl+C │         │ ConsoleState     │◄─────────│ MockBus      │
//! └────────┘         └──────────────────┘  read    └──────────────┘
//! ```
//!
//! The console is single-threaded. The only helper thread pumps stdin lines
//! into a channel so an interrupt can be observed while waiting for input.

#![warn(unused_must_use)]

pub mod console;
pub mod hardware;

pub use console::{
    BusGuard, Command, Console, ConsoleConfig, ConsoleState, Flow, Input, OperatorInput,
    ParseError, StepSize,
};
pub use hardware::{
    FeetechBus, FeetechConfig, Joint, JointPositions, MockBus, MotorBus, Reading, Register,
    NUM_JOINTS,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for so100-core
///
/// Bus operations return these so the console can report a failed joint and
/// carry on. Use `?` to propagate, or match to handle a specific case.
///
/// # Example
/// ```ignore
/// match bus.read(Register::PresentPosition, Joint::Gripper) {
///     Ok(reading) => println!("gripper: {}", reading.position()),
///     Err(Error::Timeout(msg)) => eprintln!("Servo did not answer: {}", msg),
///     Err(e) => return Err(e),
/// }
/// ```
#[derive(Debug, thiserror::Error)]
#[must_use = "errors must be handled or explicitly ignored with let _ = ..."]
#[non_exhaustive]
pub enum Error {
    /// Failed to open or keep the connection to the servo bus.
    /// Handle by: checking the port path, cabling and power supply.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Servo-level error: bad status packet, error byte set, checksum mismatch.
    /// Handle by: re-reading the joint, checking servo temperature and load.
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// Invalid configuration parameter.
    /// Handle by: validating config before use, checking parameter ranges.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A servo did not answer within the configured timeout.
    /// Handle by: checking servo ids and baud rate.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Operation attempted in invalid state (e.g., reading a disconnected bus).
    /// Handle by: checking `is_connected` before operations.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Operator console I/O failed (stdout closed, stdin unreadable).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for so100-core operations
pub type Result<T> = std::result::Result<T, Error>;
