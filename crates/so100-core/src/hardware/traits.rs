//! Motor bus adapter contract
//!
//! The console only talks to the arm through this trait, so the same code
//! drives the real servos or the simulated bus.

use super::{Joint, Reading, Register};
use crate::Result;

/// Trait for a physical (or simulated) actuator bus
///
/// Every operation returns a `Result`; transient hardware errors are
/// expected and the caller decides whether they are fatal.
pub trait MotorBus {
    /// Open the bus. Calling this on a connected bus is a no-op.
    fn connect(&mut self) -> Result<()>;

    /// Release the bus. Calling this on a disconnected bus is a no-op.
    fn disconnect(&mut self) -> Result<()>;

    /// Check if the bus is open
    #[must_use]
    fn is_connected(&self) -> bool;

    /// Read one register of one joint
    fn read(&mut self, register: Register, joint: Joint) -> Result<Reading>;

    /// Write one register of one joint
    fn write(&mut self, register: Register, value: f64, joint: Joint) -> Result<()>;
}

impl<B: MotorBus + ?Sized> MotorBus for Box<B> {
    fn connect(&mut self) -> Result<()> {
        (**self).connect()
    }

    fn disconnect(&mut self) -> Result<()> {
        (**self).disconnect()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn read(&mut self, register: Register, joint: Joint) -> Result<Reading> {
        (**self).read(register, joint)
    }

    fn write(&mut self, register: Register, value: f64, joint: Joint) -> Result<()> {
        (**self).write(register, value, joint)
    }
}
