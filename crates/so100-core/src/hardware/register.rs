//! Named servo registers and normalised register readings

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// A named addressable value on the motor bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Current position (2 bytes, read-only)
    PresentPosition,
    /// Goal position (2 bytes, read-write)
    GoalPosition,
    /// Torque enable (1 byte, read-write)
    TorqueEnable,
}

impl Register {
    /// Canonical register name
    pub const fn name(self) -> &'static str {
        match self {
            Register::PresentPosition => "Present_Position",
            Register::GoalPosition => "Goal_Position",
            Register::TorqueEnable => "Torque_Enable",
        }
    }

    /// Feetech STS control-table address
    pub const fn address(self) -> u8 {
        match self {
            Register::PresentPosition => 0x38,
            Register::GoalPosition => 0x2A,
            Register::TorqueEnable => 0x28,
        }
    }

    /// Width of the register in bytes
    pub const fn width(self) -> u8 {
        match self {
            Register::PresentPosition | Register::GoalPosition => 2,
            Register::TorqueEnable => 1,
        }
    }

    /// Whether the host may write this register
    pub const fn is_writable(self) -> bool {
        !matches!(self, Register::PresentPosition)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Register {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        [
            Register::PresentPosition,
            Register::GoalPosition,
            Register::TorqueEnable,
        ]
        .into_iter()
        .find(|r| r.name() == s)
        .ok_or_else(|| Error::Config(format!("Unknown register: {}", s)))
    }
}

/// Result of reading one register of one joint
///
/// Drivers may hand back a bare value or a one-element array; both collapse
/// to [`Reading::Value`]. An empty array becomes [`Reading::Empty`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Value(f64),
    Empty,
}

impl Reading {
    /// Normalise an array-like register payload
    ///
    /// A per-joint read must produce at most one value; longer payloads are
    /// a hardware error rather than silently truncated.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        match values {
            [] => Ok(Reading::Empty),
            [value] => Ok(Reading::Value(*value)),
            _ => Err(Error::Hardware(format!(
                "Expected a single register value, got {}",
                values.len()
            ))),
        }
    }

    /// Scalar position, with [`Reading::Empty`] mapped to 0.0
    #[inline]
    pub fn position(self) -> f64 {
        match self {
            Reading::Value(value) => value,
            Reading::Empty => 0.0,
        }
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Reading::Value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_names() {
        assert_eq!(Register::PresentPosition.to_string(), "Present_Position");
        assert_eq!(
            "Goal_Position".parse::<Register>().unwrap(),
            Register::GoalPosition
        );
        assert!("goal_position".parse::<Register>().is_err());
    }

    #[test]
    fn test_present_position_is_read_only() {
        assert!(!Register::PresentPosition.is_writable());
        assert!(Register::GoalPosition.is_writable());
        assert!(Register::TorqueEnable.is_writable());
    }

    #[test]
    fn test_reading_from_values() {
        assert_eq!(Reading::from_values(&[]).unwrap(), Reading::Empty);
        assert_eq!(
            Reading::from_values(&[395.0]).unwrap(),
            Reading::Value(395.0)
        );
        assert!(matches!(
            Reading::from_values(&[1.0, 2.0]),
            Err(Error::Hardware(_))
        ));
    }

    #[test]
    fn test_empty_reading_is_zero() {
        assert_eq!(Reading::Empty.position(), 0.0);
        assert_eq!(Reading::from(-12.0).position(), -12.0);
    }
}
