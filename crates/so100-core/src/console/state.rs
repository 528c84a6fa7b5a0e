//! Console state and configuration

use std::time::Duration;

use crate::hardware::{Joint, JointPositions};
use crate::{Error, Result};

/// Distance moved by one `+` or `-`, in raw servo steps
///
/// Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct StepSize(f64);

impl StepSize {
    /// Step size the console starts with
    pub const DEFAULT: StepSize = StepSize(300.0);

    /// Accept `value` if it is finite and > 0
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    /// Raw value
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for StepSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Mutable state of one console session
#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleState {
    /// Last-known position of every joint
    pub positions: JointPositions,
    /// Joint that `+` and `-` act on
    pub selected: Joint,
    /// Distance moved by `+` and `-`
    pub step_size: StepSize,
}

impl ConsoleState {
    /// Fresh state: every joint at 0.0, first joint selected
    pub fn new(step_size: StepSize) -> Self {
        Self {
            positions: JointPositions::new(),
            selected: Joint::ALL[0],
            step_size,
        }
    }

    /// Cached position of the selected joint
    pub fn selected_position(&self) -> f64 {
        self.positions[self.selected]
    }
}

impl Default for ConsoleState {
    fn default() -> Self {
        Self::new(StepSize::DEFAULT)
    }
}

/// Configuration for a console session
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Initial step size in raw servo steps
    pub step_size: f64,
    /// Wait between commanding a move and reading the joint back
    pub settle_delay: Duration,
}

impl ConsoleConfig {
    /// Default settle delay
    ///
    /// The servos give no motion-complete signal, so the read-back simply
    /// waits this long.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(500);

    /// Set the initial step size
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    /// Set the settle delay
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Validate and return the initial step size
    pub fn initial_step(&self) -> Result<StepSize> {
        StepSize::new(self.step_size).ok_or_else(|| {
            Error::Config(format!(
                "Step size must be a positive number, got {}",
                self.step_size
            ))
        })
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            step_size: StepSize::DEFAULT.get(),
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
        }
    }
}
