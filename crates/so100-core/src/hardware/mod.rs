//! Hardware abstraction for the SO-100 arm
//!
//! Provides the joint and register model, the [`MotorBus`] adapter contract,
//! and two adapters: [`FeetechBus`] for the real servos and [`MockBus`] for
//! tests and dry runs.

pub mod feetech;
mod joint;
mod mock;
mod register;
mod traits;

pub use feetech::{FeetechBus, FeetechConfig};
pub use joint::{Joint, JointPositions, NUM_JOINTS};
pub use mock::MockBus;
pub use register::{Reading, Register};
pub use traits::MotorBus;
