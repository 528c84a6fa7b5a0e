//! Simulated motor bus for testing without an arm attached

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Joint, JointPositions, MotorBus, Reading, Register, NUM_JOINTS};
use crate::{Error, Result};

#[derive(Debug, Default)]
struct MockState {
    connected: bool,
    present: JointPositions,
    goal: JointPositions,
    torque: [bool; NUM_JOINTS],
    queued_reads: [VecDeque<Vec<f64>>; NUM_JOINTS],
    failing_reads: [bool; NUM_JOINTS],
    fail_writes: bool,
    fail_connect: bool,
    fail_disconnect: bool,
    writes: Vec<(Register, f64, Joint)>,
    connects: usize,
    disconnects: usize,
}

/// A mock motor bus
///
/// Goal writes move the simulated joint instantly. Clones share state, so a
/// test can keep one handle while the console owns another.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    inner: Arc<Mutex<MockState>>,
}

impl MockBus {
    /// Create a disconnected bus with every joint at 0.0
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the simulated present position of a joint
    pub fn set_position(&self, joint: Joint, position: f64) {
        let mut state = self.inner.lock();
        state.present[joint] = position;
        state.goal[joint] = position;
    }

    /// Simulated present position of a joint
    pub fn position(&self, joint: Joint) -> f64 {
        self.inner.lock().present[joint]
    }

    /// Queue a raw payload for the next present-position read of `joint`
    ///
    /// The payload goes through [`Reading::from_values`], so an empty slice
    /// simulates a driver returning an empty array.
    pub fn queue_read(&self, joint: Joint, values: &[f64]) {
        self.inner.lock().queued_reads[joint.index()].push_back(values.to_vec());
    }

    /// Make present-position reads of `joint` fail
    pub fn fail_reads(&self, joint: Joint, fail: bool) {
        self.inner.lock().failing_reads[joint.index()] = fail;
    }

    /// Make every write fail
    pub fn fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    /// Make `connect` fail
    pub fn fail_connect(&self, fail: bool) {
        self.inner.lock().fail_connect = fail;
    }

    /// Make `disconnect` fail (the bus still ends up closed)
    pub fn fail_disconnect(&self, fail: bool) {
        self.inner.lock().fail_disconnect = fail;
    }

    /// Every successful write, in order
    pub fn writes(&self) -> Vec<(Register, f64, Joint)> {
        self.inner.lock().writes.clone()
    }

    /// Number of times the bus was opened
    pub fn connect_count(&self) -> usize {
        self.inner.lock().connects
    }

    /// Number of times the bus was closed
    pub fn disconnect_count(&self) -> usize {
        self.inner.lock().disconnects
    }

    /// Whether torque is enabled on a joint
    pub fn torque_enabled(&self, joint: Joint) -> bool {
        self.inner.lock().torque[joint.index()]
    }
}

impl MotorBus for MockBus {
    fn connect(&mut self) -> Result<()> {
        let mut state = self.inner.lock();
        if state.connected {
            return Ok(());
        }
        if state.fail_connect {
            return Err(Error::Connection("simulated connect failure".into()));
        }
        state.connected = true;
        state.connects += 1;
        tracing::debug!("Mock bus connected");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        let mut state = self.inner.lock();
        if !state.connected {
            return Ok(());
        }
        state.connected = false;
        state.disconnects += 1;
        if state.fail_disconnect {
            return Err(Error::Connection("simulated disconnect failure".into()));
        }
        tracing::debug!("Mock bus disconnected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.inner.lock().connected
    }

    fn read(&mut self, register: Register, joint: Joint) -> Result<Reading> {
        let mut state = self.inner.lock();
        if !state.connected {
            return Err(Error::InvalidState("mock bus is not connected".into()));
        }
        match register {
            Register::PresentPosition => {
                if state.failing_reads[joint.index()] {
                    return Err(Error::Hardware(format!(
                        "simulated read failure on {}",
                        joint
                    )));
                }
                let queued = state.queued_reads[joint.index()].pop_front();
                match queued {
                    Some(values) => Reading::from_values(&values),
                    None => Ok(Reading::Value(state.present[joint])),
                }
            }
            Register::GoalPosition => Ok(Reading::Value(state.goal[joint])),
            Register::TorqueEnable => Ok(Reading::Value(
                if state.torque[joint.index()] { 1.0 } else { 0.0 },
            )),
        }
    }

    fn write(&mut self, register: Register, value: f64, joint: Joint) -> Result<()> {
        let mut state = self.inner.lock();
        if !state.connected {
            return Err(Error::InvalidState("mock bus is not connected".into()));
        }
        if !register.is_writable() {
            return Err(Error::InvalidState(format!("{} is read-only", register)));
        }
        if state.fail_writes {
            return Err(Error::Hardware(format!(
                "simulated write failure on {}",
                joint
            )));
        }
        state.writes.push((register, value, joint));
        match register {
            Register::GoalPosition => {
                state.goal[joint] = value;
                state.present[joint] = value;
            }
            Register::TorqueEnable => state.torque[joint.index()] = value != 0.0,
            Register::PresentPosition => unreachable!("rejected as read-only above"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_connection() {
        let mut bus = MockBus::new();
        assert!(!bus.is_connected());
        assert!(matches!(
            bus.read(Register::PresentPosition, Joint::Gripper),
            Err(Error::InvalidState(_))
        ));

        bus.connect().unwrap();
        bus.connect().unwrap();
        assert!(bus.is_connected());
        assert_eq!(bus.connect_count(), 1);
    }

    #[test]
    fn test_goal_write_moves_joint() {
        let mut bus = MockBus::new();
        bus.connect().unwrap();
        bus.write(Register::GoalPosition, 1500.0, Joint::ElbowFlex)
            .unwrap();

        let reading = bus.read(Register::PresentPosition, Joint::ElbowFlex).unwrap();
        assert_eq!(reading, Reading::Value(1500.0));
        assert_eq!(
            bus.writes(),
            vec![(Register::GoalPosition, 1500.0, Joint::ElbowFlex)]
        );
    }

    #[test]
    fn test_queued_reads_take_priority() {
        let mut bus = MockBus::new();
        bus.connect().unwrap();
        bus.set_position(Joint::ShoulderPan, 10.0);
        bus.queue_read(Joint::ShoulderPan, &[]);
        bus.queue_read(Joint::ShoulderPan, &[7.0]);

        let read = |bus: &mut MockBus| bus.read(Register::PresentPosition, Joint::ShoulderPan);
        assert_eq!(read(&mut bus).unwrap(), Reading::Empty);
        assert_eq!(read(&mut bus).unwrap(), Reading::Value(7.0));
        assert_eq!(read(&mut bus).unwrap(), Reading::Value(10.0));
    }

    #[test]
    fn test_present_position_is_not_writable() {
        let mut bus = MockBus::new();
        bus.connect().unwrap();
        assert!(bus
            .write(Register::PresentPosition, 1.0, Joint::Gripper)
            .is_err());
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let handle = MockBus::new();
        let mut owned = handle.clone();
        owned.connect().unwrap();
        owned.write(Register::TorqueEnable, 1.0, Joint::WristRoll).unwrap();
        assert!(handle.is_connected());
        assert!(handle.torque_enabled(Joint::WristRoll));

        owned.disconnect().unwrap();
        assert_eq!(handle.disconnect_count(), 1);
    }
}
