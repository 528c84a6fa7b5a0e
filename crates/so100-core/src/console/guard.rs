//! Scoped ownership of the motor bus

use std::io::Write;
use std::ops::{Deref, DerefMut};

use crate::hardware::MotorBus;
use crate::Result;

/// Owns the bus and disconnects it when dropped
///
/// Covers every exit from the console that unwinds the stack: `q`,
/// interrupts, error returns and panics. A failed disconnect is logged and
/// never escalated.
pub struct BusGuard<B: MotorBus> {
    bus: B,
}

impl<B: MotorBus> BusGuard<B> {
    /// Take ownership of a bus
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Disconnect now, reporting progress to the operator
    ///
    /// Only console output errors are returned; a bus failure is reported
    /// and swallowed.
    pub fn release<W: Write>(&mut self, out: &mut W) -> Result<()> {
        if !self.bus.is_connected() {
            return Ok(());
        }
        writeln!(out, "Disconnecting robot...")?;
        match self.bus.disconnect() {
            Ok(()) => writeln!(out, "Robot disconnected")?,
            Err(e) => {
                tracing::warn!("Disconnect failed: {}", e);
                writeln!(out, "Error disconnecting robot: {}", e)?;
            }
        }
        Ok(())
    }
}

impl<B: MotorBus> Deref for BusGuard<B> {
    type Target = B;

    fn deref(&self) -> &B {
        &self.bus
    }
}

impl<B: MotorBus> DerefMut for BusGuard<B> {
    fn deref_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

impl<B: MotorBus> Drop for BusGuard<B> {
    fn drop(&mut self) {
        if self.bus.is_connected() {
            tracing::info!("Releasing motor bus");
            if let Err(e) = self.bus.disconnect() {
                tracing::error!("Disconnect on exit failed: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::MockBus;
    use std::panic::{self, AssertUnwindSafe};

    fn connected_mock() -> MockBus {
        let mut bus = MockBus::new();
        bus.connect().unwrap();
        bus
    }

    #[test]
    fn test_drop_disconnects() {
        let bus = connected_mock();
        {
            let _guard = BusGuard::new(bus.clone());
        }
        assert!(!bus.is_connected());
        assert_eq!(bus.disconnect_count(), 1);
    }

    #[test]
    fn test_drop_on_panic_disconnects() {
        let bus = connected_mock();
        let handle = bus.clone();
        let result = panic::catch_unwind(AssertUnwindSafe(move || {
            let _guard = BusGuard::new(bus);
            panic!("console blew up");
        }));
        assert!(result.is_err());
        assert!(!handle.is_connected());
    }

    #[test]
    fn test_release_reports_and_drop_is_noop() {
        let bus = connected_mock();
        let mut out = Vec::new();
        {
            let mut guard = BusGuard::new(bus.clone());
            guard.release(&mut out).unwrap();
        }
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Disconnecting robot..."));
        assert!(text.contains("Robot disconnected"));
        assert_eq!(bus.disconnect_count(), 1);
    }

    #[test]
    fn test_release_failure_is_best_effort() {
        let bus = connected_mock();
        bus.fail_disconnect(true);
        let mut out = Vec::new();
        let mut guard = BusGuard::new(bus.clone());
        assert!(guard.release(&mut out).is_ok());
        assert!(String::from_utf8(out).unwrap().contains("Error disconnecting robot"));
    }

    #[test]
    fn test_disconnected_bus_untouched() {
        let bus = MockBus::new();
        let mut out = Vec::new();
        BusGuard::new(bus.clone()).release(&mut out).unwrap();
        assert!(out.is_empty());
        assert_eq!(bus.disconnect_count(), 0);
    }
}
