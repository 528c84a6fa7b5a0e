//! End-to-end console sessions against the mock bus

use std::time::Duration;

use so100_core::{
    Console, ConsoleConfig, Input, Joint, MockBus, MotorBus, OperatorInput, Register,
};

fn session(bus: &MockBus, inputs: &[Input]) -> (Console<MockBus>, String) {
    let config = ConsoleConfig::default().with_settle_delay(Duration::ZERO);
    let mut out = Vec::new();
    let mut console = Console::start(bus.clone(), config, &mut out).unwrap();

    let (tx, input) = OperatorInput::channel();
    for event in inputs {
        tx.send(event.clone()).unwrap();
    }
    drop(tx);

    console.run(&input, &mut out).unwrap();
    (console, String::from_utf8(out).unwrap())
}

fn line(text: &str) -> Input {
    Input::Line(text.to_string())
}

#[test]
fn shoulder_pan_step_with_short_read_back() {
    let bus = MockBus::new();
    bus.set_position(Joint::ShoulderPan, 100.0);
    // Servo stops 5 steps short of the goal
    bus.queue_read(Joint::ShoulderPan, &[100.0]);
    bus.queue_read(Joint::ShoulderPan, &[395.0]);

    let (console, out) = session(&bus, &[line("+"), line("q")]);

    assert_eq!(
        bus.writes(),
        vec![(Register::GoalPosition, 400.0, Joint::ShoulderPan)]
    );
    let state = console.state();
    assert_eq!(state.positions[Joint::ShoulderPan], 395.0);
    assert!(Joint::ALL[1..]
        .iter()
        .all(|&joint| state.positions[joint] == 0.0));
    assert!(out.contains("Current position: 395.0"));
}

#[test]
fn invalid_input_leaves_state_alone() {
    let bus = MockBus::new();
    let (console, out) = session(
        &bus,
        &[line("j 9"), line("s -5"), line("s"), line("wave"), line("q")],
    );

    assert_eq!(console.state().selected, Joint::ShoulderPan);
    assert_eq!(console.state().step_size.get(), 300.0);
    assert!(out.contains("Invalid joint number"));
    assert!(out.contains("Step size must be positive"));
    assert!(out.contains("Usage: s NUMBER"));
    assert!(out.contains("Unknown command"));
    assert!(bus.writes().is_empty());
}

#[test]
fn interrupt_still_disconnects() {
    let bus = MockBus::new();
    let (console, out) = session(&bus, &[line("j 6"), Input::Interrupted]);
    assert_eq!(console.state().selected, Joint::Gripper);
    assert!(out.contains("Program interrupted by user"));

    let mut out = Vec::new();
    console.shutdown(&mut out).unwrap();
    assert!(!bus.is_connected());
    assert_eq!(bus.disconnect_count(), 1);
}

#[test]
fn failing_joint_does_not_stop_the_session() {
    let bus = MockBus::new();
    for joint in Joint::ALL {
        bus.set_position(joint, 2048.0);
    }
    bus.fail_reads(Joint::ElbowFlex, true);

    let (console, out) = session(&bus, &[line("j 3"), line("+"), line("r"), line("j 4"), line("+")]);

    // Write went through but the read-back failed: cache keeps the startup 0.0
    assert_eq!(console.state().positions[Joint::ElbowFlex], 0.0);
    assert_eq!(console.state().positions[Joint::WristFlex], 2348.0);
    assert_eq!(bus.position(Joint::ElbowFlex), 300.0);
    assert!(out.matches("Error reading elbow_flex").count() >= 2);

    drop(console);
    assert!(!bus.is_connected());
}
