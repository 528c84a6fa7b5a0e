//! Interactive direct joint control
//!
//! The console keeps a cache of joint positions, a selected joint and a
//! step size, and turns operator commands into bus reads and writes.
//!
//! # Example
//!
//! ```no_run
//! use so100_core::{Console, ConsoleConfig, FeetechBus, FeetechConfig, OperatorInput};
//!
//! let bus = FeetechBus::new(FeetechConfig::new("/dev/ttyACM0"));
//! let mut out = std::io::stdout();
//! let (_interrupt, input) = OperatorInput::stdin()?;
//!
//! let mut console = Console::start(bus, ConsoleConfig::default(), &mut out)?;
//! console.run(&input, &mut out)?;
//! console.shutdown(&mut out)?;
//! # Ok::<(), so100_core::Error>(())
//! ```

mod command;
mod guard;
mod input;
mod state;

pub use command::{Command, ParseError};
pub use guard::BusGuard;
pub use input::{Input, OperatorInput};
pub use state::{ConsoleConfig, ConsoleState, StepSize};

use std::io::Write;
use std::thread;
use std::time::Duration;

use crate::hardware::{Joint, MotorBus, Register, NUM_JOINTS};
use crate::Result;

/// Whether the session loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Joint console bound to one motor bus
pub struct Console<B: MotorBus> {
    bus: BusGuard<B>,
    state: ConsoleState,
    settle_delay: Duration,
}

impl<B: MotorBus> Console<B> {
    /// Connect (if needed) and seed the position cache
    ///
    /// A connect failure is returned as-is. Per-joint read failures are
    /// reported and leave that joint at 0.0.
    pub fn start<W: Write>(bus: B, config: ConsoleConfig, out: &mut W) -> Result<Self> {
        let step_size = config.initial_step()?;
        let mut bus = BusGuard::new(bus);

        if !bus.is_connected() {
            writeln!(out, "Connecting to robot...")?;
            bus.connect()?;
        }
        writeln!(out, "Robot connected successfully!")?;

        let mut console = Self {
            bus,
            state: ConsoleState::new(step_size),
            settle_delay: config.settle_delay,
        };

        writeln!(out, "\nReading initial positions...")?;
        console.read_all(out)?;
        Ok(console)
    }

    /// Current console state
    pub fn state(&self) -> &ConsoleState {
        &self.state
    }

    /// The underlying bus
    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Parse and execute one line of operator input
    pub fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        match Command::parse(line) {
            Ok(command) => self.execute(command, out),
            Err(e) => {
                writeln!(out, "{}", e)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Execute one command
    ///
    /// Bus failures are reported to the operator and never returned; only
    /// console output errors escape.
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<Flow> {
        tracing::debug!(?command, "Executing");
        match command {
            Command::Select(number) => match Joint::from_number(number) {
                Some(joint) => {
                    self.state.selected = joint;
                    writeln!(out, "Selected joint: {}", joint)?;
                }
                None => writeln!(out, "Invalid joint number. Use 1-{}", NUM_JOINTS)?,
            },
            Command::Increase => self.move_selected(self.state.step_size.get(), out)?,
            Command::Decrease => self.move_selected(-self.state.step_size.get(), out)?,
            Command::SetStep(value) => match StepSize::new(value) {
                Some(step_size) => {
                    self.state.step_size = step_size;
                    writeln!(out, "Step size set to {:?}", step_size.get())?;
                }
                None => writeln!(out, "Step size must be positive")?,
            },
            Command::ReadAll => {
                writeln!(out, "\nReading all positions...")?;
                self.read_all(out)?;
            }
            Command::Quit => return Ok(Flow::Quit),
            Command::Unknown => writeln!(out, "Unknown command")?,
        }
        Ok(Flow::Continue)
    }

    /// Interactive loop: menu, then status/prompt/command until quit
    ///
    /// End of input counts as `q`. An interrupt ends the loop normally so
    /// the caller still runs [`Console::shutdown`].
    pub fn run<W: Write>(&mut self, input: &OperatorInput, out: &mut W) -> Result<()> {
        print_menu(out)?;

        loop {
            writeln!(out, "\nSelected joint: {}", self.state.selected)?;
            writeln!(out, "Current position: {:?}", self.state.selected_position())?;
            writeln!(out, "Step size: {:?}", self.state.step_size.get())?;
            write!(out, "Enter command (j/+/-/s/r/q): ")?;
            out.flush()?;

            match input.next_input() {
                Input::Line(line) => {
                    if self.handle_line(&line, out)? == Flow::Quit {
                        break;
                    }
                }
                Input::Interrupted => {
                    writeln!(out, "\nProgram interrupted by user")?;
                    break;
                }
                Input::Closed => {
                    writeln!(out)?;
                    break;
                }
            }
        }
        Ok(())
    }

    /// Disconnect the bus, reporting to the operator
    ///
    /// Dropping the console also disconnects, silently.
    pub fn shutdown<W: Write>(mut self, out: &mut W) -> Result<()> {
        self.bus.release(out)
    }

    /// Re-read every joint, resetting failed joints to 0.0
    fn read_all<W: Write>(&mut self, out: &mut W) -> Result<()> {
        for joint in Joint::ALL {
            match self.bus.read(Register::PresentPosition, joint) {
                Ok(reading) => {
                    self.state.positions[joint] = reading.position();
                    writeln!(out, "{}: {:?}", joint, self.state.positions[joint])?;
                }
                Err(e) => {
                    tracing::warn!(%joint, "Position read failed: {}", e);
                    self.state.positions[joint] = 0.0;
                    writeln!(out, "Error reading {}: {}", joint, e)?;
                }
            }
        }
        Ok(())
    }

    /// Write `current + delta` to the selected joint, settle, read it back
    ///
    /// On any bus failure the cached position stays as it was.
    fn move_selected<W: Write>(&mut self, delta: f64, out: &mut W) -> Result<()> {
        let joint = self.state.selected;
        let current = self.state.positions[joint];
        let target = current + delta;
        writeln!(out, "Moving {} from {:?} to {:?}", joint, current, target)?;

        if let Err(e) = self.bus.write(Register::GoalPosition, target, joint) {
            tracing::warn!(%joint, goal = target, "Goal write failed: {}", e);
            writeln!(out, "Error: {}", e)?;
            return Ok(());
        }
        writeln!(out, "Command sent. Waiting...")?;

        if !self.settle_delay.is_zero() {
            thread::sleep(self.settle_delay);
        }

        match self.bus.read(Register::PresentPosition, joint) {
            Ok(reading) => {
                self.state.positions[joint] = reading.position();
                writeln!(out, "New position: {:?}", self.state.positions[joint])?;
            }
            Err(e) => {
                tracing::warn!(%joint, "Read-back failed: {}", e);
                writeln!(out, "Error: {}", e)?;
            }
        }
        Ok(())
    }
}

fn print_menu<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "\nSimple Joint Controller")?;
    writeln!(out, "======================")?;
    writeln!(out, "Commands:")?;
    writeln!(out, "  j NUMBER - select joint (1-{})", NUM_JOINTS)?;
    writeln!(out, "  + - move current joint up/forward")?;
    writeln!(out, "  - - move current joint down/backward")?;
    writeln!(out, "  s NUMBER - set step size")?;
    writeln!(out, "  r - read all positions")?;
    writeln!(out, "  q - quit")?;
    Ok(())
}
