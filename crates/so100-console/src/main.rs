//! SO-100 follower arm direct controller
//!
//! Moves one joint at a time from the terminal. Logs go to stderr
//! (`RUST_LOG` controls the level), the console itself to stdout.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use so100_core::{
    Console, ConsoleConfig, FeetechBus, FeetechConfig, Input, MockBus, MotorBus, OperatorInput,
};
use tracing_subscriber::EnvFilter;

/// SO-100 direct joint controller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Serial port of the follower arm
    #[arg(short, long, default_value = "/dev/ttyACM0")]
    port: String,

    /// Servo bus baudrate
    #[arg(short, long, default_value_t = FeetechConfig::DEFAULT_BAUDRATE)]
    baudrate: u32,

    /// Servo response timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    timeout_ms: u64,

    /// Initial step size in raw servo steps
    #[arg(short, long, default_value_t = 300.0)]
    step_size: f64,

    /// Wait after each move before reading the joint back, in milliseconds
    #[arg(long, default_value_t = 500)]
    settle_ms: u64,

    /// Leave servo torque untouched on connect
    #[arg(long)]
    no_torque: bool,

    /// Drive a simulated arm instead of the serial bus
    #[arg(long)]
    mock: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    tracing::info!("so100-console {}", so100_core::VERSION);

    let bus: Box<dyn MotorBus> = if args.mock {
        println!("Creating simulated robot...");
        Box::new(MockBus::new())
    } else {
        println!("Creating robot on {}...", args.port);
        let config = FeetechConfig::new(&args.port)
            .with_baudrate(args.baudrate)
            .with_timeout(Duration::from_millis(args.timeout_ms))
            .with_torque_on_connect(!args.no_torque);
        Box::new(FeetechBus::new(config))
    };

    let config = ConsoleConfig::default()
        .with_step_size(args.step_size)
        .with_settle_delay(Duration::from_millis(args.settle_ms));

    let (interrupt, input) = OperatorInput::stdin().context("Failed to start input reader")?;
    ctrlc::set_handler(move || {
        let _ = interrupt.send(Input::Interrupted);
    })
    .context("Failed to set Ctrl+C handler")?;

    let mut out = std::io::stdout();
    let mut console =
        Console::start(bus, config, &mut out).context("Failed to connect to robot")?;

    let session = console.run(&input, &mut out);
    // Disconnect even if the session loop failed
    let shutdown = console.shutdown(&mut out);
    out.flush().ok();

    tracing::info!("Session ended");
    session.context("Console session failed")?;
    shutdown.context("Failed to shut down console")?;
    Ok(())
}
