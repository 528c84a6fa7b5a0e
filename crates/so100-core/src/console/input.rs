//! Operator input channel
//!
//! Lines and interrupts arrive on one crossbeam channel, so the session loop
//! sees a Ctrl+C even while it is blocked waiting for the next line.

use std::io::BufRead;
use std::thread;

use crossbeam_channel::{self as cc, Receiver, Sender};

use crate::Result;

/// One event from the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// A line of text, without its terminator
    Line(String),
    /// The operator pressed Ctrl+C
    Interrupted,
    /// No more input will arrive
    Closed,
}

/// Receiving end of the operator input channel
#[derive(Debug)]
pub struct OperatorInput {
    rx: Receiver<Input>,
}

impl OperatorInput {
    /// Create an empty channel
    ///
    /// Once every sender is dropped and the queue drained, the input reports
    /// [`Input::Closed`].
    pub fn channel() -> (Sender<Input>, Self) {
        let (tx, rx) = cc::unbounded();
        (tx, Self { rx })
    }

    /// Feed the channel from this process's stdin
    ///
    /// Spawns a reader thread. The returned sender is for the interrupt
    /// handler.
    pub fn stdin() -> Result<(Sender<Input>, Self)> {
        let (tx, input) = Self::channel();
        let reader_tx = tx.clone();

        thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || pump_lines(std::io::stdin().lock(), &reader_tx))?;

        Ok((tx, input))
    }

    /// Block until the next operator event
    pub fn next_input(&self) -> Input {
        self.rx.recv().unwrap_or(Input::Closed)
    }
}

/// Forward lines from `reader` until EOF, a read error, or the console goes away
fn pump_lines<R: BufRead>(reader: R, tx: &Sender<Input>) {
    for line in reader.lines() {
        match line {
            Ok(line) => {
                if tx.send(Input::Line(line)).is_err() {
                    return;
                }
            }
            Err(e) => {
                tracing::warn!("Failed to read operator input: {}", e);
                break;
            }
        }
    }
    let _ = tx.send(Input::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_pump_lines_then_closed() {
        let (tx, input) = OperatorInput::channel();
        pump_lines(Cursor::new("j 2\r\n+\nq"), &tx);

        assert_eq!(input.next_input(), Input::Line("j 2".into()));
        assert_eq!(input.next_input(), Input::Line("+".into()));
        assert_eq!(input.next_input(), Input::Line("q".into()));
        assert_eq!(input.next_input(), Input::Closed);
    }

    #[test]
    fn test_dropped_senders_close_input() {
        let (tx, input) = OperatorInput::channel();
        tx.send(Input::Interrupted).unwrap();
        drop(tx);

        assert_eq!(input.next_input(), Input::Interrupted);
        assert_eq!(input.next_input(), Input::Closed);
        assert_eq!(input.next_input(), Input::Closed);
    }
}
