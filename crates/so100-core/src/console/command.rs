//! Operator command parsing

use std::str::FromStr;

/// One operator command, parsed once from an input line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `j N`: select the joint with 1-indexed number N (range checked on dispatch)
    Select(i64),
    /// `+`: move the selected joint forward by one step
    Increase,
    /// `-`: move the selected joint backward by one step
    Decrease,
    /// `s N`: set the step size (positivity checked on dispatch)
    SetStep(f64),
    /// `r`: re-read every joint position
    ReadAll,
    /// `q`: leave the console
    Quit,
    /// Anything else
    Unknown,
}

/// Malformed arguments to a known command
///
/// The display text is what the operator sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Usage: j NUMBER")]
    MissingJointNumber,
    #[error("Invalid joint number format")]
    InvalidJointNumber,
    #[error("Usage: s NUMBER")]
    MissingStepSize,
    #[error("Invalid step size format")]
    InvalidStepSize,
}

impl Command {
    /// Parse a line of operator input
    ///
    /// Case-insensitive and whitespace-trimmed. Arguments past the first are
    /// ignored; argument-free commands with trailing text are unknown.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim().to_ascii_lowercase();
        let mut tokens = line.split_whitespace();
        let Some(head) = tokens.next() else {
            return Ok(Command::Unknown);
        };
        let arg = tokens.next();

        let command = match (head, arg) {
            ("j", None) => return Err(ParseError::MissingJointNumber),
            ("j", Some(n)) => Command::Select(
                n.parse()
                    .map_err(|_| ParseError::InvalidJointNumber)?,
            ),
            ("s", None) => return Err(ParseError::MissingStepSize),
            ("s", Some(v)) => {
                let value: f64 = v.parse().map_err(|_| ParseError::InvalidStepSize)?;
                if !value.is_finite() {
                    return Err(ParseError::InvalidStepSize);
                }
                Command::SetStep(value)
            }
            ("+", None) => Command::Increase,
            ("-", None) => Command::Decrease,
            ("r", None) => Command::ReadAll,
            ("q", None) => Command::Quit,
            _ => Command::Unknown,
        };
        Ok(command)
    }
}

impl FromStr for Command {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(Command::parse("+"), Ok(Command::Increase));
        assert_eq!(Command::parse("-"), Ok(Command::Decrease));
        assert_eq!(Command::parse("r"), Ok(Command::ReadAll));
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_case_and_whitespace() {
        assert_eq!(Command::parse("  Q \n"), Ok(Command::Quit));
        assert_eq!(Command::parse("J   3"), Ok(Command::Select(3)));
        assert_eq!(Command::parse("\tS 12.5 "), Ok(Command::SetStep(12.5)));
    }

    #[test]
    fn test_select_keeps_out_of_range_numbers() {
        assert_eq!(Command::parse("j 9"), Ok(Command::Select(9)));
        assert_eq!(Command::parse("j 0"), Ok(Command::Select(0)));
        assert_eq!(Command::parse("j -2"), Ok(Command::Select(-2)));
    }

    #[test]
    fn test_select_errors() {
        assert_eq!(Command::parse("j"), Err(ParseError::MissingJointNumber));
        assert_eq!(Command::parse("j two"), Err(ParseError::InvalidJointNumber));
        assert_eq!(Command::parse("j 1.5"), Err(ParseError::InvalidJointNumber));
    }

    #[test]
    fn test_step_keeps_non_positive_values() {
        assert_eq!(Command::parse("s -5"), Ok(Command::SetStep(-5.0)));
        assert_eq!(Command::parse("s 0"), Ok(Command::SetStep(0.0)));
    }

    #[test]
    fn test_step_errors() {
        assert_eq!(Command::parse("s"), Err(ParseError::MissingStepSize));
        assert_eq!(Command::parse("s fast"), Err(ParseError::InvalidStepSize));
        assert_eq!(Command::parse("s nan"), Err(ParseError::InvalidStepSize));
        assert_eq!(Command::parse("s inf"), Err(ParseError::InvalidStepSize));
    }

    #[test]
    fn test_unknown() {
        for line in ["", "   ", "x", "quit", "++", "+ 5", "r now", "j3"] {
            assert_eq!(Command::parse(line), Ok(Command::Unknown), "line {:?}", line);
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ParseError::MissingJointNumber.to_string(), "Usage: j NUMBER");
        assert_eq!(
            ParseError::InvalidStepSize.to_string(),
            "Invalid step size format"
        );
    }
}
