//! Operator console commands.
//!
//! | Line                                | Input                    |
//! |-------------------------------------|--------------------------|
//! | `press <node>` / `p <node>`         | button press on a node   |
//! | `th <n>` / `threshold <n>` / `<n>`  | new kitchen fire threshold |
//! | `humidity <n>`                      | simulated humidity, %    |
//! | `temperature <n>` / `temp <n>`      | simulated temperature, C |
//! | `light <n>`                         | simulated light level    |
//! | `status`                            | print a network summary  |
//! | `quit` / `exit`                     | stop the simulator       |

use core::fmt;
use core::str::FromStr;

use crate::transport::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorInput {
    Press(NodeId),
    /// Ask the central to forward a new fire threshold to the kitchen.
    Threshold(i32),
    SetHumidity(u8),
    SetTemperature(i16),
    SetLight(u16),
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorError {
    Empty,
    UnknownCommand(String),
    UnknownNode(String),
    MissingArgument(&'static str),
    InvalidNumber(String),
}

impl fmt::Display for OperatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty line"),
            Self::UnknownCommand(c) => write!(f, "unknown command '{c}'"),
            Self::UnknownNode(n) => {
                write!(f, "unknown node '{n}' (central, gate, door, kitchen, bathroom)")
            }
            Self::MissingArgument(what) => write!(f, "missing {what}"),
            Self::InvalidNumber(n) => write!(f, "invalid number '{n}'"),
        }
    }
}

impl core::error::Error for OperatorError {}

fn number<T: FromStr>(arg: Option<&str>, what: &'static str) -> Result<T, OperatorError> {
    let arg = arg.ok_or(OperatorError::MissingArgument(what))?;
    arg.parse()
        .map_err(|_| OperatorError::InvalidNumber(arg.to_string()))
}

/// Parse one console line.
pub fn parse_line(line: &str) -> Result<OperatorInput, OperatorError> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or(OperatorError::Empty)?;
    let arg = words.next();

    // A bare number is a threshold.
    if let Ok(n) = command.parse::<i32>() {
        return Ok(OperatorInput::Threshold(n));
    }

    match command.to_ascii_lowercase().as_str() {
        "press" | "p" => {
            let name = arg.ok_or(OperatorError::MissingArgument("node"))?;
            NodeId::from_name(name)
                .map(OperatorInput::Press)
                .ok_or_else(|| OperatorError::UnknownNode(name.to_string()))
        }
        "th" | "threshold" => number(arg, "threshold").map(OperatorInput::Threshold),
        "humidity" => number::<u8>(arg, "humidity").map(|h| OperatorInput::SetHumidity(h.min(100))),
        "temperature" | "temp" => number(arg, "temperature").map(OperatorInput::SetTemperature),
        "light" => number(arg, "light level").map(OperatorInput::SetLight),
        "status" => Ok(OperatorInput::Status),
        "quit" | "exit" => Ok(OperatorInput::Quit),
        other => Err(OperatorError::UnknownCommand(other.to_string())),
    }
}

impl FromStr for OperatorInput {
    type Err = OperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}
