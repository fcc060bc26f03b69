//! Unified error types for the home network.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! callers' error handling uniform.  All variants are `Copy` so they can be
//! passed through event handlers and reported to the operator without
//! allocation.
//!
//! Not every failure is an error: a reliable send that exhausts its
//! retransmissions resolves to
//! [`SendOutcome::TimedOut`](crate::transport::link::SendOutcome), and
//! spurious helper events are discarded silently by the node that owns them.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A command was well-formed but rejected by the current status word.
    Rejected(Rejection),
    /// The transport refused to take a frame.
    Transport(TransportError),
    /// A payload could not be encoded or decoded.
    Wire(WireError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rejected(e) => write!(f, "rejected: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Wire(e) => write!(f, "wire: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Invalid commands
// ---------------------------------------------------------------------------

/// Why a command was refused.  The status word is left unchanged and the
/// command is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The alarm is active; only "deactivate alarm" is accepted.
    AlarmActive,
    /// An automatic opening is already in progress.
    AutoOpening,
    /// The button was clicked more times than any command needs.
    TooManyClicks,
    /// The click count does not map to a command.
    UnknownCommand(u8),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlarmActive => write!(f, "alarm is active"),
            Self::AutoOpening => write!(f, "automatic opening in progress"),
            Self::TooManyClicks => write!(f, "too many clicks"),
            Self::UnknownCommand(n) => write!(f, "no command for {n} clicks"),
        }
    }
}

impl From<Rejection> for Error {
    fn from(e: Rejection) -> Self {
        Self::Rejected(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// A reliable transmission is already outstanding from this node.
    Busy,
    /// The encoded message does not fit in one radio frame.
    PayloadTooLarge,
    /// The link's outbound queue has no room left this tick.
    OutboxFull,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "previous transmission still in flight"),
            Self::PayloadTooLarge => write!(f, "payload too large"),
            Self::OutboxFull => write!(f, "outbound queue full"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Wire format errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireError {
    /// Zero-length payload.
    Empty,
    /// Single-byte payload that is not a known opcode.
    UnknownOpcode(u8),
    /// Text payload with no recognised prefix.
    UnknownTag,
    /// Recognised prefix followed by a malformed decimal number.
    InvalidNumber,
    /// Encoded message exceeds the frame payload size.
    TooLong,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty payload"),
            Self::UnknownOpcode(op) => write!(f, "unknown opcode {op}"),
            Self::UnknownTag => write!(f, "unknown message tag"),
            Self::InvalidNumber => write!(f, "invalid numeric suffix"),
            Self::TooLong => write!(f, "message too long"),
        }
    }
}

impl From<WireError> for Error {
    fn from(e: WireError) -> Self {
        Self::Wire(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// A config field failed range validation.  The message names the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigError(pub &'static str);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {}", self.0)
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
