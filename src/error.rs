//! Unified error types for the SpaNet driver.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! caller's handling uniform.  All variants are `Copy` so they can be
//! returned from setters and logged without allocation.
//!
//! Nothing here is fatal: every failure degrades to "stale cached state"
//! plus a failed return value.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level driver error
// ---------------------------------------------------------------------------

/// Every fallible operation in the driver funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The serial transport failed to move bytes.
    Transport(TransportError),
    /// A full-state response failed its structural checks.
    Frame(FrameError),
    /// A register write was not acknowledged as expected.
    Write(WriteError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Frame(e) => write!(f, "frame: {e}"),
            Self::Write(e) => write!(f, "write: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    WriteFailed,
    FlushFailed,
    ReadFailed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "write failed"),
            Self::FlushFailed => write!(f, "flush failed"),
            Self::ReadFailed => write!(f, "read failed"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Frame errors
// ---------------------------------------------------------------------------

/// Structural failures of a full-state response.  Any of these discards
/// the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Field 0 did not begin with the register-dump literal.
    MissingPrefix,
    /// An empty field arrived before the minimum field count.
    EmptyField { index: usize },
    /// Fewer fields than the minimum were read.
    Truncated { fields: usize, min: usize },
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrefix => write!(f, "missing register dump prefix"),
            Self::EmptyField { index } => write!(f, "empty field at index {index}"),
            Self::Truncated { fields, min } => {
                write!(f, "{fields} fields read, expecting at least {min}")
            }
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Self::Frame(e)
    }
}

// ---------------------------------------------------------------------------
// Write errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteError {
    /// No acknowledgement line arrived before the timeout.
    NoAck,
    /// The acknowledgement did not match the register's expected token.
    Rejected,
    /// A label could not be resolved to a register code; nothing was sent.
    UnknownLabel,
    /// The addressed register does not exist (e.g. pump 7); nothing was sent.
    InvalidTarget,
}

impl fmt::Display for WriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAck => write!(f, "no acknowledgement"),
            Self::Rejected => write!(f, "acknowledgement mismatch"),
            Self::UnknownLabel => write!(f, "unknown label"),
            Self::InvalidTarget => write!(f, "invalid target register"),
        }
    }
}

impl From<WriteError> for Error {
    fn from(e: WriteError) -> Self {
        Self::Write(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Driver-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
