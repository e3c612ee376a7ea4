//! Protocol engine error types

use thiserror::Error;

use crate::command::Command;

/// Errors from argument packing.
///
/// Both variants indicate a wrong command/argument pairing on the caller's
/// side. They are surfaced immediately and are never worth retrying.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("argument ({needed} bytes) would exceed capacity {limit} ({used} bytes used)")]
    CapacityExceeded {
        needed: usize,
        used: usize,
        limit: usize,
    },

    #[error("value 0x{value:X} does not fit in {width} byte(s)")]
    ValueOverflow { value: u64, width: usize },
}

/// Errors from the underlying send/receive pair.
///
/// These are link failures: the caller may retry with backoff, the engine
/// never retries on its own.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("device disconnected")]
    Disconnected,

    #[error("response timeout")]
    Timeout,

    #[error("HID error: {0}")]
    Hid(String),

    #[error("HID permission denied: {0}")]
    PermissionDenied(String),
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") {
            TransportError::PermissionDenied(msg)
        } else {
            TransportError::Hid(msg)
        }
    }
}

/// Response frame failed an integrity check.
///
/// Distinct from [`TransportError`]: the link delivered bytes, but they do
/// not match what the request implies, which points at a firmware or logic
/// mismatch rather than a flaky cable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("response too short: got {got} bytes, frame length is {expected}")]
    TooShort { expected: usize, got: usize },

    #[error("response checksum mismatch: computed 0x{computed:02X}, frame carries 0x{actual:02X}")]
    ChecksumMismatch { computed: u8, actual: u8 },

    #[error("response {field} mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    EchoMismatch {
        field: &'static str,
        expected: u8,
        actual: u8,
    },
}

/// Unified failure for a command round trip, tagged with the descriptor of
/// the command that failed.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("encoding arguments for {command} failed: {source}")]
    Encode {
        command: Command,
        source: EncodeError,
    },

    #[error("transport failure running {command}: {source}")]
    Transport {
        command: Command,
        source: TransportError,
    },

    #[error("protocol violation in response to {command}: {source}")]
    Protocol {
        command: Command,
        source: ProtocolError,
    },
}

impl CommandError {
    /// Descriptor of the command that failed.
    pub fn command(&self) -> Command {
        match self {
            Self::Encode { command, .. }
            | Self::Transport { command, .. }
            | Self::Protocol { command, .. } => *command,
        }
    }
}
