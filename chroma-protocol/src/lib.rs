//! Report protocol engine for Chroma USB HID peripherals
//!
//! This crate implements the command/report protocol the lighting and
//! input hardware speaks over HID feature reports:
//!
//! - [`args`]: marshaling of heterogeneous typed arguments into the
//!   report's payload region
//! - [`command`]: immutable command descriptors (class, id, data size)
//! - [`frame`]: the fixed-length report frame codec and checksum rules
//! - [`runner`]: serialized command execution with response validation
//! - [`hid`]: the hidapi-backed [`Transport`] implementation
//!
//! Transport backends implement the minimal [`Transport`] trait; everything
//! protocol-shaped lives above it.

pub mod args;
pub mod command;
pub mod error;
pub mod frame;
pub mod runner;

mod hid;

pub use args::{Argument, ByteArgs, Endian, PackFormat, Rgb, Width};
pub use command::Command;
pub use error::{CommandError, EncodeError, ProtocolError, TransportError};
pub use frame::{
    build_report, compute_checksum, ChecksumKind, FrameConfig, ResponseFrame,
    DEFAULT_REPORT_LEN, HEADER_LEN,
};
pub use hid::HidTransport;
pub use runner::{CommandRunner, RunnerOptions};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// Timing constants shared across device families.
pub mod timing {
    /// Transaction code most firmware expects echoed back
    pub const DEFAULT_TX_ID: u8 = 0xFF;
    /// Transaction code for families with the 0x3F quirk
    pub const TX_ID_3F: u8 = 0x3F;
    /// Default response wait
    pub const RESPONSE_TIMEOUT_MS: u64 = 500;
    /// Inter-command gap for hardware that needs request pacing
    pub const COMMAND_GAP_MS: u64 = 5;
}

/// Raw report transport: one fixed-size feature-report write/read pair.
///
/// Implementations only move bytes; framing, checksums, and pairing are the
/// [`runner::CommandRunner`]'s job.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Transmit one complete report frame.
    async fn send(&self, report: &[u8]) -> Result<(), TransportError>;

    /// Read one report frame, waiting at most `timeout`.
    async fn receive(&self, timeout: Duration) -> Result<Vec<u8>, TransportError>;
}

/// Shared handle to a transport backend.
pub type BoxedTransport = Arc<dyn Transport>;
