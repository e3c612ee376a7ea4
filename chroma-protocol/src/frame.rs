//! Report frame codec
//!
//! Every exchange with the device is one fixed-length HID feature report:
//!
//! ```text
//! offset 0      transaction id
//! offset 1..3   remaining packets (big-endian u16)
//! offset 3      protocol type
//! offset 4      data size
//! offset 5      command class
//! offset 6      command id
//! offset 7..    arguments (data size bytes), zero padding after
//! offset len-1  checksum over bytes 2..len-1
//! ```
//!
//! The total report length and the checksum rule vary per device family, so
//! both live in [`FrameConfig`] instead of being baked into the codec.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::command::Command;
use crate::error::{EncodeError, ProtocolError};

/// Default report length shared by most supported hardware.
pub const DEFAULT_REPORT_LEN: usize = 90;

/// Header bytes preceding the argument region.
pub const HEADER_LEN: usize = 7;

/// Checksum rule a device family's firmware applies to report frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumKind {
    /// XOR of bytes 2..len-1 (most common)
    #[default]
    Xor,
    /// Additive sum of bytes 2..len-1, truncated to one byte
    Sum,
    /// Firmware ignores the checksum byte
    None,
}

/// Per-device-family frame parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Total report length in bytes, checksum included
    pub report_len: usize,
    /// Checksum rule the firmware validates
    pub checksum: ChecksumKind,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            report_len: DEFAULT_REPORT_LEN,
            checksum: ChecksumKind::Xor,
        }
    }
}

impl FrameConfig {
    /// Bytes available for arguments in one frame.
    pub const fn arg_capacity(&self) -> usize {
        self.report_len - HEADER_LEN - 1
    }
}

/// Fixed report header, laid out exactly as transmitted.
#[derive(Debug, Clone, Copy, IntoBytes, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct ReportHeader {
    tx_id: u8,
    remaining_hi: u8,
    remaining_lo: u8,
    protocol_type: u8,
    data_size: u8,
    class: u8,
    id: u8,
}

/// Compute the checksum for a full-length frame buffer.
///
/// Covers bytes 2..len-1; the transaction id and the high byte of the
/// remaining-packets counter are excluded by firmware convention.
pub fn compute_checksum(frame: &[u8], kind: ChecksumKind) -> u8 {
    let body = &frame[2..frame.len() - 1];
    match kind {
        ChecksumKind::Xor => body.iter().fold(0u8, |acc, &b| acc ^ b),
        ChecksumKind::Sum => body.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)),
        ChecksumKind::None => 0,
    }
}

/// Assemble a complete report frame for transmission.
pub fn build_report(
    tx_id: u8,
    command: &Command,
    args: &[u8],
    config: &FrameConfig,
) -> Result<Vec<u8>, EncodeError> {
    let capacity = config.arg_capacity();
    if args.len() > capacity {
        return Err(EncodeError::CapacityExceeded {
            needed: args.len(),
            used: 0,
            limit: capacity,
        });
    }

    let header = ReportHeader {
        tx_id,
        remaining_hi: 0,
        remaining_lo: 0,
        protocol_type: 0,
        data_size: args.len() as u8,
        class: command.class,
        id: command.id,
    };

    let mut frame = vec![0u8; config.report_len];
    frame[..HEADER_LEN].copy_from_slice(header.as_bytes());
    frame[HEADER_LEN..HEADER_LEN + args.len()].copy_from_slice(args);
    let len = frame.len();
    frame[len - 1] = compute_checksum(&frame, config.checksum);
    Ok(frame)
}

/// Read-only view over a received report frame, validated on construction.
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    data: Vec<u8>,
}

impl ResponseFrame {
    /// Parse and integrity-check a received frame.
    ///
    /// Length and checksum are verified here; echoed descriptor fields are
    /// checked against the request separately via [`ResponseFrame::matches`].
    pub fn parse(data: &[u8], config: &FrameConfig) -> Result<Self, ProtocolError> {
        if data.len() < config.report_len {
            return Err(ProtocolError::TooShort {
                expected: config.report_len,
                got: data.len(),
            });
        }
        let data = &data[..config.report_len];

        if config.checksum != ChecksumKind::None {
            let computed = compute_checksum(data, config.checksum);
            let actual = data[data.len() - 1];
            if computed != actual {
                return Err(ProtocolError::ChecksumMismatch { computed, actual });
            }
        }

        Ok(Self {
            data: data.to_vec(),
        })
    }

    pub fn tx_id(&self) -> u8 {
        self.data[0]
    }

    pub fn remaining_packets(&self) -> u16 {
        u16::from_be_bytes([self.data[1], self.data[2]])
    }

    pub fn protocol_type(&self) -> u8 {
        self.data[3]
    }

    pub fn data_size(&self) -> u8 {
        self.data[4]
    }

    pub fn class(&self) -> u8 {
        self.data[5]
    }

    pub fn id(&self) -> u8 {
        self.data[6]
    }

    /// Argument region of the response, `data_size` bytes long.
    ///
    /// Firmware occasionally reports a size larger than the frame can hold;
    /// the slice is clamped to the physical argument region.
    pub fn args(&self) -> &[u8] {
        let end = (HEADER_LEN + self.data_size() as usize).min(self.data.len() - 1);
        &self.data[HEADER_LEN..end]
    }

    /// Validate the echoed descriptor fields against the request.
    pub fn matches(&self, command: &Command, tx_id: u8) -> Result<(), ProtocolError> {
        if self.tx_id() != tx_id {
            return Err(ProtocolError::EchoMismatch {
                field: "transaction id",
                expected: tx_id,
                actual: self.tx_id(),
            });
        }
        if self.class() != command.class {
            return Err(ProtocolError::EchoMismatch {
                field: "command class",
                expected: command.class,
                actual: self.class(),
            });
        }
        if self.id() != command.id {
            return Err(ProtocolError::EchoMismatch {
                field: "command id",
                expected: command.id,
                actual: self.id(),
            });
        }
        Ok(())
    }
}
