//! Argument marshaling into report payloads
//!
//! Commands take heterogeneous arguments (scalars, colors, opcodes, raw
//! blocks). [`ByteArgs`] assembles them into the argument region of a report
//! frame, applying a caller-supplied numeric [`PackFormat`] per call and
//! enforcing the frame's capacity limit up front: an append either fits
//! completely or fails without touching the buffer.

use crate::error::EncodeError;

/// RGB color with one byte per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const BLUE: Self = Self::new(0, 0, 255);
}

/// Byte order for multi-byte numeric packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

/// Numeric field width in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Width {
    #[default]
    U8,
    U16,
    U32,
}

impl Width {
    pub const fn bytes(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
        }
    }
}

/// How a scalar (or color component) is laid out on the wire.
///
/// The default is a single unsigned byte, which is what nearly all
/// commands use for their arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PackFormat {
    pub width: Width,
    pub endian: Endian,
}

impl PackFormat {
    pub const BYTE: Self = Self {
        width: Width::U8,
        endian: Endian::Little,
    };
    pub const SHORT: Self = Self {
        width: Width::U16,
        endian: Endian::Little,
    };
    pub const SHORT_BE: Self = Self {
        width: Width::U16,
        endian: Endian::Big,
    };
    pub const INT: Self = Self {
        width: Width::U32,
        endian: Endian::Little,
    };
}

/// One command argument, tagged by kind.
///
/// Adding a new kind extends this enum and the single `encode_into` match;
/// the compiler then points at every site that needs updating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// Single byte, written directly at the cursor
    Byte(u8),
    /// Unsigned scalar, packed per the caller's [`PackFormat`]
    UInt(u64),
    /// Signed scalar, two's complement in the requested width
    Int(i64),
    /// Enumerated opcode value (enums convert via `Into<Argument>`)
    Opcode(u8),
    /// Color packed component-wise (R, G, B order)
    Color(Rgb),
    /// Row of colors flattened to consecutive R,G,B bytes
    Colors(Vec<Rgb>),
    /// Raw bytes copied verbatim; empty is a no-op
    Bytes(Vec<u8>),
}

impl Argument {
    /// Append this argument's wire representation to `out`.
    fn encode_into(&self, format: PackFormat, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        match self {
            Argument::Byte(b) | Argument::Opcode(b) => out.push(*b),
            Argument::UInt(v) => encode_unsigned(*v, format, out)?,
            Argument::Int(v) => {
                let width = format.width.bytes();
                let min = -(1i64 << (width * 8 - 1));
                let max = (1i64 << (width * 8 - 1)) - 1;
                if *v < min || *v > max {
                    return Err(EncodeError::ValueOverflow {
                        value: *v as u64,
                        width,
                    });
                }
                let mask = if width == 8 { u64::MAX } else { (1u64 << (width * 8)) - 1 };
                encode_unsigned((*v as u64) & mask, format, out)?;
            }
            Argument::Color(c) => {
                for component in [c.r, c.g, c.b] {
                    encode_unsigned(u64::from(component), format, out)?;
                }
            }
            Argument::Colors(row) => {
                for c in row {
                    out.extend_from_slice(&[c.r, c.g, c.b]);
                }
            }
            Argument::Bytes(raw) => out.extend_from_slice(raw),
        }
        Ok(())
    }
}

fn encode_unsigned(value: u64, format: PackFormat, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    let width = format.width.bytes();
    if width < 8 && value >> (width * 8) != 0 {
        return Err(EncodeError::ValueOverflow { value, width });
    }
    let bytes = value.to_le_bytes();
    match format.endian {
        Endian::Little => out.extend_from_slice(&bytes[..width]),
        Endian::Big => out.extend(bytes[..width].iter().rev()),
    }
    Ok(())
}

impl From<u8> for Argument {
    fn from(v: u8) -> Self {
        Argument::Byte(v)
    }
}

impl From<u16> for Argument {
    fn from(v: u16) -> Self {
        Argument::UInt(u64::from(v))
    }
}

impl From<u32> for Argument {
    fn from(v: u32) -> Self {
        Argument::UInt(u64::from(v))
    }
}

impl From<i32> for Argument {
    fn from(v: i32) -> Self {
        Argument::Int(i64::from(v))
    }
}

impl From<Rgb> for Argument {
    fn from(c: Rgb) -> Self {
        Argument::Color(c)
    }
}

impl From<Vec<Rgb>> for Argument {
    fn from(row: Vec<Rgb>) -> Self {
        Argument::Colors(row)
    }
}

impl From<&[u8]> for Argument {
    fn from(raw: &[u8]) -> Self {
        Argument::Bytes(raw.to_vec())
    }
}

impl From<Vec<u8>> for Argument {
    fn from(raw: Vec<u8>) -> Self {
        Argument::Bytes(raw)
    }
}

/// Byte buffer with a write cursor and an optional hard capacity limit.
///
/// Bounded buffers are pre-sized and zero-filled so `as_bytes()` of a
/// partially-written buffer already has the frame's zero padding in place.
/// A single instance is never shared across concurrent operations; the
/// command runner builds a fresh one per invocation.
#[derive(Debug, Clone)]
pub struct ByteArgs {
    buf: Vec<u8>,
    cursor: usize,
    limit: Option<usize>,
}

impl ByteArgs {
    pub fn new(limit: Option<usize>) -> Self {
        let buf = match limit {
            Some(n) => vec![0u8; n],
            None => Vec::new(),
        };
        Self {
            buf,
            cursor: 0,
            limit,
        }
    }

    /// Buffer that refuses to grow past `limit` bytes.
    pub fn bounded(limit: usize) -> Self {
        Self::new(Some(limit))
    }

    /// Buffer with no capacity limit.
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Configured capacity limit, if any.
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// The assembled argument bytes (written region only).
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.cursor]
    }

    /// Reset the cursor and zero the buffer without reallocating.
    pub fn clear(&mut self) -> &mut Self {
        self.buf.fill(0);
        self.cursor = 0;
        self
    }

    /// Append one argument using the default single-byte format.
    pub fn put(&mut self, arg: impl Into<Argument>) -> Result<&mut Self, EncodeError> {
        self.put_with(arg, PackFormat::BYTE)
    }

    /// Append one argument using an explicit numeric format.
    ///
    /// The append is atomic: on [`EncodeError::CapacityExceeded`] neither
    /// the buffer contents nor the cursor have changed.
    pub fn put_with(
        &mut self,
        arg: impl Into<Argument>,
        format: PackFormat,
    ) -> Result<&mut Self, EncodeError> {
        let arg = arg.into();

        // Single-byte arguments skip the scratch encoding entirely.
        if let Argument::Byte(b) | Argument::Opcode(b) = arg {
            self.ensure_space(1)?;
            self.write_at_cursor(&[b]);
            return Ok(self);
        }

        let mut encoded = Vec::new();
        arg.encode_into(format, &mut encoded)?;
        if encoded.is_empty() {
            return Ok(self);
        }
        self.ensure_space(encoded.len())?;
        self.write_at_cursor(&encoded);
        Ok(self)
    }

    /// Append a sequence of arguments, all with the same format.
    pub fn put_all<I>(&mut self, args: I, format: PackFormat) -> Result<&mut Self, EncodeError>
    where
        I: IntoIterator<Item = Argument>,
    {
        for arg in args {
            self.put_with(arg, format)?;
        }
        Ok(self)
    }

    /// Append as a little-endian u16.
    pub fn put_short(&mut self, value: u16) -> Result<&mut Self, EncodeError> {
        self.put_with(value, PackFormat::SHORT)
    }

    /// Append as a little-endian u32.
    pub fn put_int(&mut self, value: u32) -> Result<&mut Self, EncodeError> {
        self.put_with(value, PackFormat::INT)
    }

    fn ensure_space(&mut self, needed: usize) -> Result<(), EncodeError> {
        match self.limit {
            Some(limit) if self.cursor + needed > limit => Err(EncodeError::CapacityExceeded {
                needed,
                used: self.cursor,
                limit,
            }),
            _ => Ok(()),
        }
    }

    fn write_at_cursor(&mut self, bytes: &[u8]) {
        let end = self.cursor + bytes.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.cursor..end].copy_from_slice(bytes);
        self.cursor = end;
    }
}
