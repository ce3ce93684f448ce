//! Scalar codec: fixed-width word decoding with explicit byte order.
//!
//! # Byte-order rules
//! Every multi-byte element in an array file is decoded through this module
//! with an explicit [`Endianness`] tag taken from the header descriptor:
//!   - `Big` and `Little` decode through `byteorder`'s fixed-order readers,
//!     so the result is identical on every host architecture.
//!   - `Host` defers to the running machine's native order.
//!   - `NotApplicable` is the tag single-byte descriptors carry (`|`); the
//!     multi-byte decoder rejects it and callers take the raw-byte path.
//!
//! No byte order is ever negotiated or guessed at runtime; the descriptor
//! in the file is authoritative.
//!
//! # Short buffers
//! Decoding is strict: a buffer that cannot cover `count` whole elements
//! fails with [`CodecError::ShortBuffer`] rather than yielding a shorter
//! result. Trailing bytes beyond `count * width` are ignored.

use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian};
use thiserror::Error;

// ── Endianness tag ───────────────────────────────────────────────────────────

/// Byte order declared by a type descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// `=` — native order of the running machine.
    Host,
    /// `>` — big-endian, most significant byte first.
    Big,
    /// `<` — little-endian, least significant byte first.
    Little,
    /// `|` — single-byte elements, order has no meaning.
    NotApplicable,
}

impl Endianness {
    /// The descriptor symbol this tag was parsed from (diagnostics only).
    pub fn symbol(self) -> char {
        match self {
            Endianness::Host => '=',
            Endianness::Big => '>',
            Endianness::Little => '<',
            Endianness::NotApplicable => '|',
        }
    }
}

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("element buffer too short: need {needed} bytes, have {available}")]
    ShortBuffer { needed: usize, available: usize },
    #[error("byte order is not applicable to multi-byte decoding")]
    ByteOrderNotApplicable,
    #[error("element count {count} overflows at width {width}")]
    Overflow { count: usize, width: usize },
}

// ── Word trait ───────────────────────────────────────────────────────────────

/// A fixed-width unsigned word that can be read from a byte chunk in any
/// byte order. Signed and floating-point values are derived by
/// reinterpreting the bit pattern of the same-width word, never by
/// arithmetic conversion.
pub trait Word: Copy {
    const WIDTH: usize;
    fn read<B: ByteOrder>(chunk: &[u8]) -> Self;
}

impl Word for u16 {
    const WIDTH: usize = 2;
    fn read<B: ByteOrder>(chunk: &[u8]) -> Self {
        B::read_u16(chunk)
    }
}

impl Word for u32 {
    const WIDTH: usize = 4;
    fn read<B: ByteOrder>(chunk: &[u8]) -> Self {
        B::read_u32(chunk)
    }
}

impl Word for u64 {
    const WIDTH: usize = 8;
    fn read<B: ByteOrder>(chunk: &[u8]) -> Self {
        B::read_u64(chunk)
    }
}

// ── Decoders ─────────────────────────────────────────────────────────────────

/// Decode exactly `count` words of type `W` from the front of `buf`.
///
/// Bytes past `count * W::WIDTH` are ignored. `Endianness::NotApplicable`
/// is an error; single-byte elements go through [`read_bytes`].
pub fn decode_words<W: Word>(
    buf: &[u8],
    count: usize,
    order: Endianness,
) -> Result<Vec<W>, CodecError> {
    let needed = count
        .checked_mul(W::WIDTH)
        .ok_or(CodecError::Overflow { count, width: W::WIDTH })?;
    if buf.len() < needed {
        return Err(CodecError::ShortBuffer { needed, available: buf.len() });
    }

    let read: fn(&[u8]) -> W = match order {
        Endianness::Host => W::read::<NativeEndian>,
        Endianness::Big => W::read::<BigEndian>,
        Endianness::Little => W::read::<LittleEndian>,
        Endianness::NotApplicable => return Err(CodecError::ByteOrderNotApplicable),
    };

    Ok(buf[..needed].chunks_exact(W::WIDTH).map(read).collect())
}

/// Copy exactly `count` raw bytes from the front of `buf`.
///
/// The single-byte counterpart of [`decode_words`]; no swapping is
/// possible, so no byte-order tag is taken.
pub fn read_bytes(buf: &[u8], count: usize) -> Result<Vec<u8>, CodecError> {
    if buf.len() < count {
        return Err(CodecError::ShortBuffer { needed: count, available: buf.len() });
    }
    Ok(buf[..count].to_vec())
}
