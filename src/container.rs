//! Container parser: magic, version, header block, element payload.
//!
//! Layout of a single-array container:
//!
//! ```text
//! [0]      0x93
//! [1..6]   "NUMPY"
//! [6]      major version (1 or 2)
//! [7]      minor version (0)
//! [8..]    header length — u16 LE for major 1, u32 LE for major 2
//! ...      ASCII header text of that length
//! ...      raw element bytes
//! ```
//!
//! The header-length field width and the resulting text offset are the
//! only behavioral difference between the two supported major versions.

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

use crate::header::{self, Header, HeaderError};

/// Leading magic sequence: one sentinel byte plus the literal `NUMPY`.
pub const MAGIC: [u8; 6] = *b"\x93NUMPY";

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("bad magic bytes 0x{}", hex::encode(.observed))]
    BadMagic { observed: Vec<u8> },
    #[error("unsupported format version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },
    #[error("container truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    #[error(transparent)]
    Header(#[from] HeaderError),
}

/// A parsed container: the header plus the raw, still-undecoded element
/// payload.  The payload is borrowed verbatim from the input buffer; its
/// length is not validated here — the materializer bounds every read by
/// the header's element count.
#[derive(Debug)]
pub struct Container<'a> {
    pub header: Header,
    pub elements_data: &'a [u8],
}

/// Parse a full container buffer.  Any failure aborts the whole parse;
/// there is no partial result.
pub fn parse(bytes: &[u8]) -> Result<Container<'_>, ContainerError> {
    let magic = bytes.get(..6).ok_or_else(|| ContainerError::BadMagic {
        observed: bytes.to_vec(),
    })?;
    if magic != MAGIC.as_slice() {
        return Err(ContainerError::BadMagic { observed: magic.to_vec() });
    }

    let major = *bytes.get(6).ok_or(ContainerError::Truncated {
        needed: 8,
        available: bytes.len(),
    })?;
    let minor = *bytes.get(7).ok_or(ContainerError::Truncated {
        needed: 8,
        available: bytes.len(),
    })?;
    if major != 1 && major != 2 {
        return Err(ContainerError::UnsupportedVersion { major, minor });
    }
    if minor != 0 {
        return Err(ContainerError::UnsupportedVersion { major, minor });
    }

    // Major 1 stores the header length as u16 at offset 8 with the text at
    // 10; major 2 widens the field to u32 and the text starts at 12.
    let (header_len, header_start) = if major == 1 {
        let field = bytes.get(8..10).ok_or(ContainerError::Truncated {
            needed: 10,
            available: bytes.len(),
        })?;
        (LittleEndian::read_u16(field) as usize, 10)
    } else {
        let field = bytes.get(8..12).ok_or(ContainerError::Truncated {
            needed: 12,
            available: bytes.len(),
        })?;
        (LittleEndian::read_u32(field) as usize, 12)
    };

    let header_end = header_start + header_len;
    let header_bytes = bytes
        .get(header_start..header_end)
        .ok_or(ContainerError::Truncated {
            needed: header_end,
            available: bytes.len(),
        })?;

    let header = header::parse(header_bytes)?;

    Ok(Container {
        header,
        elements_data: &bytes[header_end..],
    })
}
