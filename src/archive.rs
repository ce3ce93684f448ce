//! High-level read API — the primary embedding surface.
//!
//! ```no_run
//! use npyread::archive;
//!
//! // Single container, keyed by the file stem.
//! let arrays = archive::read_file("weights.npy")?;
//!
//! // Packed archive: one entry per array, keyed by entry path.
//! let arrays = archive::read_file("bundle.npz")?;
//! for (name, array) in &arrays {
//!     println!("{name}: {:?} {:?}", array.dtype(), array.shape());
//! }
//! # Ok::<(), npyread::ReadError>(())
//! ```
//!
//! Packed mode degrades rather than aborts: an entry that fails to extract
//! or decode is logged at `warn` and omitted, and the remaining entries
//! still decode.  Only an unreadable top-level source (bad path, corrupt
//! archive directory) fails the whole call.

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use thiserror::Error;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::array::{self, Array, MaterializeError};
use crate::container::{self, ContainerError};

/// Key used for the single-container case when the caller supplies none.
pub const DEFAULT_NAME: &str = "npy";
/// File extension that selects packed mode in [`read_file`].
pub const PACKED_EXTENSION: &str = "npz";

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    Container(#[from] ContainerError),
    #[error(transparent)]
    Materialize(#[from] MaterializeError),
}

// ── EntrySource ──────────────────────────────────────────────────────────────

/// Archive access seam: list regular-file entries, extract one entry's
/// decompressed bytes.  Keeps the decoder independent of any concrete
/// compression implementation.
pub trait EntrySource {
    /// Entry paths in enumeration order.  Directories and symlinks are
    /// not listed.
    fn entries(&mut self) -> Result<Vec<String>, ReadError>;

    /// The decompressed contents of one entry.
    fn extract(&mut self, path: &str) -> Result<Vec<u8>, ReadError>;
}

/// [`EntrySource`] over a zip-style archive.
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> ZipSource<R> {
    /// Open an archive.  Fails if the central directory cannot be read —
    /// that is a whole-source failure, not a per-entry one.
    pub fn new(reader: R) -> Result<Self, ReadError> {
        Ok(Self { archive: ZipArchive::new(reader)? })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn entries(&mut self) -> Result<Vec<String>, ReadError> {
        let mut names = Vec::new();
        for i in 0..self.archive.len() {
            let entry = self.archive.by_index(i)?;
            if entry.is_file() && !entry.is_symlink() {
                names.push(entry.name().to_owned());
            }
        }
        Ok(names)
    }

    fn extract(&mut self, path: &str) -> Result<Vec<u8>, ReadError> {
        let mut entry = self.archive.by_name(path)?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

// ── Read operations ──────────────────────────────────────────────────────────

/// Decode a byte buffer.
///
/// Unpacked: the whole buffer is one container, keyed by `default_name`.
/// Packed: the buffer is a zip archive of containers, keyed by entry path.
pub fn read_bytes(
    bytes: &[u8],
    packed: bool,
    default_name: &str,
) -> Result<HashMap<String, Array>, ReadError> {
    if packed {
        let mut source = ZipSource::new(Cursor::new(bytes))?;
        read_source(&mut source)
    } else {
        let parsed = container::parse(bytes)?;
        let array = array::materialize(&parsed)?;
        let mut out = HashMap::with_capacity(1);
        out.insert(default_name.to_owned(), array);
        Ok(out)
    }
}

/// Decode every entry of an archive source into a name → array map.
///
/// The map may be partial: entries that fail to extract or decode are
/// logged and omitted.  Duplicate entry names resolve last-write-wins in
/// enumeration order.
pub fn read_source(source: &mut dyn EntrySource) -> Result<HashMap<String, Array>, ReadError> {
    let names = source.entries()?;
    let mut buffers = Vec::with_capacity(names.len());
    for name in names {
        match source.extract(&name) {
            Ok(bytes) => buffers.push((name, bytes)),
            Err(err) => {
                warn!(entry = %name, error = %err, "failed to extract archive entry, skipping");
            }
        }
    }
    Ok(decode_buffers(buffers))
}

/// Decode a file path, resolving packed mode from the `npz` extension and
/// the default name from the file stem.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<HashMap<String, Array>, ReadError> {
    read_file_with(path, None)
}

/// [`read_file`] with the extension sniffing overridable by the caller.
pub fn read_file_with<P: AsRef<Path>>(
    path: P,
    packed: Option<bool>,
) -> Result<HashMap<String, Array>, ReadError> {
    let path = path.as_ref();
    let packed = packed.unwrap_or_else(|| {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PACKED_EXTENSION))
    });
    let default_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(DEFAULT_NAME)
        .to_owned();

    debug!(path = %path.display(), packed, "reading array file");
    let bytes = fs::read(path)?;
    read_bytes(&bytes, packed, &default_name)
}

// ── Per-entry decode ─────────────────────────────────────────────────────────

fn decode_one(name: &str, bytes: &[u8]) -> Option<Array> {
    let result = container::parse(bytes)
        .map_err(ReadError::from)
        .and_then(|parsed| array::materialize(&parsed).map_err(ReadError::from));
    match result {
        Ok(array) => Some(array),
        Err(err) => {
            warn!(entry = %name, error = %err, "failed to decode archive entry, omitting");
            None
        }
    }
}

/// Merge order is the enumeration order of `buffers` regardless of how
/// the decode work is scheduled, so duplicate names overwrite
/// reproducibly.
#[cfg(feature = "parallel")]
fn decode_buffers(buffers: Vec<(String, Vec<u8>)>) -> HashMap<String, Array> {
    use rayon::prelude::*;

    let decoded: Vec<(String, Option<Array>)> = buffers
        .into_par_iter()
        .map(|(name, bytes)| {
            let array = decode_one(&name, &bytes);
            (name, array)
        })
        .collect();

    decoded
        .into_iter()
        .filter_map(|(name, array)| array.map(|a| (name, a)))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn decode_buffers(buffers: Vec<(String, Vec<u8>)>) -> HashMap<String, Array> {
    buffers
        .into_iter()
        .filter_map(|(name, bytes)| decode_one(&name, &bytes).map(|a| (name, a)))
        .collect()
}
