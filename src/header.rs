//! Header parser for the textual metadata block of an array file.
//!
//! The header is an ASCII, Python-dict-literal-like string carrying three
//! keys: `descr` (type descriptor), `fortran_order`, and `shape`.  The
//! producer format is fixed and regular, so the parse is a tolerant
//! positional tokenization — split on commas and spaces, the value token
//! immediately follows its key token — not a general dict parser.

use thiserror::Error;

use crate::codec::Endianness;

// ── Element types ────────────────────────────────────────────────────────────

/// Two-character type codes recognised in a descriptor, paired with their
/// [`DType`].  Containment matching requires the code set to stay free of
/// substring collisions; this set is.
const TYPE_CODES: [(&str, DType); 11] = [
    ("b1", DType::Bool),
    ("u1", DType::U8),
    ("u2", DType::U16),
    ("u4", DType::U32),
    ("u8", DType::U64),
    ("i1", DType::I8),
    ("i2", DType::I16),
    ("i4", DType::I32),
    ("i8", DType::I64),
    ("f4", DType::F32),
    ("f8", DType::F64),
];

/// Element data type declared by a header descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn byte_width(self) -> usize {
        match self {
            DType::Bool | DType::I8 | DType::U8 => 1,
            DType::I16 | DType::U16 => 2,
            DType::I32 | DType::U32 | DType::F32 => 4,
            DType::I64 | DType::U64 | DType::F64 => 8,
        }
    }

    /// The two-character descriptor code (diagnostics only).
    pub fn code(self) -> &'static str {
        match self {
            DType::Bool => "b1",
            DType::U8 => "u1",
            DType::U16 => "u2",
            DType::U32 => "u4",
            DType::U64 => "u8",
            DType::I8 => "i1",
            DType::I16 => "i2",
            DType::I32 => "i4",
            DType::I64 => "i8",
            DType::F32 => "f4",
            DType::F64 => "f8",
        }
    }

    fn from_descr(descr: &str) -> Option<Self> {
        TYPE_CODES
            .iter()
            .find(|(code, _)| descr.contains(code))
            .map(|&(_, dtype)| dtype)
    }
}

fn endianness_from_descr(descr: &str) -> Option<Endianness> {
    [
        Endianness::Host,
        Endianness::Big,
        Endianness::Little,
        Endianness::NotApplicable,
    ]
    .into_iter()
    .find(|order| descr.contains(order.symbol()))
}

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("header is not ASCII text")]
    NotAscii,
    #[error("missing required header key '{0}'")]
    MissingKey(&'static str),
    #[error("unknown endian type in descriptor '{0}'")]
    UnknownEndian(String),
    #[error("unsupported dtype in descriptor '{0}'")]
    UnsupportedDtype(String),
    #[error("shape not found in header")]
    ShapeNotFound,
    #[error("shape contains invalid integer '{0}'")]
    InvalidShapeInteger(String),
}

// ── Header ───────────────────────────────────────────────────────────────────

/// Parsed array-file header.  Constructed once from validated input and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Header {
    /// Dimension sizes, outer-to-inner.
    pub shape: Vec<usize>,
    pub dtype: DType,
    pub byte_order: Endianness,
    /// Column-major (Fortran) element layout.
    pub fortran_order: bool,
    /// Descriptor token as found in the header, quotes stripped.
    pub descr: String,
}

impl Header {
    /// Number of elements the payload declares.  An empty shape is a
    /// scalar and counts as one element.
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Parse raw header bytes into a [`Header`].
pub fn parse(raw: &[u8]) -> Result<Header, HeaderError> {
    if !raw.is_ascii() {
        return Err(HeaderError::NotAscii);
    }
    let text = std::str::from_utf8(raw).map_err(|_| HeaderError::NotAscii)?;

    let tokens: Vec<&str> = text.split([',', ' ']).filter(|t| !t.is_empty()).collect();

    let descr = value_after(&tokens, "descr").ok_or(HeaderError::MissingKey("descr"))?;
    let byte_order = endianness_from_descr(descr)
        .ok_or_else(|| HeaderError::UnknownEndian(descr.to_string()))?;
    let dtype = DType::from_descr(descr)
        .ok_or_else(|| HeaderError::UnsupportedDtype(descr.to_string()))?;

    let order_token =
        value_after(&tokens, "fortran_order").ok_or(HeaderError::MissingKey("fortran_order"))?;
    let fortran_order = order_token.contains("True");

    let shape = parse_shape(text)?;

    Ok(Header {
        shape,
        dtype,
        byte_order,
        fortran_order,
        descr: descr.trim_matches('\'').trim_matches('"').to_string(),
    })
}

/// The token immediately following the one containing `key`.
fn value_after<'a>(tokens: &[&'a str], key: &str) -> Option<&'a str> {
    let at = tokens.iter().position(|t| t.contains(key))?;
    tokens.get(at + 1).copied()
}

/// Shape tuple: the text between the first `(` and the `)` that follows it,
/// split on commas.  Empty entries are dropped, which tolerates the
/// trailing comma of single-element tuples.
fn parse_shape(text: &str) -> Result<Vec<usize>, HeaderError> {
    let open = text.find('(').ok_or(HeaderError::ShapeNotFound)?;
    let inner = &text[open + 1..];
    let close = inner.find(')').ok_or(HeaderError::ShapeNotFound)?;

    inner[..close]
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<usize>()
                .map_err(|_| HeaderError::InvalidShapeInteger(t.to_string()))
        })
        .collect()
}
