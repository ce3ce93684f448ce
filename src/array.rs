//! Type-dispatch materializer: raw payload + header → typed array.
//!
//! One decode arm per element type, selected by an exhaustive match on the
//! header's [`DType`] so the compiler verifies the dispatch table covers
//! every supported type.  Signed integers and floats are bit-pattern
//! reinterpretations of the unsigned word of the same width — exact for
//! NaN payloads, negative zero, subnormals, and two's-complement values.

use ndarray::{ArrayD, IxDyn, ShapeBuilder};
use thiserror::Error;

use crate::codec::{self, CodecError};
use crate::container::Container;
use crate::header::{DType, Header};

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum MaterializeError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("decoded elements do not fit the declared shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

// ── Decoded array ────────────────────────────────────────────────────────────

/// A decoded multi-dimensional array.  One variant per supported element
/// type; the variant always matches the header's declared dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Bool(ArrayD<bool>),
    I8(ArrayD<i8>),
    I16(ArrayD<i16>),
    I32(ArrayD<i32>),
    I64(ArrayD<i64>),
    U8(ArrayD<u8>),
    U16(ArrayD<u16>),
    U32(ArrayD<u32>),
    U64(ArrayD<u64>),
    F32(ArrayD<f32>),
    F64(ArrayD<f64>),
}

impl Array {
    pub fn dtype(&self) -> DType {
        match self {
            Array::Bool(_) => DType::Bool,
            Array::I8(_) => DType::I8,
            Array::I16(_) => DType::I16,
            Array::I32(_) => DType::I32,
            Array::I64(_) => DType::I64,
            Array::U8(_) => DType::U8,
            Array::U16(_) => DType::U16,
            Array::U32(_) => DType::U32,
            Array::U64(_) => DType::U64,
            Array::F32(_) => DType::F32,
            Array::F64(_) => DType::F64,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Array::Bool(a) => a.shape(),
            Array::I8(a) => a.shape(),
            Array::I16(a) => a.shape(),
            Array::I32(a) => a.shape(),
            Array::I64(a) => a.shape(),
            Array::U8(a) => a.shape(),
            Array::U16(a) => a.shape(),
            Array::U32(a) => a.shape(),
            Array::U64(a) => a.shape(),
            Array::F32(a) => a.shape(),
            Array::F64(a) => a.shape(),
        }
    }

    /// Total element count.
    pub fn len(&self) -> usize {
        match self {
            Array::Bool(a) => a.len(),
            Array::I8(a) => a.len(),
            Array::I16(a) => a.len(),
            Array::I32(a) => a.len(),
            Array::I64(a) => a.len(),
            Array::U8(a) => a.len(),
            Array::U16(a) => a.len(),
            Array::U32(a) => a.len(),
            Array::U64(a) => a.len(),
            Array::F32(a) => a.len(),
            Array::F64(a) => a.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Materialization ──────────────────────────────────────────────────────────

/// Decode a container's payload into an [`Array`] of the declared dtype
/// and shape.  Reads exactly `element_count` elements; trailing payload
/// bytes are ignored and a short payload fails with
/// [`CodecError::ShortBuffer`].
pub fn materialize(container: &Container<'_>) -> Result<Array, MaterializeError> {
    let header = &container.header;
    let data = container.elements_data;
    let count = header.element_count();
    let order = header.byte_order;

    Ok(match header.dtype {
        DType::Bool => {
            let raw = codec::read_bytes(data, count)?;
            Array::Bool(shaped(header, raw.into_iter().map(|b| b != 0).collect())?)
        }
        DType::U8 => Array::U8(shaped(header, codec::read_bytes(data, count)?)?),
        DType::I8 => {
            let raw = codec::read_bytes(data, count)?;
            Array::I8(shaped(header, raw.into_iter().map(|b| b as i8).collect())?)
        }
        DType::U16 => {
            Array::U16(shaped(header, codec::decode_words::<u16>(data, count, order)?)?)
        }
        DType::I16 => {
            let words = codec::decode_words::<u16>(data, count, order)?;
            Array::I16(shaped(header, words.into_iter().map(|w| w as i16).collect())?)
        }
        DType::U32 => {
            Array::U32(shaped(header, codec::decode_words::<u32>(data, count, order)?)?)
        }
        DType::I32 => {
            let words = codec::decode_words::<u32>(data, count, order)?;
            Array::I32(shaped(header, words.into_iter().map(|w| w as i32).collect())?)
        }
        DType::U64 => {
            Array::U64(shaped(header, codec::decode_words::<u64>(data, count, order)?)?)
        }
        DType::I64 => {
            let words = codec::decode_words::<u64>(data, count, order)?;
            Array::I64(shaped(header, words.into_iter().map(|w| w as i64).collect())?)
        }
        DType::F32 => {
            let words = codec::decode_words::<u32>(data, count, order)?;
            Array::F32(shaped(header, words.into_iter().map(f32::from_bits).collect())?)
        }
        DType::F64 => {
            let words = codec::decode_words::<u64>(data, count, order)?;
            Array::F64(shaped(header, words.into_iter().map(f64::from_bits).collect())?)
        }
    })
}

/// Apply the header's shape to a flat element buffer.  Fortran-ordered
/// payloads get column-major strides, so the logical array is correct for
/// either layout.
fn shaped<T>(header: &Header, values: Vec<T>) -> Result<ArrayD<T>, ndarray::ShapeError> {
    let dim = IxDyn(&header.shape);
    if header.fortran_order {
        ArrayD::from_shape_vec(dim.f(), values)
    } else {
        ArrayD::from_shape_vec(dim, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Endianness;

    fn container(header: Header, data: &[u8]) -> Container<'_> {
        Container { header, elements_data: data }
    }

    fn header(dtype: DType, order: Endianness, shape: &[usize], fortran: bool) -> Header {
        Header {
            shape: shape.to_vec(),
            dtype,
            byte_order: order,
            fortran_order: fortran,
            descr: String::new(),
        }
    }

    #[test]
    fn f32_row_major_2x3() {
        let mut payload = Vec::new();
        for v in [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0] {
            payload.extend_from_slice(&v.to_le_bytes());
        }
        let c = container(header(DType::F32, Endianness::Little, &[2, 3], false), &payload);
        match materialize(&c).unwrap() {
            Array::F32(a) => {
                assert_eq!(a.shape(), &[2, 3]);
                assert_eq!(a[[0, 0]], 1.0);
                assert_eq!(a[[0, 2]], 3.0);
                assert_eq!(a[[1, 0]], 4.0);
                assert_eq!(a[[1, 2]], 6.0);
            }
            other => panic!("wrong variant: {:?}", other.dtype()),
        }
    }

    #[test]
    fn f32_bit_patterns_survive_exactly() {
        let specials = [f32::NAN.to_bits(), (-0.0f32).to_bits(), 0x0000_0001];
        let mut payload = Vec::new();
        for bits in specials {
            payload.extend_from_slice(&bits.to_le_bytes());
        }
        let c = container(header(DType::F32, Endianness::Little, &[3], false), &payload);
        match materialize(&c).unwrap() {
            Array::F32(a) => {
                assert_eq!(a[[0]].to_bits(), specials[0]);
                assert_eq!(a[[1]].to_bits(), specials[1]);
                assert!(a[[1]].is_sign_negative() && a[[1]] == 0.0);
                assert_eq!(a[[2]].to_bits(), specials[2]);
                assert!(a[[2]].is_subnormal());
            }
            other => panic!("wrong variant: {:?}", other.dtype()),
        }
    }

    #[test]
    fn i64_negative_values_big_endian() {
        let values = [-1i64, i64::MIN, 42];
        let mut payload = Vec::new();
        for v in values {
            payload.extend_from_slice(&v.to_be_bytes());
        }
        let c = container(header(DType::I64, Endianness::Big, &[3], false), &payload);
        match materialize(&c).unwrap() {
            Array::I64(a) => {
                assert_eq!(a[[0]], -1);
                assert_eq!(a[[1]], i64::MIN);
                assert_eq!(a[[2]], 42);
            }
            other => panic!("wrong variant: {:?}", other.dtype()),
        }
    }

    #[test]
    fn bool_is_nonzero_byte() {
        let c = container(
            header(DType::Bool, Endianness::NotApplicable, &[4], false),
            &[0, 1, 2, 255],
        );
        match materialize(&c).unwrap() {
            Array::Bool(a) => {
                assert_eq!(a.as_slice().unwrap(), &[false, true, true, true][..]);
            }
            other => panic!("wrong variant: {:?}", other.dtype()),
        }
    }

    #[test]
    fn i8_reinterprets_raw_bytes() {
        let c = container(
            header(DType::I8, Endianness::NotApplicable, &[2], false),
            &[0xFF, 0x7F],
        );
        match materialize(&c).unwrap() {
            Array::I8(a) => assert_eq!(a.as_slice().unwrap(), &[-1i8, 127][..]),
            other => panic!("wrong variant: {:?}", other.dtype()),
        }
    }

    #[test]
    fn fortran_order_transposes_the_layout() {
        let payload: Vec<u8> = (1u8..=6).flat_map(|v| (v as i32).to_le_bytes()).collect();
        let f = container(header(DType::I32, Endianness::Little, &[2, 3], true), &payload);
        let c = container(header(DType::I32, Endianness::Little, &[3, 2], false), &payload);
        let (f, c) = match (materialize(&f).unwrap(), materialize(&c).unwrap()) {
            (Array::I32(f), Array::I32(c)) => (f, c),
            _ => panic!("wrong variants"),
        };
        // Column-major: the first index varies fastest in memory.
        assert_eq!(f[[0, 0]], 1);
        assert_eq!(f[[1, 0]], 2);
        assert_eq!(f[[0, 1]], 3);
        // The same payload read row-major with the transposed shape is the
        // transpose of the Fortran-order array.
        assert_eq!(f, c.t());
    }

    #[test]
    fn scalar_shape_decodes_one_element() {
        let payload = 7.5f64.to_le_bytes();
        let c = container(header(DType::F64, Endianness::Little, &[], false), &payload);
        let a = materialize(&c).unwrap();
        assert_eq!(a.shape(), &[] as &[usize]);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn truncated_payload_is_a_decode_error() {
        let c = container(header(DType::U32, Endianness::Little, &[4], false), &[0; 10]);
        let err = materialize(&c).unwrap_err();
        assert!(matches!(
            err,
            MaterializeError::Codec(CodecError::ShortBuffer { needed: 16, available: 10 })
        ));
    }

    #[test]
    fn trailing_payload_bytes_are_ignored() {
        let mut payload = vec![1, 0, 2, 0];
        payload.extend_from_slice(b"junk");
        let c = container(header(DType::U16, Endianness::Little, &[2], false), &payload);
        match materialize(&c).unwrap() {
            Array::U16(a) => assert_eq!(a.as_slice().unwrap(), &[1u16, 2][..]),
            other => panic!("wrong variant: {:?}", other.dtype()),
        }
    }
}
