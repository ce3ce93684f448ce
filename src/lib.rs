pub mod codec;
pub mod header;
pub mod container;
pub mod array;
pub mod archive;

pub use codec::Endianness;
pub use header::{DType, Header};
pub use container::{Container, parse as parse_container};
pub use array::{Array, materialize};
pub use archive::{read_bytes, read_file, read_file_with, read_source, EntrySource, ReadError, ZipSource};
