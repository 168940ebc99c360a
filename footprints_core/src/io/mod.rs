//! Readers and writers for protobuf-framed values.
//!
//! `ValueReaderSlice` walks a borrowed byte slice and hands out bounded sub-readers for
//! embedded messages. `ValueWriterBlob` is its counterpart and produces a `Blob`.

mod value_reader;
mod value_reader_slice;
mod value_writer;
mod value_writer_blob;

pub use value_reader::*;
pub use value_reader_slice::*;
pub use value_writer::*;
pub use value_writer_blob::*;
