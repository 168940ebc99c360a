//! The `ValueReader` trait: varints, fixed width numbers and protobuf framing.
//!
//! Fixed width numbers are little-endian, which is what protobuf uses for
//! `fixed32`/`float` and `fixed64`/`double` fields.

use crate::Blob;
use anyhow::{Context, Result, bail};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Read;

/// Protobuf wire types.
pub const WIRE_VARINT: u8 = 0;
pub const WIRE_FIXED64: u8 = 1;
pub const WIRE_LEN: u8 = 2;
pub const WIRE_FIXED32: u8 = 5;

pub trait ValueReader<'a> {
	/// Returns the underlying byte source.
	fn get_reader(&mut self) -> &mut dyn Read;

	/// Total number of bytes this reader covers.
	fn len(&self) -> u64;

	/// Current read position, relative to the start of this reader.
	fn position(&self) -> u64;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn remaining(&self) -> u64 {
		self.len().saturating_sub(self.position())
	}

	fn has_remaining(&self) -> bool {
		self.remaining() > 0
	}

	/// Reads an unsigned LEB128 varint.
	///
	/// Fails on truncated input and on varints longer than ten bytes.
	fn read_varint(&mut self) -> Result<u64> {
		let mut value = 0u64;
		let mut shift = 0;
		loop {
			let byte = self.get_reader().read_u8().context("Unexpected end of data in varint")?;
			value |= (u64::from(byte) & 0x7F) << shift;
			if byte & 0x80 == 0 {
				break;
			}
			shift += 7;
			if shift >= 70 {
				bail!("Varint too long");
			}
		}
		Ok(value)
	}

	/// Reads a zigzag encoded signed varint.
	fn read_svarint(&mut self) -> Result<i64> {
		let value = self.read_varint()?;
		Ok(((value >> 1) as i64) ^ -((value & 1) as i64))
	}

	fn read_u8(&mut self) -> Result<u8> {
		Ok(self.get_reader().read_u8()?)
	}

	fn read_f32(&mut self) -> Result<f32> {
		Ok(self.get_reader().read_f32::<LittleEndian>()?)
	}

	fn read_f64(&mut self) -> Result<f64> {
		Ok(self.get_reader().read_f64::<LittleEndian>()?)
	}

	fn read_blob(&mut self, length: u64) -> Result<Blob> {
		if length > self.remaining() {
			bail!("Blob length {length} exceeds remaining {} bytes", self.remaining());
		}
		let mut blob = Blob::new_sized(length as usize);
		self.get_reader().read_exact(blob.as_mut_slice())?;
		Ok(blob)
	}

	fn read_string(&mut self, length: u64) -> Result<String> {
		let blob = self.read_blob(length)?;
		String::from_utf8(blob.into_vec()).context("String is not valid UTF-8")
	}

	/// Reads a protobuf key and splits it into `(field_number, wire_type)`.
	fn read_pbf_key(&mut self) -> Result<(u32, u8)> {
		let value = self.read_varint().context("Failed to read varint for PBF key")?;
		Ok(((value >> 3) as u32, (value & 0x07) as u8))
	}

	/// Returns a reader over the next `length` bytes and advances past them.
	fn get_sub_reader<'b>(&'b mut self, length: u64) -> Result<Box<dyn ValueReader<'b> + 'b>>;

	/// Returns a reader over a length-delimited protobuf field.
	fn get_pbf_sub_reader<'b>(&'b mut self) -> Result<Box<dyn ValueReader<'b> + 'b>> {
		let length = self
			.read_varint()
			.context("Failed to read varint for sub-reader length")?;
		self.get_sub_reader(length).context("Failed to get sub-reader")
	}

	fn read_pbf_packed_uint32(&mut self) -> Result<Vec<u32>> {
		let mut reader = self
			.get_pbf_sub_reader()
			.context("Failed to get PBF sub-reader for packed uint32")?;
		let mut values = Vec::new();
		while reader.has_remaining() {
			let value = reader
				.read_varint()
				.context("Failed to read varint for packed uint32")?;
			let Ok(value) = u32::try_from(value) else {
				bail!("Packed value {value} does not fit into uint32");
			};
			values.push(value);
		}
		Ok(values)
	}

	fn read_pbf_string(&mut self) -> Result<String> {
		let length = self.read_varint().context("Failed to read varint for string length")?;
		self.read_string(length).context("Failed to read PBF string")
	}

	fn read_pbf_blob(&mut self) -> Result<Blob> {
		let length = self.read_varint().context("Failed to read varint for blob length")?;
		self.read_blob(length).context("Failed to read PBF blob")
	}
}
