//! `ValueReaderSlice` reads values from a borrowed byte slice.

use super::ValueReader;
use anyhow::{Result, anyhow, bail};
use std::io::{Cursor, Read};

pub struct ValueReaderSlice<'a> {
	cursor: Cursor<&'a [u8]>,
	len: u64,
}

impl<'a> ValueReaderSlice<'a> {
	#[must_use]
	pub fn new(slice: &'a [u8]) -> ValueReaderSlice<'a> {
		ValueReaderSlice {
			len: slice.len() as u64,
			cursor: Cursor::new(slice),
		}
	}
}

impl<'a> ValueReader<'a> for ValueReaderSlice<'a> {
	fn get_reader(&mut self) -> &mut dyn Read {
		&mut self.cursor
	}

	fn len(&self) -> u64 {
		self.len
	}

	fn position(&self) -> u64 {
		self.cursor.position()
	}

	fn get_sub_reader<'b>(&'b mut self, length: u64) -> Result<Box<dyn ValueReader<'b> + 'b>> {
		let start = self.cursor.position();
		if length > self.remaining() {
			bail!(
				"Requested sub-reader length {length} exceeds remaining {} bytes",
				self.remaining()
			);
		}
		let end = start + length;

		let slice: &'a [u8] = *self.cursor.get_ref();
		let sub = slice
			.get(start as usize..end as usize)
			.ok_or_else(|| anyhow!("sub-reader range {start}..{end} out of bounds"))?;
		self.cursor.set_position(end);
		Ok(Box::new(ValueReaderSlice::new(sub)))
	}
}
