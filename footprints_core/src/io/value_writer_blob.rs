//! `ValueWriterBlob` collects written values in memory and yields a [`Blob`].

use super::ValueWriter;
use crate::Blob;
use std::io::{Cursor, Write};

#[derive(Default)]
pub struct ValueWriterBlob {
	cursor: Cursor<Vec<u8>>,
}

impl ValueWriterBlob {
	#[must_use]
	pub fn new() -> ValueWriterBlob {
		ValueWriterBlob::default()
	}

	#[must_use]
	pub fn into_blob(self) -> Blob {
		Blob::from(self.cursor.into_inner())
	}
}

impl ValueWriter for ValueWriterBlob {
	fn get_writer(&mut self) -> &mut dyn Write {
		&mut self.cursor
	}

	fn position(&self) -> u64 {
		self.cursor.position()
	}
}
