//! Transparent gzip handling for tile payloads.
//!
//! Vector tile services frequently deliver tiles gzip-compressed without a
//! `Content-Encoding` header, so the payload itself has to be sniffed.

use crate::Blob;
use anyhow::{Context, Result};
use flate2::bufread::{GzDecoder, GzEncoder};
use std::io::Read;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Returns `true` if the blob starts with the gzip magic bytes.
pub fn is_gzip(blob: &Blob) -> bool {
	blob.as_slice().starts_with(&GZIP_MAGIC)
}

/// Compresses data using Gzip.
pub fn compress_gzip(blob: &Blob) -> Result<Blob> {
	let mut encoder = GzEncoder::new(blob.as_slice(), flate2::Compression::best());
	let mut compressed_data = Vec::new();
	encoder
		.read_to_end(&mut compressed_data)
		.context("Failed to compress data using Gzip")?;
	Ok(Blob::from(compressed_data))
}

/// Decompresses Gzip data.
pub fn decompress_gzip(blob: &Blob) -> Result<Blob> {
	let mut decoder = GzDecoder::new(blob.as_slice());
	let mut decompressed_data = Vec::new();
	decoder
		.read_to_end(&mut decompressed_data)
		.context("Failed to decompress data using Gzip")?;
	Ok(Blob::from(decompressed_data))
}

/// Inflates the blob if it is gzip-compressed, otherwise returns it unchanged.
pub fn decompress_if_gzip(blob: Blob) -> Result<Blob> {
	if is_gzip(&blob) {
		log::trace!("payload of {} bytes is gzip-compressed", blob.len());
		decompress_gzip(&blob)
	} else {
		Ok(blob)
	}
}
