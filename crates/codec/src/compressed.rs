use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

use crate::{Codec, CodecError};

const BUFFER_SIZE: usize = 4096;
const QUALITY: u32 = 9;
const WINDOW_BITS: u32 = 22;

/// JSON text compressed with brotli and carried as unpadded URL-safe base64.
///
/// Keeps large structured values short and free of characters that need
/// percent-escaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompressedJsonCodec;

impl CompressedJsonCodec {
	/// Compresses and encodes already-serialized JSON text.
	pub fn compress(&self, json: &str) -> Result<String, CodecError> {
		let mut writer = brotli::CompressorWriter::new(Vec::new(), BUFFER_SIZE, QUALITY, WINDOW_BITS);
		writer.write_all(json.as_bytes())?;
		writer.flush()?;
		let compressed = writer.into_inner();
		Ok(URL_SAFE_NO_PAD.encode(compressed))
	}

	/// Reverses [`Self::compress`] and parses the JSON text.
	pub fn try_decode(&self, raw: &str) -> Result<Value, CodecError> {
		let compressed = URL_SAFE_NO_PAD.decode(raw)?;
		let mut json = Vec::new();
		brotli::Decompressor::new(compressed.as_slice(), BUFFER_SIZE).read_to_end(&mut json)?;
		Ok(serde_json::from_slice(&json)?)
	}
}

impl Codec for CompressedJsonCodec {
	fn encode(&self, value: &Value) -> Option<String> {
		let json = serde_json::to_string(value).ok()?;
		match self.compress(&json) {
			Ok(encoded) => Some(encoded),
			Err(error) => {
				tracing::warn!(%error, "failed to compress query value");
				None
			}
		}
	}

	fn decode(&self, raw: Option<&str>) -> Option<Value> {
		let raw = raw.filter(|raw| !raw.is_empty())?;
		match self.try_decode(raw) {
			Ok(value) => Some(value),
			Err(error) => {
				tracing::debug!(%error, "compressed query value rejected");
				None
			}
		}
	}
}
