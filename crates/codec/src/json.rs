use serde_json::Value;

use crate::{Codec, CodecError};

/// JSON text codec for objects, arrays and typed scalars.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
	/// Decodes `raw`, reporting why it failed.
	pub fn try_decode(&self, raw: &str) -> Result<Value, CodecError> {
		Ok(serde_json::from_str(raw)?)
	}
}

impl Codec for JsonCodec {
	fn encode(&self, value: &Value) -> Option<String> {
		serde_json::to_string(value).ok()
	}

	fn decode(&self, raw: Option<&str>) -> Option<Value> {
		let raw = raw?;
		match self.try_decode(raw) {
			Ok(value) => Some(value),
			Err(error) => {
				tracing::debug!(%error, "json query value rejected");
				None
			}
		}
	}
}
