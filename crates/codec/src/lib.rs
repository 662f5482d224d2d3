//! Codec contract for query parameters.
//!
//! A [`Codec`] maps a structured [`Value`] to the text stored in the query
//! string and back. Decoding is total: malformed input reads as `None` and is
//! never reported to the caller. Encoding may decline to represent a value by
//! returning `None`, which the synchronization engine treats as "remove this
//! key from the query string".

mod compressed;
mod error;
mod func;
mod json;
mod string;

pub use compressed::CompressedJsonCodec;
pub use error::CodecError;
pub use func::FnCodec;
pub use json::JsonCodec;
pub use serde_json::Value;
pub use string::StringCodec;

/// Encode/decode pair for one query parameter.
pub trait Codec: Send + Sync {
	/// Encodes `value` for the query string; `None` removes the key.
	fn encode(&self, value: &Value) -> Option<String>;

	/// Decodes the raw query value. `None` in means `None` out.
	fn decode(&self, raw: Option<&str>) -> Option<Value>;
}

impl<C: Codec + ?Sized> Codec for std::sync::Arc<C> {
	fn encode(&self, value: &Value) -> Option<String> {
		(**self).encode(value)
	}

	fn decode(&self, raw: Option<&str>) -> Option<Value> {
		(**self).decode(raw)
	}
}

impl<C: Codec + ?Sized> Codec for Box<C> {
	fn encode(&self, value: &Value) -> Option<String> {
		(**self).encode(value)
	}

	fn decode(&self, raw: Option<&str>) -> Option<Value> {
		(**self).decode(raw)
	}
}
