use std::fmt;

use serde_json::Value;

use crate::Codec;

type EncodeFn = dyn Fn(&Value) -> Option<String> + Send + Sync;
type DecodeFn = dyn Fn(Option<&str>) -> Option<Value> + Send + Sync;

/// Codec assembled from an encode closure and a decode closure.
///
/// The decode closure is expected to be total; returning `None` is the only
/// way to signal malformed input.
pub struct FnCodec {
	encode: Box<EncodeFn>,
	decode: Box<DecodeFn>,
}

impl FnCodec {
	pub fn new<E, D>(encode: E, decode: D) -> Self
	where
		E: Fn(&Value) -> Option<String> + Send + Sync + 'static,
		D: Fn(Option<&str>) -> Option<Value> + Send + Sync + 'static,
	{
		Self {
			encode: Box::new(encode),
			decode: Box::new(decode),
		}
	}
}

impl fmt::Debug for FnCodec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FnCodec").finish_non_exhaustive()
	}
}

impl Codec for FnCodec {
	fn encode(&self, value: &Value) -> Option<String> {
		(self.encode)(value)
	}

	fn decode(&self, raw: Option<&str>) -> Option<Value> {
		(self.decode)(raw)
	}
}
