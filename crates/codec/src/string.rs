use serde_json::Value;

use crate::Codec;

/// Passthrough codec used for flag-declared and unregistered keys.
///
/// Strings are stored verbatim. Decoding never produces anything but a JSON
/// string, and an empty raw value reads as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCodec;

impl Codec for StringCodec {
	fn encode(&self, value: &Value) -> Option<String> {
		match value {
			Value::Null => None,
			Value::String(s) => Some(s.clone()),
			Value::Bool(b) => Some(b.to_string()),
			Value::Number(n) => Some(n.to_string()),
			Value::Array(_) | Value::Object(_) => Some(value.to_string()),
		}
	}

	fn decode(&self, raw: Option<&str>) -> Option<Value> {
		match raw {
			None | Some("") => None,
			Some(raw) => Some(Value::String(raw.to_owned())),
		}
	}
}
