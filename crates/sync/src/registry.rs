//! Parameter registry: per-key codec, default, equality and debounce.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use serde_json::Value;
use urlstate_codec::{Codec, CompressedJsonCodec, JsonCodec, StringCodec};

use crate::equality::EqualityFn;

/// Codec and behaviour of one registered key.
#[derive(Clone)]
pub struct ParamSpec {
	codec: Arc<dyn Codec>,
	default_value: Option<Value>,
	equality: Option<EqualityFn>,
	debounce_history: Option<Duration>,
}

impl ParamSpec {
	pub fn with_codec(codec: impl Codec + 'static) -> Self {
		Self::from_shared(Arc::new(codec))
	}

	pub fn from_shared(codec: Arc<dyn Codec>) -> Self {
		Self {
			codec,
			default_value: None,
			equality: None,
			debounce_history: None,
		}
	}

	/// Passthrough string parameter.
	pub fn string() -> Self {
		Self::with_codec(StringCodec)
	}

	/// JSON-encoded parameter.
	pub fn json() -> Self {
		Self::with_codec(JsonCodec)
	}

	/// Brotli-compressed JSON parameter.
	pub fn compressed_json() -> Self {
		Self::with_codec(CompressedJsonCodec)
	}

	/// Value read when the URL has no usable value for this key.
	#[must_use]
	pub fn default_value(mut self, value: impl Into<Value>) -> Self {
		let value = value.into();
		self.default_value = (!value.is_null()).then_some(value);
		self
	}

	/// Structural comparison for object-like values.
	#[must_use]
	pub fn equality(mut self, equality: impl Fn(&Value, &Value) -> bool + Send + Sync + 'static) -> Self {
		self.equality = Some(Arc::new(equality));
		self
	}

	/// Per-key debounce, overriding the session option.
	#[must_use]
	pub fn debounce(mut self, delay: Duration) -> Self {
		self.debounce_history = Some(delay);
		self
	}

	pub fn codec(&self) -> &Arc<dyn Codec> {
		&self.codec
	}

	pub fn declared_default(&self) -> Option<&Value> {
		self.default_value.as_ref()
	}

	pub fn equality_fn(&self) -> Option<&EqualityFn> {
		self.equality.as_ref()
	}

	pub fn debounce_history(&self) -> Option<Duration> {
		self.debounce_history
	}

	pub fn encode(&self, value: &Value) -> Option<String> {
		self.codec.encode(value)
	}

	pub fn decode(&self, raw: Option<&str>) -> Option<Value> {
		self.codec.decode(raw)
	}
}

impl fmt::Debug for ParamSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ParamSpec")
			.field("default_value", &self.default_value)
			.field("equality", &self.equality.is_some())
			.field("debounce_history", &self.debounce_history)
			.finish_non_exhaustive()
	}
}

/// How a key was declared: a bare flag or a full spec.
#[derive(Debug, Clone)]
pub enum ParamDecl {
	/// Plain string passthrough.
	Flag,
	Spec(ParamSpec),
}

impl ParamDecl {
	fn into_spec(self) -> ParamSpec {
		match self {
			Self::Flag => ParamSpec::string(),
			Self::Spec(spec) => spec,
		}
	}
}

impl From<bool> for ParamDecl {
	fn from(_: bool) -> Self {
		Self::Flag
	}
}

impl From<ParamSpec> for ParamDecl {
	fn from(spec: ParamSpec) -> Self {
		Self::Spec(spec)
	}
}

/// Registered parameters in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ParamRegistry {
	params: IndexMap<String, ParamSpec>,
}

impl ParamRegistry {
	pub fn builder() -> RegistryBuilder {
		RegistryBuilder::default()
	}

	#[inline]
	pub fn get(&self, key: &str) -> Option<&ParamSpec> {
		self.params.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.params.contains_key(key)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.params.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamSpec)> {
		self.params.iter().map(|(key, spec)| (key.as_str(), spec))
	}

	pub fn len(&self) -> usize {
		self.params.len()
	}

	pub fn is_empty(&self) -> bool {
		self.params.is_empty()
	}
}

impl<K: Into<String>, D: Into<ParamDecl>> FromIterator<(K, D)> for ParamRegistry {
	fn from_iter<I: IntoIterator<Item = (K, D)>>(iter: I) -> Self {
		iter.into_iter().fold(RegistryBuilder::default(), |builder, (key, decl)| builder.declare(key, decl)).build()
	}
}

/// Collects declarations; a later declaration of the same key replaces the earlier one.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
	params: IndexMap<String, ParamSpec>,
}

impl RegistryBuilder {
	#[must_use]
	pub fn declare(mut self, key: impl Into<String>, decl: impl Into<ParamDecl>) -> Self {
		self.params.insert(key.into(), decl.into().into_spec());
		self
	}

	#[must_use]
	pub fn flag(self, key: impl Into<String>) -> Self {
		self.declare(key, ParamDecl::Flag)
	}

	#[must_use]
	pub fn param(self, key: impl Into<String>, spec: ParamSpec) -> Self {
		self.declare(key, spec)
	}

	pub fn build(self) -> ParamRegistry {
		ParamRegistry { params: self.params }
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn flags_use_string_passthrough() {
		let registry = ParamRegistry::builder().flag("q").build();
		let spec = registry.get("q").unwrap();
		assert_eq!(spec.decode(Some("hello")), Some(json!("hello")));
		assert_eq!(spec.encode(&json!("hello")).as_deref(), Some("hello"));
		assert!(spec.declared_default().is_none());
	}

	#[test]
	fn declaration_order_is_kept() {
		let registry: ParamRegistry = [("b", ParamDecl::Flag), ("a", ParamSpec::json().into()), ("c", true.into())]
			.into_iter()
			.collect();
		assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
	}

	#[test]
	fn null_default_means_no_default() {
		let spec = ParamSpec::json().default_value(Value::Null);
		assert!(spec.declared_default().is_none());
	}

	#[test]
	fn spec_carries_overrides() {
		let spec = ParamSpec::json().default_value(10).debounce(Duration::from_millis(5)).equality(|_, _| true);
		assert_eq!(spec.declared_default(), Some(&json!(10)));
		assert_eq!(spec.debounce_history(), Some(Duration::from_millis(5)));
		assert!(spec.equality_fn().is_some());
	}
}
