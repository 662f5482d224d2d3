//! TOML description of a session: options plus the parameter registry.
//!
//! ```toml
//! [options]
//! debounce_history_ms = 0
//! push_history = true
//!
//! [params]
//! q = true
//! page = { codec = "json", default = 1 }
//!
//! [params.filters]
//! codec = "compressed-json"
//! default = []
//! debounce_ms = 300
//! ```

use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SyncError;
use crate::options::SyncOptions;
use crate::registry::{ParamDecl, ParamRegistry, ParamSpec};

/// Built-in codec selectable from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodecKind {
	#[default]
	String,
	Json,
	CompressedJson,
}

/// One `[params.<key>]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamConfig {
	/// `key = true` declares a plain string flag.
	Flag(bool),
	Spec(ParamSpecConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamSpecConfig {
	pub codec: CodecKind,
	pub default: Option<Value>,
	pub debounce_ms: Option<u64>,
}

impl ParamSpecConfig {
	fn to_spec(&self) -> ParamSpec {
		let mut spec = match self.codec {
			CodecKind::String => ParamSpec::string(),
			CodecKind::Json => ParamSpec::json(),
			CodecKind::CompressedJson => ParamSpec::compressed_json(),
		};
		if let Some(default) = &self.default {
			spec = spec.default_value(default.clone());
		}
		if let Some(ms) = self.debounce_ms {
			spec = spec.debounce(Duration::from_millis(ms));
		}
		spec
	}
}

/// Whole-session configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
	pub options: SyncOptions,
	pub params: IndexMap<String, ParamConfig>,
}

impl SessionConfig {
	pub fn from_toml_str(source: &str) -> Result<Self, SyncError> {
		Ok(toml::from_str(source)?)
	}

	/// Builds the registry described by `[params]`, in file order.
	pub fn registry(&self) -> ParamRegistry {
		self.params
			.iter()
			.map(|(key, param)| {
				let decl = match param {
					ParamConfig::Flag(_) => ParamDecl::Flag,
					ParamConfig::Spec(spec) => ParamDecl::Spec(spec.to_spec()),
				};
				(key.clone(), decl)
			})
			.collect()
	}
}
