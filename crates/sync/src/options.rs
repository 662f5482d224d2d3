use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::SyncError;

/// Session-wide navigation behaviour.
///
/// Deserializes from a TOML table where every field is optional:
///
/// ```toml
/// debounce_history_ms = 250
/// push_history = false
/// sort = true
/// show_defaults = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncOptions {
	/// Delay between a key's last write and its navigation. Zero commits on the next flush.
	#[serde(rename = "debounce_history_ms", deserialize_with = "deserialize_millis")]
	pub debounce_history: Duration,
	/// Push a new history entry instead of replacing the current one.
	pub push_history: bool,
	/// Sort query keys before committing.
	pub sort: bool,
	/// Write declared defaults into the URL when they are first observed.
	pub show_defaults: bool,
}

impl Default for SyncOptions {
	fn default() -> Self {
		Self {
			debounce_history: Duration::ZERO,
			push_history: true,
			sort: true,
			show_defaults: true,
		}
	}
}

impl SyncOptions {
	pub fn from_toml_str(source: &str) -> Result<Self, SyncError> {
		Ok(toml::from_str(source)?)
	}

	#[must_use]
	pub fn debounce_history(mut self, delay: Duration) -> Self {
		self.debounce_history = delay;
		self
	}

	#[must_use]
	pub fn push_history(mut self, push: bool) -> Self {
		self.push_history = push;
		self
	}

	#[must_use]
	pub fn sort(mut self, sort: bool) -> Self {
		self.sort = sort;
		self
	}

	#[must_use]
	pub fn show_defaults(mut self, show: bool) -> Self {
		self.show_defaults = show;
		self
	}
}

pub(crate) fn deserialize_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
	u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn empty_table_yields_defaults() {
		assert_eq!(SyncOptions::from_toml_str("").unwrap(), SyncOptions::default());
	}

	#[test]
	fn fields_override_defaults() {
		let options = SyncOptions::from_toml_str("debounce_history_ms = 250\npush_history = false").unwrap();
		assert_eq!(options.debounce_history, Duration::from_millis(250));
		assert!(!options.push_history);
		assert!(options.sort);
		assert!(options.show_defaults);
	}

	#[test]
	fn unknown_fields_are_rejected() {
		let err = SyncOptions::from_toml_str("debounce = 1").unwrap_err();
		assert!(matches!(err, SyncError::Config(_)));
	}
}
