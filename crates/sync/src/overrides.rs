//! Optimistic values for writes whose navigation has not resolved yet.

use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;

/// What a pending write left behind for a key.
#[derive(Debug, Clone)]
pub(crate) enum Pending {
	Set(Arc<Value>),
	Cleared,
}

impl Pending {
	pub fn value(&self) -> Option<Arc<Value>> {
		match self {
			Self::Set(value) => Some(Arc::clone(value)),
			Self::Cleared => None,
		}
	}
}

#[derive(Debug, Clone)]
pub(crate) struct OverrideEntry {
	pub pending: Pending,
	/// Write generation; only the navigation carrying it may clear the entry.
	pub generation: u64,
}

/// Per-session override store. Read before the URL.
#[derive(Debug, Default)]
pub(crate) struct OverrideStore {
	entries: HashMap<String, OverrideEntry>,
	clock: u64,
}

impl OverrideStore {
	/// Records a pending value (or removal) and returns its generation.
	pub fn set(&mut self, key: &str, value: Option<Arc<Value>>) -> u64 {
		self.clock = self.clock.wrapping_add(1);
		let pending = match value {
			Some(value) => Pending::Set(value),
			None => Pending::Cleared,
		};
		self.entries.insert(
			key.to_owned(),
			OverrideEntry {
				pending,
				generation: self.clock,
			},
		);
		self.clock
	}

	pub fn get(&self, key: &str) -> Option<&OverrideEntry> {
		self.entries.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	/// Clears `key` if its entry still carries `generation`.
	pub fn clear_if(&mut self, key: &str, generation: u64) -> bool {
		if self.entries.get(key).is_some_and(|entry| entry.generation == generation) {
			self.entries.remove(key);
			true
		} else {
			false
		}
	}

	#[cfg(test)]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
