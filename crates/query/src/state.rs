use std::fmt;

use url::form_urlencoded;

/// Ordered key/value pairs of a URL query component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
	pairs: Vec<(String, String)>,
}

impl QueryState {
	/// Creates an empty query.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a query component, with or without its leading `?`.
	pub fn parse(search: &str) -> Self {
		let search = search.strip_prefix('?').unwrap_or(search);
		let pairs = form_urlencoded::parse(search.as_bytes())
			.map(|(key, value)| (key.into_owned(), value.into_owned()))
			.collect();
		Self { pairs }
	}

	/// Returns the first value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Returns every value stored under `key`, in order.
	pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
		self.pairs.iter().filter(move |(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	pub fn contains(&self, key: &str) -> bool {
		self.pairs.iter().any(|(k, _)| k == key)
	}

	/// Sets `key` to `value`.
	///
	/// The first existing pair is overwritten in place and any further pairs
	/// with the same key are dropped. A missing key is appended.
	pub fn set(&mut self, key: &str, value: impl Into<String>) {
		let value = value.into();
		match self.pairs.iter().position(|(k, _)| k == key) {
			Some(first) => {
				self.pairs[first].1 = value;
				let mut index = 0;
				self.pairs.retain(|(k, _)| {
					let keep = index <= first || k != key;
					index += 1;
					keep
				});
			}
			None => self.pairs.push((key.to_owned(), value)),
		}
	}

	/// Appends a pair without touching existing ones.
	pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.pairs.push((key.into(), value.into()));
	}

	/// Removes every pair stored under `key`.
	pub fn delete(&mut self, key: &str) {
		self.pairs.retain(|(k, _)| k != key);
	}

	/// Stable sort by key, comparing UTF-16 code units like `URLSearchParams::sort`.
	pub fn sort(&mut self) {
		self.pairs.sort_by(|(a, _), (b, _)| a.encode_utf16().cmp(b.encode_utf16()));
	}

	/// Iterates keys in order; repeated keys are yielded once per pair.
	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.pairs.iter().map(|(k, _)| k.as_str())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}
}

impl fmt::Display for QueryState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let encoded = form_urlencoded::Serializer::new(String::new()).extend_pairs(self.pairs.iter()).finish();
		f.write_str(&encoded)
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryState {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
		}
	}
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
