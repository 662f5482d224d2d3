//! Addresses inside a root value.

use std::fmt;

/// One step into an object or array.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Seg {
	/// Object field, or the `length` pseudo-field of an array.
	Key(String),
	/// Array element.
	Index(usize),
}

impl Seg {
	pub fn key(key: impl Into<String>) -> Self {
		Self::Key(key.into())
	}

	pub fn index(index: usize) -> Self {
		Self::Index(index)
	}

	pub fn as_key(&self) -> Option<&str> {
		match self {
			Self::Key(key) => Some(key),
			Self::Index(_) => None,
		}
	}

	/// Array position named by this segment, accepting canonical decimal keys
	/// (`"0"`, `"12"`) but not `"+1"` or `"01"`.
	pub fn as_index(&self) -> Option<usize> {
		match self {
			Self::Key(key) => {
				let canonical = key.bytes().all(|b| b.is_ascii_digit()) && (key == "0" || !key.starts_with('0'));
				if canonical { key.parse().ok() } else { None }
			}
			Self::Index(index) => Some(*index),
		}
	}

	/// Field name named by this segment, rendering indices as decimal keys.
	pub fn to_key(&self) -> String {
		match self {
			Self::Key(key) => key.clone(),
			Self::Index(index) => index.to_string(),
		}
	}
}

impl fmt::Display for Seg {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Key(key) => write!(f, ".{key}"),
			Self::Index(index) => write!(f, "[{index}]"),
		}
	}
}

impl From<&str> for Seg {
	fn from(key: &str) -> Self {
		Self::Key(key.to_owned())
	}
}

impl From<String> for Seg {
	fn from(key: String) -> Self {
		Self::Key(key)
	}
}

impl From<usize> for Seg {
	fn from(index: usize) -> Self {
		Self::Index(index)
	}
}

/// A root key plus the segments leading into its value.
///
/// # Examples
///
/// ```
/// use urlstate_sync::Path;
///
/// let path = Path::root("filters").key("tags").index(0);
/// assert_eq!(path.to_string(), "filters.tags[0]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
	root: String,
	segments: Vec<Seg>,
}

impl Path {
	/// Path of a root key itself.
	pub fn root(key: impl Into<String>) -> Self {
		Self {
			root: key.into(),
			segments: Vec::new(),
		}
	}

	#[must_use]
	pub fn key(self, key: impl Into<String>) -> Self {
		self.child(Seg::Key(key.into()))
	}

	#[must_use]
	pub fn index(self, index: usize) -> Self {
		self.child(Seg::Index(index))
	}

	#[must_use]
	pub fn child(mut self, seg: impl Into<Seg>) -> Self {
		self.segments.push(seg.into());
		self
	}

	pub fn root_key(&self) -> &str {
		&self.root
	}

	pub fn segments(&self) -> &[Seg] {
		&self.segments
	}

	pub fn is_root(&self) -> bool {
		self.segments.is_empty()
	}

	/// Splits into the parent segments and the final segment.
	pub fn split_leaf(&self) -> Option<(&[Seg], &Seg)> {
		self.segments.split_last().map(|(leaf, parents)| (parents, leaf))
	}
}

impl fmt::Display for Path {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.root)?;
		for seg in &self.segments {
			write!(f, "{seg}")?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("0", Some(0))]
	#[case("12", Some(12))]
	#[case("+1", None)]
	#[case("01", None)]
	#[case("00", None)]
	#[case("", None)]
	#[case("-1", None)]
	#[case("1e2", None)]
	#[case("a", None)]
	fn numeric_keys_must_be_canonical(#[case] key: &str, #[case] expected: Option<usize>) {
		assert_eq!(Seg::key(key).as_index(), expected);
	}

	#[test]
	fn display_joins_segments() {
		let path = Path::root("f").key("a").index(2);
		assert_eq!(path.to_string(), "f.a[2]");
		assert_eq!(path.split_leaf().map(|(parents, leaf)| (parents.len(), leaf.clone())), Some((1, Seg::Index(2))));
	}
}
