use std::fmt;

use crate::QueryState;

/// A navigable location: path, query and hash fragment.
///
/// `hash` keeps its leading `#` (or is empty), matching `window.location.hash`,
/// so it can be appended verbatim to a navigation target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
	pub path: String,
	pub query: QueryState,
	pub hash: String,
}

impl Location {
	/// Parses an href such as `/search?q=rust#results` or `https://host/p?q=1`.
	pub fn parse(href: &str) -> Self {
		let (rest, hash) = match href.find('#') {
			Some(at) => (&href[..at], href[at..].to_owned()),
			None => (href, String::new()),
		};
		let (path, search) = match rest.find('?') {
			Some(at) => (&rest[..at], &rest[at..]),
			None => (rest, ""),
		};
		Self {
			path: path.to_owned(),
			query: QueryState::parse(search),
			hash,
		}
	}

	/// Renders `?query`, or the empty string when there is no query.
	pub fn search(&self) -> String {
		if self.query.is_empty() { String::new() } else { format!("?{}", self.query) }
	}

	/// Reassembles the full href.
	pub fn href(&self) -> String {
		format!("{}{}{}", self.path, self.search(), self.hash)
	}

	/// Resolves a navigation target against this location.
	///
	/// Targets starting with `?` or `#` keep the current path; anything else is
	/// parsed as a full href.
	pub fn with_target(&self, target: &str) -> Self {
		if target.starts_with('?') {
			let next = Self::parse(target);
			Self { path: self.path.clone(), ..next }
		} else if target.starts_with('#') {
			Self {
				hash: target.to_owned(),
				..self.clone()
			}
		} else {
			Self::parse(target)
		}
	}
}

impl fmt::Display for Location {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.href())
	}
}
