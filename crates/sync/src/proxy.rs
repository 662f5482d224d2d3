//! Handles into nested objects and arrays.
//!
//! A [`Node`] holds no data of its own. Every read re-resolves the root value
//! and walks the node's path, so a handle taken before a write observes the
//! write. Every write goes through the root navigator bound to the node's root
//! key, which rebuilds the root value and resubmits it as one root write.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::equality::is_object_like;
use crate::error::SyncError;
use crate::mutate;
use crate::path::{Path, Seg};
use crate::session::QueryParams;

/// Result of reading a key or field.
#[derive(Debug, Clone)]
pub enum Entry {
	/// A primitive, copied out.
	Value(Value),
	/// An object or array, read and written through a handle.
	Node(Node),
}

impl Entry {
	pub fn as_value(&self) -> Option<&Value> {
		match self {
			Self::Value(value) => Some(value),
			Self::Node(_) => None,
		}
	}

	pub fn as_node(&self) -> Option<&Node> {
		match self {
			Self::Value(_) => None,
			Self::Node(node) => Some(node),
		}
	}

	pub fn into_node(self) -> Option<Node> {
		match self {
			Self::Value(_) => None,
			Self::Node(node) => Some(node),
		}
	}

	/// Plain value of the entry, resolving nodes to a deep copy.
	pub fn to_value(&self) -> Option<Value> {
		match self {
			Self::Value(value) => Some(value.clone()),
			Self::Node(node) => node.raw(),
		}
	}
}

/// Membership argument for [`QueryParams::has`] and [`Node::has`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
	/// The raw-value escape hatch; always present.
	Raw,
	Seg(Seg),
}

impl From<Seg> for Member {
	fn from(seg: Seg) -> Self {
		Self::Seg(seg)
	}
}

impl From<&str> for Member {
	fn from(key: &str) -> Self {
		Self::Seg(Seg::from(key))
	}
}

impl From<usize> for Member {
	fn from(index: usize) -> Self {
		Self::Seg(Seg::Index(index))
	}
}

/// Write capability bound to one root key.
#[derive(Clone)]
pub(crate) struct RootNavigator {
	root: Arc<str>,
}

impl RootNavigator {
	fn new(root: &str) -> Self {
		Self { root: Arc::from(root) }
	}

	/// Writes `value` at `parents` + `leaf` under the bound root key.
	fn navigate(&self, params: &QueryParams, parents: &[Seg], leaf: Seg, value: Option<Value>) -> Result<(), SyncError> {
		let path = parents
			.iter()
			.cloned()
			.fold(Path::root(&*self.root), |path, seg| path.child(seg))
			.child(leaf);
		tracing::trace!(path = %path, remove = value.is_none(), "nested write");
		params.write_nested(&path, value)
	}
}

/// Live handle to an object or array inside a root value.
#[derive(Clone)]
pub struct Node {
	params: QueryParams,
	navigator: RootNavigator,
	path: Path,
}

impl fmt::Debug for Node {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Node").field(&self.path.to_string()).finish()
	}
}

impl Node {
	pub(crate) fn root(params: QueryParams, key: &str) -> Self {
		Self {
			params,
			navigator: RootNavigator::new(key),
			path: Path::root(key),
		}
	}

	fn child(&self, seg: Seg) -> Self {
		Self {
			params: self.params.clone(),
			navigator: self.navigator.clone(),
			path: self.path.clone().child(seg),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn root_key(&self) -> &str {
		self.path.root_key()
	}

	/// Deep copy of the value this node currently points at.
	pub fn raw(&self) -> Option<Value> {
		let root = self.params.value(self.path.root_key())?;
		mutate::resolve(&root, self.path.segments()).cloned()
	}

	/// Reads a field or element. Arrays also answer `length`.
	pub fn get(&self, seg: impl Into<Seg>) -> Option<Entry> {
		let seg = seg.into();
		let root = self.params.value(self.path.root_key())?;
		let parent = mutate::resolve(&root, self.path.segments())?;
		let value = mutate::lookup(parent, &seg)?;
		Some(if is_object_like(&value) {
			Entry::Node(self.child(seg))
		} else {
			Entry::Value(value)
		})
	}

	/// Writes a field or element. Writing an array's `length` resizes it.
	pub fn set(&self, seg: impl Into<Seg>, value: Value) -> Result<(), SyncError> {
		self.navigator.navigate(&self.params, self.path.segments(), seg.into(), Some(value))
	}

	/// Deletes an object field; on arrays the slot becomes `null`.
	pub fn remove(&self, seg: impl Into<Seg>) -> Result<(), SyncError> {
		self.navigator.navigate(&self.params, self.path.segments(), seg.into(), None)
	}

	/// Appends to an array: one element write followed by a `length` write,
	/// both landing in the same batch.
	pub fn push(&self, value: Value) -> Result<(), SyncError> {
		let len = match self.raw() {
			Some(Value::Array(items)) => items.len(),
			Some(other) => {
				return Err(SyncError::NotAContainer {
					path: self.path.to_string(),
					segment: "push".to_owned(),
					kind: mutate::kind_of(&other),
				});
			}
			None => return Err(SyncError::PathNotFound { path: self.path.to_string() }),
		};
		self.set(len, value)?;
		self.set("length", Value::from(len + 1))
	}

	/// Number of elements or fields.
	pub fn len(&self) -> usize {
		match self.raw() {
			Some(Value::Array(items)) => items.len(),
			Some(Value::Object(fields)) => fields.len(),
			_ => 0,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Field names in order, or indices for arrays.
	pub fn keys(&self) -> Vec<Seg> {
		match self.raw() {
			Some(Value::Array(items)) => (0..items.len()).map(Seg::Index).collect(),
			Some(Value::Object(fields)) => fields.keys().cloned().map(Seg::Key).collect(),
			_ => Vec::new(),
		}
	}

	pub fn has(&self, member: impl Into<Member>) -> bool {
		match member.into() {
			Member::Raw => true,
			Member::Seg(seg) => self.raw().is_some_and(|value| mutate::contains(&value, &seg)),
		}
	}
}
