//! Reading and rewriting single locations inside a structured value.

use serde_json::Value;

use crate::error::SyncError;
use crate::path::{Path, Seg};

const LENGTH: &str = "length";

/// Longest array a write may produce. Larger arrays cannot round-trip through a URL.
pub(crate) const MAX_ARRAY_LEN: usize = 1 << 16;

/// Reads the member `seg` of `value`.
///
/// Arrays expose their `length` pseudo-field and accept numeric keys.
pub(crate) fn lookup(value: &Value, seg: &Seg) -> Option<Value> {
	match value {
		Value::Object(map) => map.get(&seg.to_key()).cloned(),
		Value::Array(items) if seg.as_key() == Some(LENGTH) => Some(Value::from(items.len())),
		Value::Array(items) => seg.as_index().and_then(|index| items.get(index)).cloned(),
		_ => None,
	}
}

/// Follows `segments` from `value`.
pub(crate) fn resolve<'a>(value: &'a Value, segments: &[Seg]) -> Option<&'a Value> {
	segments.iter().try_fold(value, |current, seg| match current {
		Value::Object(map) => map.get(&seg.to_key()),
		Value::Array(items) => seg.as_index().and_then(|index| items.get(index)),
		_ => None,
	})
}

/// Whether `value` has a member named by `seg`.
pub(crate) fn contains(value: &Value, seg: &Seg) -> bool {
	match value {
		Value::Object(map) => map.contains_key(&seg.to_key()),
		Value::Array(items) => seg.as_key() == Some(LENGTH) || seg.as_index().is_some_and(|index| index < items.len()),
		_ => false,
	}
}

/// Applies one leaf write at `path` inside `root`.
///
/// `None` removes an object field, or stores `null` in an array slot. Writing
/// past the end of an array pads with `null`, and writing `length` truncates or
/// extends.
pub(crate) fn apply(root: &mut Value, path: &Path, value: Option<Value>) -> Result<(), SyncError> {
	let Some((parents, leaf)) = path.split_leaf() else {
		*root = value.unwrap_or(Value::Null);
		return Ok(());
	};

	let mut current = root;
	for seg in parents {
		let next = match current {
			Value::Object(map) => map.get_mut(&seg.to_key()),
			Value::Array(items) => seg.as_index().and_then(|index| items.get_mut(index)),
			_ => None,
		};
		current = next.ok_or_else(|| SyncError::PathNotFound { path: path.to_string() })?;
	}

	match current {
		Value::Object(map) => {
			match value {
				Some(value) => {
					map.insert(leaf.to_key(), value);
				}
				None => {
					map.remove(&leaf.to_key());
				}
			}
			Ok(())
		}
		Value::Array(items) if leaf.as_key() == Some(LENGTH) => {
			let len = value
				.as_ref()
				.and_then(Value::as_u64)
				.and_then(|len| usize::try_from(len).ok())
				.filter(|len| *len <= MAX_ARRAY_LEN)
				.ok_or_else(|| SyncError::InvalidLength {
					value: value.clone().unwrap_or(Value::Null),
				})?;
			items.resize(len, Value::Null);
			Ok(())
		}
		Value::Array(items) => {
			let index = leaf.as_index().ok_or_else(|| SyncError::NotAContainer {
				path: path.to_string(),
				segment: leaf.to_key(),
				kind: "an array",
			})?;
			if index >= items.len() {
				let len = index
					.checked_add(1)
					.filter(|len| *len <= MAX_ARRAY_LEN)
					.ok_or_else(|| SyncError::IndexOutOfRange {
						path: path.to_string(),
						index,
						max: MAX_ARRAY_LEN,
					})?;
				items.resize(len, Value::Null);
			}
			items[index] = value.unwrap_or(Value::Null);
			Ok(())
		}
		other => Err(SyncError::NotAContainer {
			path: path.to_string(),
			segment: leaf.to_key(),
			kind: kind_of(other),
		}),
	}
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use rstest::rstest;
	use serde_json::json;

	use super::*;

	#[test]
	fn sets_nested_object_field() {
		let mut value = json!({"a": {"b": 1}});
		apply(&mut value, &Path::root("k").key("a").key("b"), Some(json!(2))).unwrap();
		assert_eq!(value, json!({"a": {"b": 2}}));
	}

	#[test]
	fn removing_field_drops_it() {
		let mut value = json!({"a": 1, "b": 2});
		apply(&mut value, &Path::root("k").key("a"), None).unwrap();
		assert_eq!(value, json!({"b": 2}));
	}

	#[test]
	fn writing_past_end_pads_with_null() {
		let mut value = json!([1]);
		apply(&mut value, &Path::root("k").index(3), Some(json!(4))).unwrap();
		assert_eq!(value, json!([1, null, null, 4]));
	}

	#[test]
	fn length_truncates_and_extends() {
		let mut value = json!([1, 2, 3]);
		apply(&mut value, &Path::root("k").key("length"), Some(json!(1))).unwrap();
		assert_eq!(value, json!([1]));
		apply(&mut value, &Path::root("k").key("length"), Some(json!(2))).unwrap();
		assert_eq!(value, json!([1, null]));
	}

	#[test]
	fn length_rejects_non_integers() {
		let mut value = json!([1]);
		let err = apply(&mut value, &Path::root("k").key("length"), Some(json!("x"))).unwrap_err();
		assert!(matches!(err, SyncError::InvalidLength { .. }));
	}

	#[rstest]
	#[case(json!(u64::MAX))]
	#[case(json!(1u64 << 40))]
	#[case(json!(MAX_ARRAY_LEN + 1))]
	fn oversized_length_is_rejected(#[case] len: Value) {
		let mut value = json!([1]);
		let err = apply(&mut value, &Path::root("k").key("length"), Some(len)).unwrap_err();
		assert!(matches!(err, SyncError::InvalidLength { .. }));
		assert_eq!(value, json!([1]));
	}

	#[rstest]
	#[case(usize::MAX)]
	#[case(MAX_ARRAY_LEN)]
	fn oversized_index_is_rejected(#[case] index: usize) {
		let mut value = json!([1]);
		let err = apply(&mut value, &Path::root("k").index(index), Some(json!(2))).unwrap_err();
		assert!(matches!(err, SyncError::IndexOutOfRange { max: MAX_ARRAY_LEN, .. }));
		assert_eq!(value, json!([1]));
	}

	#[test]
	fn last_allowed_index_is_accepted() {
		let mut value = json!([]);
		apply(&mut value, &Path::root("k").index(MAX_ARRAY_LEN - 1), Some(json!(1))).unwrap();
		assert_eq!(value.as_array().map(Vec::len), Some(MAX_ARRAY_LEN));
	}

	#[test]
	fn missing_intermediate_is_reported() {
		let mut value = json!({"a": 1});
		let err = apply(&mut value, &Path::root("k").key("b").key("c"), Some(json!(1))).unwrap_err();
		assert_eq!(err.to_string(), "no value at k.b.c");
	}

	#[test]
	fn scalar_parent_is_not_a_container() {
		let mut value = json!({"a": 1});
		let err = apply(&mut value, &Path::root("k").key("a").key("b"), Some(json!(1))).unwrap_err();
		assert!(matches!(err, SyncError::NotAContainer { kind: "a number", .. }));
	}

	#[test]
	fn lookup_exposes_array_length() {
		let value = json!([1, 2]);
		assert_eq!(lookup(&value, &Seg::key("length")), Some(json!(2)));
		assert_eq!(lookup(&value, &Seg::key("1")), Some(json!(2)));
		assert!(contains(&value, &Seg::key("length")));
		assert!(!contains(&value, &Seg::index(2)));
	}

	#[rstest]
	#[case(json!({"a": 1}), Seg::key("a"), true)]
	#[case(json!({"a": 1}), Seg::key("b"), false)]
	#[case(json!({"0": 1}), Seg::index(0), true)]
	#[case(json!(["x"]), Seg::key("0"), true)]
	#[case(json!(["x"]), Seg::index(1), false)]
	#[case(json!("text"), Seg::key("length"), false)]
	fn membership(#[case] value: Value, #[case] seg: Seg, #[case] expected: bool) {
		assert_eq!(contains(&value, &seg), expected);
	}
}
