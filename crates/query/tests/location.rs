use pretty_assertions::assert_eq;
use urlstate_query::{Location, QueryState};

#[test]
fn parse_splits_path_query_and_hash() {
	let location = Location::parse("/search?q=rust&page=2#results");
	assert_eq!(location.path, "/search");
	assert_eq!(location.query.get("q"), Some("rust"));
	assert_eq!(location.query.get("page"), Some("2"));
	assert_eq!(location.hash, "#results");
}

#[test]
fn question_mark_inside_hash_stays_in_hash() {
	let location = Location::parse("/p#frag?not=query");
	assert!(location.query.is_empty());
	assert_eq!(location.hash, "#frag?not=query");
}

#[test]
fn href_omits_empty_query() {
	let location = Location::parse("/only#h");
	assert_eq!(location.search(), "");
	assert_eq!(location.href(), "/only#h");
}

#[test]
fn relative_target_keeps_path_and_takes_hash_from_target() {
	let current = Location::parse("/list?old=1#top");
	let next = current.with_target("?new=2#top");
	assert_eq!(next.path, "/list");
	assert_eq!(next.query, QueryState::parse("new=2"));
	assert_eq!(next.hash, "#top");
	assert_eq!(next.href(), "/list?new=2#top");
}

#[test]
fn bare_question_mark_target_clears_query() {
	let current = Location::parse("/list?old=1");
	let next = current.with_target("?");
	assert!(next.query.is_empty());
	assert_eq!(next.href(), "/list");
}
