//! Declared defaults and writing them back to the URL.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use urlstate_sync::{Location, MemoryNavigator, ParamRegistry, ParamSpec, QueryParams, SyncOptions};

use common::client;

fn registry() -> ParamRegistry {
	ParamRegistry::builder()
		.param("page", ParamSpec::json().default_value(1))
		.param("sort", ParamSpec::string().default_value("relevance"))
		.build()
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn defaults_are_written_back_when_shown() {
	let nav = Arc::new(MemoryNavigator::new("/list#top"));
	let params = client(&nav, registry(), SyncOptions::default());

	assert_eq!(params.value("page").as_deref(), Some(&json!(1)));
	assert_eq!(params.value("sort").as_deref(), Some(&json!("relevance")));
	assert!(params.has_pending_work());
	params.settled().await;

	assert_eq!(nav.navigations().len(), 1);
	assert_eq!(nav.href(), "/list?page=1&sort=relevance#top");
	assert_eq!(params.value("page").as_deref(), Some(&json!(1)));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn defaults_stay_local_when_hidden() {
	let nav = Arc::new(MemoryNavigator::new("/list"));
	let params = client(&nav, registry(), SyncOptions::default().show_defaults(false));

	assert_eq!(params.value("page").as_deref(), Some(&json!(1)));
	assert!(!params.has_pending_work());
	params.settled().await;

	assert!(nav.navigations().is_empty());
	assert_eq!(nav.href(), "/list");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn url_value_beats_default() {
	let nav = Arc::new(MemoryNavigator::new("/?page=4"));
	let params = client(&nav, registry(), SyncOptions::default());

	assert_eq!(params.value("page").as_deref(), Some(&json!(4)));
	params.value("sort");
	params.settled().await;
	assert_eq!(nav.href(), "/?page=4&sort=relevance");
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn undecodable_value_falls_back_to_default() {
	let nav = Arc::new(MemoryNavigator::new("/?page=%7Bbroken"));
	let params = client(&nav, registry(), SyncOptions::default().show_defaults(false));

	assert_eq!(params.value("page").as_deref(), Some(&json!(1)));
	assert_eq!(nav.href(), "/?page=%7Bbroken");
}

#[test]
fn server_never_writes_defaults_back() {
	let params = QueryParams::server(registry(), Location::parse("/list"), SyncOptions::default());

	assert_eq!(params.value("page").as_deref(), Some(&json!(1)));
	assert!(!params.has_pending_work());
	assert_eq!(params.location().href(), "/list");
}

#[test]
fn null_in_the_url_reads_as_the_default() {
	let params = QueryParams::server(registry(), Location::parse("/?page=null"), SyncOptions::default());
	assert_eq!(params.value("page").as_deref(), Some(&json!(1)));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn null_in_the_url_is_replaced_by_the_shown_default() {
	let nav = Arc::new(MemoryNavigator::new("/?page=null&sort=name"));
	let params = client(&nav, registry(), SyncOptions::default());

	assert_eq!(params.value("page").as_deref(), Some(&json!(1)));
	params.settled().await;
	assert_eq!(nav.href(), "/?page=1&sort=name");

	let hidden = Arc::new(MemoryNavigator::new("/?page=null"));
	let params = client(&hidden, registry(), SyncOptions::default().show_defaults(false));
	assert_eq!(params.value("page").as_deref(), Some(&json!(1)));
	params.settled().await;
	assert_eq!(hidden.href(), "/?page=null");
}
