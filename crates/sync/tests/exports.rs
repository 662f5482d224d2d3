//! Snapshots, typed handles, subscriptions and file configuration.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use serde_json::json;
use urlstate_sync::{MemoryNavigator, Param, ParamRegistry, Path, SessionConfig, SyncOptions};

use common::{client, href_with, registry};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Filters {
	kind: String,
	#[serde(default)]
	ids: Vec<u32>,
}

const PAGE: Param<u32> = Param::new("page");
const FILTERS: Param<Filters> = Param::new("filters");

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn client_snapshot_merges_unknown_keys() {
	let nav = Arc::new(MemoryNavigator::new("/?q=hi&utm_source=mail&page=3"));
	let params = client(&nav, registry(), SyncOptions::default());

	let expected = json!({
		"q": "hi",
		"page": 3,
		"filters": null,
		"tags": null,
		"utm_source": "mail",
	});
	assert_eq!(serde_json::Value::Object(params.snapshot()), expected);
	assert_eq!(serde_json::to_value(&params).unwrap(), expected);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn typed_params_round_trip_through_the_url() {
	let nav = Arc::new(MemoryNavigator::new("/"));
	let params = client(&nav, registry(), SyncOptions::default());
	let filters = Filters {
		kind: "book".to_owned(),
		ids: vec![3, 1],
	};

	params.write(&PAGE, Some(&2)).unwrap();
	params.write(&FILTERS, Some(&filters)).unwrap();
	params.settled().await;

	assert_eq!(nav.navigations().len(), 1);
	assert_eq!(params.read(&PAGE), Some(2));
	assert_eq!(params.read(&FILTERS), Some(filters));

	params.write(&PAGE, None).unwrap();
	params.settled().await;
	assert_eq!(params.read(&PAGE), None);
	assert!(!nav.href().contains("page="));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn subscribers_see_changes_but_not_equal_rewrites() {
	let nav = Arc::new(MemoryNavigator::new(&href_with("filters", &json!({"kind": "book"}))));
	let params = client(&nav, registry(), SyncOptions::default());

	let mut rx = params.subscribe("filters");
	assert_eq!(rx.borrow_and_update().as_deref(), Some(&json!({"kind": "book"})));

	params.set_path(&Path::root("filters").key("kind"), json!("film")).unwrap();
	assert!(rx.has_changed().unwrap());
	assert_eq!(rx.borrow_and_update().as_deref(), Some(&json!({"kind": "film"})));

	params.settled().await;
	assert!(!rx.has_changed().unwrap());

	nav.set_location(&href_with("filters", &json!({"kind": "film"})));
	params.location_changed();
	assert!(!rx.has_changed().unwrap());

	nav.set_location("/");
	params.location_changed();
	assert!(rx.has_changed().unwrap());
	assert_eq!(*rx.borrow_and_update(), None);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn toml_config_builds_a_working_session() {
	let config = SessionConfig::from_toml_str(
		r#"
			[options]
			sort = false

			[params]
			q = true
			page = { codec = "json", default = 1 }

			[params.filters]
			codec = "compressed-json"
		"#,
	)
	.unwrap();
	let registry: ParamRegistry = config.registry();
	assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["q", "page", "filters"]);

	let nav = Arc::new(MemoryNavigator::new("/?z=1"));
	let params = client(&nav, registry, config.options.clone());
	params.set("filters", json!({"kind": "book"}));
	params.set("q", json!("x"));
	params.settled().await;

	let location = nav.href();
	assert!(location.starts_with("/?z=1&filters="), "{location}");
	assert!(location.ends_with("&q=x"), "{location}");
	assert_eq!(params.value("filters").as_deref(), Some(&json!({"kind": "book"})));
}
