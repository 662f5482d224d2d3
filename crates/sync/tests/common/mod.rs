//! Shared helpers for session integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Semaphore;
use urlstate_sync::{
	Location, MemoryNavigator, NavigationError, NavigationRequest, Navigator, ParamRegistry, ParamSpec, QueryParams, QueryState, SyncOptions,
};

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// `q` is a plain string flag, `page` a JSON number, `filters` and `tags`
/// JSON containers.
pub fn registry() -> ParamRegistry {
	ParamRegistry::builder()
		.flag("q")
		.param("page", ParamSpec::json())
		.param("filters", ParamSpec::json())
		.param("tags", ParamSpec::json())
		.build()
}

pub fn client(navigator: &Arc<MemoryNavigator>, registry: ParamRegistry, options: SyncOptions) -> QueryParams {
	init_tracing();
	QueryParams::client(registry, navigator.clone(), options).expect("tests run inside a runtime")
}

/// `/?key=<json>` with the value percent-encoded like a real URL.
pub fn href_with(key: &str, value: &Value) -> String {
	let mut query = QueryState::new();
	query.set(key, value.to_string());
	format!("/?{query}")
}

/// Yields until `done` holds.
pub async fn until(mut done: impl FnMut() -> bool) {
	while !done() {
		tokio::task::yield_now().await;
	}
}

/// Navigator that parks every navigation until a permit is released.
pub struct GatedNavigator {
	pub inner: MemoryNavigator,
	gate: Semaphore,
	started: AtomicUsize,
}

impl GatedNavigator {
	pub fn new(href: &str) -> Self {
		Self {
			inner: MemoryNavigator::new(href),
			gate: Semaphore::new(0),
			started: AtomicUsize::new(0),
		}
	}

	pub fn release(&self, count: usize) {
		self.gate.add_permits(count);
	}

	/// Navigations that reached the gate so far.
	pub fn started(&self) -> usize {
		self.started.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl Navigator for GatedNavigator {
	fn location(&self) -> Location {
		self.inner.location()
	}

	async fn navigate(&self, request: NavigationRequest) -> Result<(), NavigationError> {
		self.started.fetch_add(1, Ordering::SeqCst);
		let permit = self.gate.acquire().await.map_err(|e| NavigationError {
			target: request.target.clone(),
			reason: e.to_string(),
		})?;
		permit.forget();
		self.inner.navigate(request).await
	}
}
