//! Synchronization session: the root of the proxied state tree.
//!
//! All mutable state lives in one [`SessionState`] behind a mutex. Public
//! operations lock it once, do their synchronous work and release it before
//! any `.await`. Spawned work (the zero-delay flush, debounce timers and
//! navigations) re-locks on wake-up and checks its generation first.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;
use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::{Notify, watch};
use urlstate_codec::{Codec, StringCodec};
use urlstate_query::{Location, QueryState};

use crate::batcher::{self, Batcher, Mutation, PendingNavigation};
use crate::equality::{EqualityGate, is_object_like};
use crate::error::SyncError;
use crate::mutate;
use crate::navigator::Navigator;
use crate::options::SyncOptions;
use crate::overrides::OverrideStore;
use crate::path::Path;
use crate::proxy::{Entry, Member, Node};
use crate::registry::{ParamRegistry, ParamSpec};
use crate::typed::Param;

enum Context {
	/// Live client: writes navigate.
	Client { navigator: Arc<dyn Navigator>, runtime: Handle },
	/// Non-interactive render of a fixed location: writes are no-ops.
	Server { location: Location },
}

/// What a cached value was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
	Override(u64),
	Url(Option<String>),
}

struct Computed {
	source: Source,
	value: Option<Arc<Value>>,
}

#[derive(Default)]
struct SessionState {
	overrides: OverrideStore,
	gate: EqualityGate,
	batch: Batcher,
	computed: HashMap<String, Computed>,
	subscribers: HashMap<String, watch::Sender<Option<Arc<Value>>>>,
}

struct Inner {
	registry: Arc<ParamRegistry>,
	options: SyncOptions,
	context: Context,
	state: Mutex<SessionState>,
	/// Serializes navigations.
	commit_turn: tokio::sync::Mutex<()>,
	idle: Notify,
}

/// A synchronization session over one URL.
///
/// Cheap to clone; clones share state. Each session owns its own batch,
/// debounce timers and overrides, so independent sessions never interfere.
#[derive(Clone)]
pub struct QueryParams {
	inner: Arc<Inner>,
}

impl fmt::Debug for QueryParams {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("QueryParams")
			.field("client", &self.is_client())
			.field("params", &self.inner.registry.len())
			.field("options", &self.inner.options)
			.finish_non_exhaustive()
	}
}

impl QueryParams {
	/// Creates a live session. Must be called from inside a current-thread
	/// tokio runtime, which then drives flushes, debounce timers and navigations.
	pub fn client(registry: impl Into<Arc<ParamRegistry>>, navigator: Arc<dyn Navigator>, options: SyncOptions) -> Result<Self, SyncError> {
		let runtime = Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
		if runtime.runtime_flavor() != RuntimeFlavor::CurrentThread {
			return Err(SyncError::MultiThreadRuntime);
		}
		Ok(Self::with_context(registry.into(), options, Context::Client { navigator, runtime }))
	}

	/// Creates a session over a fixed location, for non-interactive rendering.
	pub fn server(registry: impl Into<Arc<ParamRegistry>>, location: Location, options: SyncOptions) -> Self {
		Self::with_context(registry.into(), options, Context::Server { location })
	}

	fn with_context(registry: Arc<ParamRegistry>, options: SyncOptions, context: Context) -> Self {
		Self {
			inner: Arc::new(Inner {
				registry,
				options,
				context,
				state: Mutex::new(SessionState::default()),
				commit_turn: tokio::sync::Mutex::new(()),
				idle: Notify::new(),
			}),
		}
	}

	pub fn registry(&self) -> &ParamRegistry {
		&self.inner.registry
	}

	pub fn options(&self) -> &SyncOptions {
		&self.inner.options
	}

	pub fn is_client(&self) -> bool {
		matches!(self.inner.context, Context::Client { .. })
	}

	/// The live location (client) or the fixed one (server).
	pub fn location(&self) -> Location {
		match &self.inner.context {
			Context::Client { navigator, .. } => navigator.location(),
			Context::Server { location } => location.clone(),
		}
	}

	/// Resolved root value of `key`: override, then URL, then default.
	///
	/// Object-like values keep their previous `Arc` while they compare equal.
	pub fn value(&self, key: &str) -> Option<Arc<Value>> {
		let location = self.location();
		let mut state = self.inner.state.lock();
		self.resolve_locked(&mut state, key, &location.query)
	}

	/// Reads a root key, wrapping objects and arrays in a [`Node`].
	pub fn get(&self, key: &str) -> Option<Entry> {
		let value = self.value(key)?;
		Some(if is_object_like(&value) {
			Entry::Node(Node::root(self.clone(), key))
		} else {
			Entry::Value(Value::clone(&value))
		})
	}

	/// Reads any location; an empty path reads the root key.
	pub fn get_path(&self, path: &Path) -> Option<Entry> {
		let Some((parents, leaf)) = path.split_leaf() else {
			return self.get(path.root_key());
		};
		let parent = Path::root(path.root_key());
		let parent = parents.iter().cloned().fold(parent, |path, seg| path.child(seg));
		match self.get_path(&parent)? {
			Entry::Node(node) => node.get(leaf.clone()),
			Entry::Value(_) => None,
		}
	}

	/// Writes a root key. `null` removes the key, like [`Self::remove`].
	pub fn set(&self, key: &str, value: Value) {
		self.write_root(key, Some(value));
	}

	/// Removes a root key from the query string.
	pub fn remove(&self, key: &str) {
		self.write_root(key, None);
	}

	/// Writes any location; nested writes rebuild and resubmit the root value.
	pub fn set_path(&self, path: &Path, value: Value) -> Result<(), SyncError> {
		if path.is_root() {
			self.set(path.root_key(), value);
			return Ok(());
		}
		self.write_nested(path, Some(value))
	}

	/// Removes an object field or nulls an array slot; an empty path removes the key.
	pub fn remove_path(&self, path: &Path) -> Result<(), SyncError> {
		if path.is_root() {
			self.remove(path.root_key());
			return Ok(());
		}
		self.write_nested(path, None)
	}

	/// Reads a typed parameter. A value that does not deserialize reads as `None`.
	pub fn read<T: DeserializeOwned>(&self, param: &Param<T>) -> Option<T> {
		let value = self.value(param.key())?;
		match T::deserialize(&*value) {
			Ok(typed) => Some(typed),
			Err(error) => {
				tracing::debug!(key = param.key(), %error, "typed read rejected value");
				None
			}
		}
	}

	/// Writes a typed parameter; `None` removes it.
	pub fn write<T: Serialize>(&self, param: &Param<T>, value: Option<&T>) -> Result<(), SyncError> {
		let key = param.key();
		match value {
			Some(value) => {
				let value = serde_json::to_value(value).map_err(|source| SyncError::Serialize {
					key: key.to_owned(),
					source,
				})?;
				self.set(key, value);
			}
			None => self.remove(key),
		}
		Ok(())
	}

	/// Membership: the escape hatch is always present; keys are present when
	/// registered, pending locally, or in the current query.
	pub fn has(&self, member: impl Into<Member>) -> bool {
		let key = match member.into() {
			Member::Raw => return true,
			Member::Seg(seg) => seg.to_key(),
		};
		if self.inner.registry.contains(&key) || self.inner.state.lock().overrides.contains(&key) {
			return true;
		}
		self.location().query.contains(&key)
	}

	/// Escape hatch: the values computed so far, without decoding anything.
	pub fn raw(&self) -> Map<String, Value> {
		let state = self.inner.state.lock();
		state
			.computed
			.iter()
			.filter_map(|(key, computed)| computed.value.as_ref().map(|value| (key.clone(), Value::clone(value))))
			.collect()
	}

	/// Full structured export.
	///
	/// Every registered key is resolved (absent keys export as `null`). On the
	/// client, query keys the registry does not know are merged in as strings.
	pub fn snapshot(&self) -> Map<String, Value> {
		let location = self.location();
		let mut values = Map::new();
		{
			let mut state = self.inner.state.lock();
			for key in self.inner.registry.keys() {
				let value = self.resolve_locked(&mut state, key, &location.query);
				values.insert(key.to_owned(), value.map_or(Value::Null, |value| Value::clone(&value)));
			}
		}
		if self.is_client() {
			for (key, raw) in location.query.iter() {
				if !values.contains_key(key) {
					values.insert(key.to_owned(), Value::String(raw.to_owned()));
				}
			}
		}
		values
	}

	/// Subscribes to the resolved value of `key`.
	///
	/// The receiver is updated when overrides change, navigations resolve or
	/// [`Self::location_changed`] is called, unless the equality gate keeps the
	/// previous value.
	pub fn subscribe(&self, key: &str) -> watch::Receiver<Option<Arc<Value>>> {
		let location = self.location();
		let mut state = self.inner.state.lock();
		let current = self.resolve_locked(&mut state, key, &location.query);
		match state.subscribers.get(key) {
			Some(sender) => {
				sender.send_if_modified(|value| replace_if_changed(value, current));
				sender.subscribe()
			}
			None => {
				let (sender, receiver) = watch::channel(current);
				state.subscribers.insert(key.to_owned(), sender);
				receiver
			}
		}
	}

	/// Tells the session the URL changed outside of it.
	pub fn location_changed(&self) {
		let location = self.location();
		let mut state = self.inner.state.lock();
		self.publish_all_locked(&mut state, &location.query);
	}

	/// True while a batch, debounce timer or navigation is outstanding.
	pub fn has_pending_work(&self) -> bool {
		!self.inner.state.lock().batch.is_idle()
	}

	/// Resolves once every queued write has been navigated (or has failed).
	pub async fn settled(&self) {
		loop {
			let mut notified = std::pin::pin!(self.inner.idle.notified());
			notified.as_mut().enable();
			if !self.has_pending_work() {
				return;
			}
			notified.await;
		}
	}

	fn spec(&self, key: &str) -> Option<&ParamSpec> {
		self.inner.registry.get(key)
	}

	fn codec(&self, key: &str) -> Arc<dyn Codec> {
		match self.spec(key) {
			Some(spec) => Arc::clone(spec.codec()),
			None => Arc::new(StringCodec),
		}
	}

	/// Decodes a URL value. A decoded `null` reads as absent so the default applies.
	fn decode(&self, key: &str, raw: Option<&str>) -> Option<Value> {
		let value = match self.spec(key) {
			Some(spec) => spec.decode(raw),
			None => StringCodec.decode(raw),
		};
		value.filter(|value| !value.is_null())
	}

	fn materializes_defaults(&self) -> bool {
		self.is_client() && self.inner.options.show_defaults
	}

	fn resolve_locked(&self, state: &mut SessionState, key: &str, query: &QueryState) -> Option<Arc<Value>> {
		let spec = self.spec(key);
		let mut source = match state.overrides.get(key) {
			Some(entry) => Source::Override(entry.generation),
			None => Source::Url(query.get(key).map(str::to_owned)),
		};
		if let Some(computed) = state.computed.get(key)
			&& computed.source == source
		{
			return computed.value.clone();
		}

		let base = match state.overrides.get(key) {
			Some(entry) => entry.pending.value(),
			None => self.decode(key, query.get(key)).map(Arc::new),
		};
		let value = match (base, spec.and_then(ParamSpec::declared_default)) {
			(Some(value), _) => Some(value),
			(None, Some(default)) => {
				let default = Arc::new(default.clone());
				if self.materializes_defaults() {
					tracing::trace!(key = %key, "writing default back to the URL");
					source = Source::Override(self.schedule_locked(state, key, Some(Arc::clone(&default))));
				}
				Some(default)
			}
			(None, None) => None,
		};

		let value = state.gate.admit(key, value, spec.and_then(ParamSpec::equality_fn));
		state.computed.insert(key.to_owned(), Computed { source, value: value.clone() });
		value
	}

	/// Records an override and queues the matching mutation. Returns the
	/// override generation.
	fn schedule_locked(&self, state: &mut SessionState, key: &str, value: Option<Arc<Value>>) -> u64 {
		let value = value.filter(|value| !value.is_null());
		let generation = state.overrides.set(key, value.clone());
		state.computed.remove(key);
		let flush = state.batch.enqueue(Mutation {
			key: key.to_owned(),
			value,
			codec: self.codec(key),
			generation,
			debounce: self.debounce(key),
		});
		tracing::trace!(key = %key, generation, flush, "write queued");

		let this = self.clone();
		self.spawn(async move { this.flush(flush).await });
		generation
	}

	fn debounce(&self, key: &str) -> std::time::Duration {
		self.spec(key)
			.and_then(ParamSpec::debounce_history)
			.unwrap_or(self.inner.options.debounce_history)
	}

	fn spawn<F>(&self, task: F)
	where
		F: Future<Output = ()> + Send + 'static,
	{
		if let Context::Client { runtime, .. } = &self.inner.context {
			runtime.spawn(task);
		}
	}

	fn write_root(&self, key: &str, value: Option<Value>) {
		if !self.is_client() {
			tracing::trace!(key = %key, "write ignored outside a client session");
			return;
		}
		let location = self.location();
		let mut state = self.inner.state.lock();
		self.schedule_locked(&mut state, key, value.map(Arc::new));
		self.publish_locked(&mut state, key, &location.query);
	}

	/// Root navigator body: rebuilds the current root value with one leaf
	/// changed and resubmits it as a root write.
	pub(crate) fn write_nested(&self, path: &Path, value: Option<Value>) -> Result<(), SyncError> {
		if !self.is_client() {
			return Ok(());
		}
		let key = path.root_key();
		let location = self.location();
		let mut state = self.inner.state.lock();
		let current = self
			.resolve_locked(&mut state, key, &location.query)
			.ok_or_else(|| SyncError::PathNotFound { path: path.to_string() })?;
		let mut next = Value::clone(&current);
		mutate::apply(&mut next, path, value)?;
		self.schedule_locked(&mut state, key, Some(Arc::new(next)));
		self.publish_locked(&mut state, key, &location.query);
		Ok(())
	}

	async fn flush(self, generation: u64) {
		let immediate = {
			let mut state = self.inner.state.lock();
			let Some(pending) = state.batch.take_pending(generation) else {
				return;
			};
			let (immediate, debounced): (Vec<_>, Vec<_>) = pending.into_iter().partition(|mutation| mutation.debounce.is_zero());

			for mutation in debounced {
				let delay = mutation.debounce;
				let key = mutation.key.clone();
				let slot = state.batch.arm_debounce(mutation);
				tracing::trace!(key = %key, slot, ?delay, "debounce armed");
				let this = self.clone();
				self.spawn(async move {
					tokio::time::sleep(delay).await;
					this.fire_debounce(key, slot).await;
				});
			}

			if !immediate.is_empty() {
				state.batch.begin_navigation();
			}
			immediate
		};

		if immediate.is_empty() {
			self.notify_if_idle();
		} else {
			self.commit(immediate).await;
		}
	}

	async fn fire_debounce(self, key: String, slot: u64) {
		let mutation = {
			let mut state = self.inner.state.lock();
			let Some(mutation) = state.batch.take_debounced(&key, slot) else {
				return;
			};
			state.batch.begin_navigation();
			mutation
		};
		self.commit(vec![mutation]).await;
	}

	/// Applies `mutations` to the live query and navigates.
	///
	/// Commits run one at a time, and the query is read only once this commit's
	/// turn has come, so a commit never builds on a URL that an earlier
	/// in-flight navigation is about to replace.
	async fn commit(&self, mutations: Vec<Mutation>) {
		let Context::Client { navigator, .. } = &self.inner.context else {
			return;
		};
		let _turn = self.inner.commit_turn.lock().await;

		let location = navigator.location();
		let mut query = location.query.clone();
		let committed = batcher::apply_all(&mut query, &mutations);
		let PendingNavigation { request, committed } = PendingNavigation::new(query, &location.hash, &self.inner.options, committed);
		tracing::debug!(to = %request.target, keys = committed.len(), "navigating");

		let result = navigator.navigate(request).await;
		let location = navigator.location();
		{
			let mut state = self.inner.state.lock();
			state.batch.end_navigation();
			match result {
				Ok(()) => {
					for (key, generation) in &committed {
						if state.overrides.clear_if(key, *generation) {
							state.computed.remove(key);
						}
					}
					self.publish_all_locked(&mut state, &location.query);
				}
				Err(error) => {
					tracing::warn!(%error, "navigation failed; local overrides kept");
				}
			}
		}
		self.notify_if_idle();
	}

	fn notify_if_idle(&self) {
		if !self.has_pending_work() {
			self.inner.idle.notify_waiters();
		}
	}

	fn publish_locked(&self, state: &mut SessionState, key: &str, query: &QueryState) {
		if !state.subscribers.get(key).is_some_and(|sender| sender.receiver_count() > 0) {
			return;
		}
		let value = self.resolve_locked(state, key, query);
		if let Some(sender) = state.subscribers.get(key) {
			sender.send_if_modified(|current| replace_if_changed(current, value));
		}
	}

	fn publish_all_locked(&self, state: &mut SessionState, query: &QueryState) {
		let keys: Vec<String> = state.subscribers.keys().cloned().collect();
		for key in keys {
			self.publish_locked(state, &key, query);
		}
	}
}

/// Stores `next` unless it is the same `Arc` or an equal primitive.
fn replace_if_changed(current: &mut Option<Arc<Value>>, next: Option<Arc<Value>>) -> bool {
	let same = match (current.as_ref(), next.as_ref()) {
		(None, None) => true,
		(Some(a), Some(b)) => Arc::ptr_eq(a, b) || (!is_object_like(a) && a == b),
		_ => false,
	};
	if !same {
		*current = next;
	}
	!same
}

impl Serialize for QueryParams {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		self.snapshot().serialize(serializer)
	}
}
