//! Pending mutations, the shared flush generation and per-key debounce slots.
//!
//! The batcher only does bookkeeping. The session spawns the zero-delay flush
//! task and the debounce timers, and each spawned task carries the generation
//! it was armed with. A task whose generation is no longer current exits
//! without effect, so re-arming never needs to abort anything.

use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap as HashMap;
use serde_json::Value;
use urlstate_codec::Codec;
use urlstate_query::QueryState;

use crate::navigator::{HistoryMode, NavigationRequest};
use crate::options::SyncOptions;

/// One queued root write. Applying it twice leaves the query unchanged.
#[derive(Clone)]
pub(crate) struct Mutation {
	pub key: String,
	pub value: Option<Arc<Value>>,
	pub codec: Arc<dyn Codec>,
	/// Override generation this write created.
	pub generation: u64,
	pub debounce: Duration,
}

impl Mutation {
	pub fn apply(&self, query: &mut QueryState) {
		match self.value.as_deref().and_then(|value| self.codec.encode(value)) {
			Some(encoded) => query.set(&self.key, encoded),
			None => query.delete(&self.key),
		}
	}
}

/// A navigation ready to hand to the navigator, plus the overrides it settles.
pub(crate) struct PendingNavigation {
	pub request: NavigationRequest,
	pub committed: Vec<(String, u64)>,
}

impl PendingNavigation {
	/// Finalizes `query` (sorting if enabled) and appends the preserved hash.
	pub fn new(mut query: QueryState, hash: &str, options: &SyncOptions, committed: Vec<(String, u64)>) -> Self {
		if options.sort {
			query.sort();
		}
		let history = if options.push_history { HistoryMode::Push } else { HistoryMode::Replace };
		Self {
			request: NavigationRequest::new(format!("?{query}{hash}"), history),
			committed,
		}
	}
}

struct DebounceSlot {
	generation: u64,
	mutation: Mutation,
}

#[derive(Default)]
pub(crate) struct Batcher {
	pending: Vec<Mutation>,
	flush_generation: u64,
	debounced: HashMap<String, DebounceSlot>,
	debounce_clock: u64,
	in_flight: usize,
}

impl Batcher {
	/// Queues `mutation` and restarts the shared flush, returning its generation.
	pub fn enqueue(&mut self, mutation: Mutation) -> u64 {
		self.pending.push(mutation);
		self.flush_generation = self.flush_generation.wrapping_add(1);
		self.flush_generation
	}

	/// Takes the pending set if `generation` is still the current flush.
	pub fn take_pending(&mut self, generation: u64) -> Option<Vec<Mutation>> {
		if generation != self.flush_generation || self.pending.is_empty() {
			return None;
		}
		Some(std::mem::take(&mut self.pending))
	}

	/// Parks `mutation` in its key's debounce slot, replacing any earlier one.
	pub fn arm_debounce(&mut self, mutation: Mutation) -> u64 {
		self.debounce_clock = self.debounce_clock.wrapping_add(1);
		let generation = self.debounce_clock;
		self.debounced.insert(mutation.key.clone(), DebounceSlot { generation, mutation });
		generation
	}

	/// Takes the parked mutation for `key` if its timer is still the latest.
	pub fn take_debounced(&mut self, key: &str, generation: u64) -> Option<Mutation> {
		if self.debounced.get(key)?.generation != generation {
			return None;
		}
		self.debounced.remove(key).map(|slot| slot.mutation)
	}

	pub fn begin_navigation(&mut self) {
		self.in_flight += 1;
	}

	pub fn end_navigation(&mut self) {
		self.in_flight = self.in_flight.saturating_sub(1);
	}

	/// True when nothing is queued, parked or in flight.
	pub fn is_idle(&self) -> bool {
		self.pending.is_empty() && self.debounced.is_empty() && self.in_flight == 0
	}
}

/// Applies `mutations` in order and returns the last generation seen per key.
pub(crate) fn apply_all(query: &mut QueryState, mutations: &[Mutation]) -> Vec<(String, u64)> {
	let mut committed: Vec<(String, u64)> = Vec::new();
	for mutation in mutations {
		mutation.apply(query);
		match committed.iter_mut().find(|(key, _)| *key == mutation.key) {
			Some(entry) => entry.1 = mutation.generation,
			None => committed.push((mutation.key.clone(), mutation.generation)),
		}
	}
	committed
}
