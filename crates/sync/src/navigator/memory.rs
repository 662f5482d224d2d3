use async_trait::async_trait;
use parking_lot::Mutex;
use urlstate_query::Location;

use super::{HistoryMode, NavigationError, NavigationRequest, Navigator};

/// In-memory history stack standing in for a browser.
#[derive(Debug)]
pub struct MemoryNavigator {
	state: Mutex<MemoryHistory>,
}

#[derive(Debug)]
struct MemoryHistory {
	entries: Vec<Location>,
	index: usize,
	committed: Vec<NavigationRequest>,
	failures: usize,
}

impl MemoryNavigator {
	pub fn new(href: &str) -> Self {
		Self {
			state: Mutex::new(MemoryHistory {
				entries: vec![Location::parse(href)],
				index: 0,
				committed: Vec::new(),
				failures: 0,
			}),
		}
	}

	/// Replaces the current entry as if something outside the session navigated.
	pub fn set_location(&self, href: &str) {
		let mut state = self.state.lock();
		let index = state.index;
		state.entries[index] = Location::parse(href);
	}

	/// Makes the next `count` navigations fail without touching history.
	pub fn fail_next(&self, count: usize) {
		self.state.lock().failures = count;
	}

	/// Steps back one entry; false when already at the start.
	pub fn back(&self) -> bool {
		let mut state = self.state.lock();
		if state.index == 0 {
			return false;
		}
		state.index -= 1;
		true
	}

	/// Steps forward one entry; false when already at the end.
	pub fn forward(&self) -> bool {
		let mut state = self.state.lock();
		if state.index + 1 >= state.entries.len() {
			return false;
		}
		state.index += 1;
		true
	}

	pub fn href(&self) -> String {
		self.location().href()
	}

	pub fn history_len(&self) -> usize {
		self.state.lock().entries.len()
	}

	/// Successfully committed navigations, oldest first.
	pub fn navigations(&self) -> Vec<NavigationRequest> {
		self.state.lock().committed.clone()
	}
}

#[async_trait]
impl Navigator for MemoryNavigator {
	fn location(&self) -> Location {
		let state = self.state.lock();
		state.entries[state.index].clone()
	}

	async fn navigate(&self, request: NavigationRequest) -> Result<(), NavigationError> {
		// Suspend once, like a real navigation.
		tokio::task::yield_now().await;

		let mut state = self.state.lock();
		if state.failures > 0 {
			state.failures -= 1;
			return Err(NavigationError {
				target: request.target,
				reason: "injected failure".to_owned(),
			});
		}

		let next = state.entries[state.index].with_target(&request.target);
		match request.history {
			HistoryMode::Push => {
				let keep = state.index + 1;
				state.entries.truncate(keep);
				state.entries.push(next);
				state.index = keep;
			}
			HistoryMode::Replace => {
				let index = state.index;
				state.entries[index] = next;
			}
		}
		tracing::trace!(to = %request.target, history = ?request.history, "memory navigation committed");
		state.committed.push(request);
		Ok(())
	}
}
