//! Navigation collaborator contract.

use async_trait::async_trait;
use thiserror::Error;
use urlstate_query::Location;

mod memory;

pub use memory::MemoryNavigator;

/// Whether a navigation adds a history entry or rewrites the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryMode {
	Push,
	Replace,
}

/// One outgoing navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
	/// Relative target of the form `?query#hash`.
	pub target: String,
	pub history: HistoryMode,
	/// Keep the focused element focused.
	pub keep_focus: bool,
	/// Do not reset the scroll position.
	pub no_scroll: bool,
}

impl NavigationRequest {
	pub(crate) fn new(target: String, history: HistoryMode) -> Self {
		Self {
			target,
			history,
			keep_focus: true,
			no_scroll: true,
		}
	}
}

#[derive(Debug, Clone, Error)]
#[error("navigation to {target} failed: {reason}")]
pub struct NavigationError {
	pub target: String,
	pub reason: String,
}

/// Host-provided navigation primitive.
///
/// `location` is read fresh on every flush and every uncached read, so it
/// must reflect navigations made outside the session too. Neither method may
/// call back into the session.
#[async_trait]
pub trait Navigator: Send + Sync {
	fn location(&self) -> Location;

	async fn navigate(&self, request: NavigationRequest) -> Result<(), NavigationError>;
}
