use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by session operations.
///
/// Decode failures are deliberately absent: they read as `None`.
#[derive(Debug, Error)]
pub enum SyncError {
	/// A nested write addressed a location that does not exist.
	#[error("no value at {path}")]
	PathNotFound { path: String },

	/// A nested write tried to set a member on a value that cannot hold it.
	#[error("cannot set {segment} on {kind} at {path}")]
	NotAContainer {
		path: String,
		segment: String,
		kind: &'static str,
	},

	/// An array length was set to something other than a non-negative integer
	/// within the array size limit.
	#[error("array length must be a non-negative integer no larger than 65536, got {value}")]
	InvalidLength { value: Value },

	/// An element write would grow an array past the size limit.
	#[error("index {index} at {path} exceeds the array limit of {max} elements")]
	IndexOutOfRange { path: String, index: usize, max: usize },

	/// A typed write could not be converted to a structured value.
	#[error("failed to serialize value for '{key}': {source}")]
	Serialize {
		key: String,
		#[source]
		source: serde_json::Error,
	},

	/// A client session was created outside a tokio runtime.
	#[error("client sessions must be created inside a tokio runtime")]
	NoRuntime,

	/// A client session was created on a multi-thread runtime. Same-turn
	/// coalescing relies on a single thread driving the session.
	#[error("client sessions require a current-thread tokio runtime")]
	MultiThreadRuntime,

	/// The TOML configuration could not be parsed.
	#[error("invalid configuration: {0}")]
	Config(#[from] toml::de::Error),
}
