//! Structured state kept in sync with a URL query string.
//!
//! # Purpose
//!
//! - Present query parameters as live structured values: reading decodes the
//!   current URL, writing schedules a URL update.
//! - Coalesce same-turn writes into one navigation, debounce per key, keep the
//!   query canonically sorted and carry the hash fragment through.
//! - Exclude the navigation primitive itself (see [`Navigator`]) and the
//!   concrete codecs (see [`urlstate_codec`]).
//!
//! # Mental model
//!
//! - A [`QueryParams`] session is the root of the state tree. Each registered
//!   key is a root value; nested objects and arrays are reached through
//!   [`Node`] handles addressed by a [`Path`].
//! - Reads resolve in priority order: pending override, decoded URL value,
//!   declared default. The result passes through the equality gate so a
//!   structurally equal object keeps its previous `Arc` identity.
//! - Writes land in the override store first (read-your-write), then in the
//!   pending batch. A zero-delay flush applies the batch to the live query and
//!   hands one request to the navigator; debounced keys wait on their own
//!   timer instead.
//! - A resolved navigation clears the overrides it committed, unless a newer
//!   write replaced them in the meantime.
//!
//! # Key types
//!
//! | Type | Meaning | Constraints |
//! |---|---|---|
//! | [`ParamRegistry`] | Per-key codec, default, equality and debounce | Immutable after build |
//! | [`QueryParams`] | Synchronization session and root proxy | Client sessions need a current-thread tokio runtime |
//! | [`Node`] | Nested object/array handle | Writes rebuild the whole root value |
//! | [`Navigator`] | Commits a navigation target | Must not call back into the session |
//! | [`MemoryNavigator`] | In-memory history stack | Test and CLI host |
//! | [`Param`] | Typed key handle | `T` must round-trip through JSON |
//!
//! # Invariants
//!
//! 1. Decode failure, and a decoded `null`, read as absent and never surface
//!    as an error.
//! 2. Writes issued in one synchronous turn produce at most one flush.
//! 3. An override is only cleared by the navigation that committed its own
//!    generation.
//! 4. A failed navigation leaves overrides in place.
//! 5. Outside a client context writes succeed without effect and defaults are
//!    never written back.
//! 6. Navigations run one at a time. Each builds its target from the URL as
//!    it stands once the previous navigation has settled.

mod batcher;
mod config;
mod equality;
mod error;
mod mutate;
mod navigator;
mod options;
mod overrides;
mod path;
mod proxy;
mod registry;
mod session;
mod typed;

pub use config::{CodecKind, ParamConfig, ParamSpecConfig, SessionConfig};
pub use equality::{EqualityFn, deep_equal, is_object_like};
pub use error::SyncError;
pub use navigator::{HistoryMode, MemoryNavigator, NavigationError, NavigationRequest, Navigator};
pub use options::SyncOptions;
pub use path::{Path, Seg};
pub use proxy::{Entry, Member, Node};
pub use registry::{ParamDecl, ParamRegistry, ParamSpec, RegistryBuilder};
pub use serde_json::Value;
pub use session::QueryParams;
pub use typed::Param;
pub use urlstate_query::{Location, QueryState};
