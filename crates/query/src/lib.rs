//! Query string and location primitives.
//!
//! [`QueryState`] mirrors the browser `URLSearchParams` model: an ordered list
//! of key/value pairs where a key may repeat, serialized as
//! `application/x-www-form-urlencoded`. [`Location`] pairs it with the path and
//! the hash fragment so a navigation can rewrite the query while carrying the
//! fragment through untouched.

mod location;
mod state;

pub use location::Location;
pub use state::QueryState;
