use std::fmt;
use std::marker::PhantomData;

/// Typed handle to a query parameter key.
///
/// Reading through a handle deserializes the resolved value; a value that
/// does not fit `T` reads as absent, the same way a decode failure does.
///
/// ```
/// use urlstate_sync::Param;
///
/// const PAGE: Param<u32> = Param::new("page");
/// assert_eq!(PAGE.key(), "page");
/// ```
pub struct Param<T> {
	key: &'static str,
	_marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Param<T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for Param<T> {}

impl<T> fmt::Debug for Param<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Param").field(&self.key).finish()
	}
}

impl<T> Param<T> {
	pub const fn new(key: &'static str) -> Self {
		Self {
			key,
			_marker: PhantomData,
		}
	}

	pub const fn key(&self) -> &'static str {
		self.key
	}
}
