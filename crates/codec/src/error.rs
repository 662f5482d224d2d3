use thiserror::Error;

/// Why a raw query value could not be decoded.
///
/// Only reachable through the `try_decode` helpers; [`crate::Codec::decode`]
/// folds every variant into `None`.
#[derive(Debug, Error)]
pub enum CodecError {
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("invalid base64: {0}")]
	Base64(#[from] base64::DecodeError),

	#[error("brotli stream error: {0}")]
	Stream(#[from] std::io::Error),
}
