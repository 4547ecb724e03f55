//! Error types for envelope-types crate.

use thiserror::Error;

/// Errors raised while building, encoding or decoding a [`crate::TaggedMessage`].
#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Missing required resource id")]
    MissingResourceId,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("JSON encoding error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("JSON decoding error: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Result type alias for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;
