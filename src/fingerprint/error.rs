//! Error types for the fingerprint engine.

use thiserror::Error;

/// Errors raised while building, encoding or decoding a signature.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The binary signature (or its data URI) is malformed.
    #[error("Invalid signature format: {0}")]
    Format(String),

    /// An audio chunk with no samples reached the extractor.
    #[error("Empty audio chunk")]
    EmptyInput,

    /// The in-memory signature breaks a field contract and cannot be written.
    #[error("Cannot encode signature: {0}")]
    Encode(String),
}

impl SignatureError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SignatureError>;
