//! Error types for the link client.
//!
//! # Design
//! `LinkLengthExceeded` is the only variant the safe entry points recover
//! from: they branch on `BuiltLink::TooLong` before it ever becomes an error.
//! A non-2xx reply from the link API is not an error at all for callers; it
//! is turned into an `ApiResponseError`, handed to the optional reporter, and
//! replaced by a fallback value.

/// Errors returned by `LinkResource` operations.
#[derive(Debug, thiserror::Error)]
pub enum BranchError {
    /// The locally built link is longer than the limit.
    #[error("link length {length} exceeds limit of {limit} characters")]
    LinkLengthExceeded { length: usize, limit: usize },

    /// The configured link domain or API endpoint does not form a valid URL.
    #[error("invalid url: {0}")]
    InvalidDomain(String),

    /// The request never produced an HTTP response.
    #[error("transport error: {0}")]
    Transport(#[from] ureq::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// A non-2xx reply from the link API, carried to an `ErrorReporter`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("link API responded with HTTP {status}: {body}")]
pub struct ApiResponseError {
    pub status: u16,
    pub body: String,
}
