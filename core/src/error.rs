//! Error types for the playground core.
//!
//! # Design
//! Parsing never fails: malformed response text is reported through
//! `ParseAnomaly` values attached to the parsed result (see `response`).
//! The errors here cover the few operations that can refuse work: submitting
//! an unusable request, decoding a collection file, preparing a response
//! body for display, and the persisted target slot. Store failures are logged and swallowed by the synchronizer rather
//! than surfaced to the user.

use thiserror::Error;

/// Errors returned by `Playground` operations.
#[derive(Debug, Error)]
pub enum PlaygroundError {
    /// The URL bar does not hold an absolute URL that can be requested.
    #[error("invalid request target {target:?}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// The request body reached the configured size limit.
    #[error("request body too long: {len} bytes (limit {limit})")]
    BodyTooLarge { len: usize, limit: usize },

    /// The method is not one the playground can send.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),
}

/// Errors raised while decoding a request collection.
#[derive(Debug, Error)]
pub enum CollectionError {
    #[error("collection is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("could not read collection: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while preparing a response body for display. The host
/// shows the message in place of the body.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("unsupported content encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("{encoding} decode failed: {source}")]
    Decode {
        encoding: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by a `TargetStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Persistence is disabled or not available in this host.
    #[error("storage unavailable")]
    Unavailable,

    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage contents are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
