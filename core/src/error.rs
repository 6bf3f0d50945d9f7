//! Error types for the resty client core.
//!
//! # Design
//! A non-2xx status is not an error at this layer: the server's answer is
//! surfaced as a normal `ApiResponse` and interpretation is left to the
//! caller. The variants below cover what can actually prevent a call from
//! producing a response, plus the construction-time failures of the
//! resource registry.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by `ApiClient` and the descriptor model.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport could not complete the round-trip (DNS, connect, TLS, reset).
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// The server answered, but the body was not valid JSON.
    #[error("response body (HTTP {status}) is not valid JSON: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A nested value was supplied where only scalars can be encoded.
    #[error("parameter '{key}' is an array or object and cannot be form/query encoded")]
    UnsupportedQueryValue { key: String },

    /// A path parameter resolved to `.` or `..`, which cannot stay a single
    /// path segment.
    #[error("path parameter '{name}' cannot be a dot segment")]
    InvalidPathValue { name: String },

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[source] url::ParseError),

    /// A header value contained bytes not allowed on the wire.
    #[error("invalid value for header '{name}'")]
    InvalidHeader { name: String },

    /// Lookup of a method path that was never registered.
    #[error("no method registered at '{path}'")]
    MethodNotFound { path: String },

    #[error("resource '{name}' is registered more than once")]
    DuplicateResource { name: String },

    #[error("method '{method}' is registered more than once in namespace '{namespace}'")]
    DuplicateMethod { namespace: String, method: String },
}
