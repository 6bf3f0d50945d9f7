//! Declarative REST client core.
//!
//! # Overview
//! Resources are described as data: a `Namespace` groups `Method`
//! descriptors (verb, path template, body encoder) under a path prefix, and
//! a registry of namespaces is bound to an `ApiClient` at construction. Any
//! method can then be invoked with a flat key/value map; the client splits
//! path parameters from the rest, authenticates the request, sends it
//! through a `Transport` and returns an immutable `ApiResponse`.
//!
//! # Design
//! - Descriptors are plain values; the client is passed explicitly when a
//!   method is invoked, and the resource table is fixed once built.
//! - Non-2xx statuses are data, not errors. Only transport failures and
//!   non-JSON bodies fail a call.
//! - Requests and responses are plain data (`HttpRequest`/`HttpResponse`),
//!   so the request a call would send can be inspected without a server.
//! - The core never reads credentials from disk; the token is a value
//!   supplied by the caller.

pub mod client;
pub mod error;
pub mod http;
pub mod method;
pub mod namespace;
pub mod resources;
pub mod response;
pub mod template;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder, CollisionPolicy};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use method::{BodyEncoder, Method, MethodSpec};
pub use namespace::{Namespace, Resource};
pub use response::{ApiResponse, RawResponse};
pub use template::{Params, PathTemplate};
pub use transport::{ReqwestTransport, Transport};
