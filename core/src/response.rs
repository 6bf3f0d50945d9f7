//! The response wrapper handed back from every call.
//!
//! # Design
//! `ApiResponse` pairs the transport metadata with the decoded JSON body.
//! Both are private and only reachable through shared references, so a
//! response cannot change after construction. Serializing it yields the
//! body alone; status and headers are not part of the JSON form.

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::http::find_header;

/// Header carrying the server-assigned response identifier.
pub const RESPONSE_ID_HEADER: &str = "X-Response-Id";

/// Status line and headers of the original response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    status: u16,
    status_text: String,
    headers: Vec<(String, String)>,
}

impl RawResponse {
    pub fn new(status: u16, status_text: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    raw: RawResponse,
    body: Value,
}

impl ApiResponse {
    pub fn new(raw: RawResponse, body: Value) -> Self {
        Self { raw, body }
    }

    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    pub fn status(&self) -> u16 {
        self.raw.status
    }

    pub fn status_text(&self) -> &str {
        &self.raw.status_text
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.raw.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw.header(name)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.raw.status)
    }

    /// Value of the `X-Response-Id` header, if the server sent one.
    pub fn id(&self) -> Option<&str> {
        self.raw.header(RESPONSE_ID_HEADER)
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    /// A top-level field of the body. `None` when the body is not an object
    /// or lacks the key.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.as_object().and_then(|map| map.get(field))
    }

    /// Top-level body fields in key order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.body
            .as_object()
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Deserializes a copy of the body into a typed payload.
    pub fn deserialize<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.body)
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

impl Serialize for ApiResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.body.serialize(serializer)
    }
}
