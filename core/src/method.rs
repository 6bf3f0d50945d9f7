//! Method descriptors: one callable API operation each.

use std::fmt;

use crate::client::ApiClient;
use crate::error::{ApiError, Result};
use crate::http::HttpMethod;
use crate::response::ApiResponse;
use crate::template::{encode_form, Params, PathTemplate};

/// Serializes residual parameters into a request body.
#[derive(Clone, Copy)]
pub struct BodyEncoder {
    pub content_type: &'static str,
    pub encode: fn(&Params) -> Result<String>,
}

impl BodyEncoder {
    pub const JSON: BodyEncoder = BodyEncoder {
        content_type: "application/json",
        encode: encode_json,
    };

    pub const FORM: BodyEncoder = BodyEncoder {
        content_type: "application/x-www-form-urlencoded",
        encode: encode_form,
    };

    pub fn encode(&self, params: &Params) -> Result<String> {
        (self.encode)(params)
    }
}

impl Default for BodyEncoder {
    fn default() -> Self {
        Self::JSON
    }
}

impl fmt::Debug for BodyEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyEncoder")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

fn encode_json(params: &Params) -> Result<String> {
    serde_json::to_string(params).map_err(ApiError::Encode)
}

/// Declarative input for registering a method.
#[derive(Debug, Clone, Default)]
pub struct MethodSpec {
    pub verb: HttpMethod,
    pub path: String,
    pub encoder: BodyEncoder,
}

impl MethodSpec {
    pub fn new(verb: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            encoder: BodyEncoder::default(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn head(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Head, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_encoder(mut self, encoder: BodyEncoder) -> Self {
        self.encoder = encoder;
        self
    }
}

/// Where the residual parameters of a call end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    None,
    Query(String),
    Body {
        content_type: &'static str,
        body: String,
    },
}

/// A call split into its path and its payload, ready for the client to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCall {
    pub method: HttpMethod,
    pub path: String,
    pub payload: Payload,
}

/// A registered API operation.
///
/// The descriptor is a plain value. It never holds the client; calls go
/// through `ApiClient::dispatch`, which takes the descriptor explicitly.
#[derive(Debug, Clone)]
pub struct Method {
    verb: HttpMethod,
    template: PathTemplate,
    encoder: BodyEncoder,
}

impl Method {
    pub fn new(spec: MethodSpec) -> Self {
        Self {
            verb: spec.verb,
            template: PathTemplate::parse(&spec.path),
            encoder: spec.encoder,
        }
    }

    /// Builds the descriptor with an effective path of `prefix/spec.path`.
    pub(crate) fn with_prefix(spec: MethodSpec, prefix: &str) -> Self {
        let path = format!("{prefix}/{}", spec.path);
        Self::new(MethodSpec { path, ..spec })
    }

    pub fn verb(&self) -> HttpMethod {
        self.verb
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn path(&self) -> &str {
        self.template.as_str()
    }

    pub fn encoder(&self) -> &BodyEncoder {
        &self.encoder
    }

    /// Splits raw input into path parameters and residual parameters.
    pub fn split_params(&self, input: Params) -> (Params, Params) {
        self.template.split(input)
    }

    /// Resolves the path and encodes the residual parameters according to
    /// the verb: a query string for safe verbs, a body for the rest.
    pub fn prepare(&self, path_params: &Params, rest: &Params) -> Result<PreparedCall> {
        let path = self.template.resolve(path_params)?;
        let payload = if self.verb.is_safe() {
            if rest.is_empty() {
                Payload::None
            } else {
                let query = encode_form(rest)?;
                if query.is_empty() {
                    Payload::None
                } else {
                    Payload::Query(query)
                }
            }
        } else {
            Payload::Body {
                content_type: self.encoder.content_type,
                body: self.encoder.encode(rest)?,
            }
        };
        Ok(PreparedCall {
            method: self.verb,
            path,
            payload,
        })
    }

    /// Splits `input` and sends the call through `client`.
    pub async fn invoke(&self, client: &ApiClient, input: Params) -> Result<ApiResponse> {
        let (path_params, rest) = self.split_params(input);
        client.dispatch(self, &path_params, &rest).await
    }
}

impl From<MethodSpec> for Method {
    fn from(spec: MethodSpec) -> Self {
        Self::new(spec)
    }
}
