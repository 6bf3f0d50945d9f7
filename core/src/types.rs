//! Typed payloads of the built-in resources.
//!
//! # Design
//! Calls always return an `ApiResponse` holding untyped JSON. These structs
//! are an optional view for callers that know what a method answers; use
//! `ApiResponse::deserialize` to obtain them. Fields the server may omit are
//! `Option` or `#[serde(default)]` so a partial answer still parses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Answer of the root `check` method: what the server saw of the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestInfo {
    pub ip: String,
    pub port: u16,
    pub user_agent: String,
}

/// How a request was authenticated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AuthVia {
    Token,
    Session,
}

/// Answer of `auth.check`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthCheck {
    pub authenticated: bool,
    pub via: Option<AuthVia>,
    #[serde(default)]
    pub token: Option<Value>,
    #[serde(default)]
    pub session: Option<Value>,
}

/// Answer of `account.retrieve`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub created: String,
    pub id: String,
    #[serde(default)]
    pub identity: Option<Identity>,
}

/// Answer of `account.identity`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    /// Alpha-2 country code given at registration.
    pub country: String,
    pub email: String,
    pub name: String,
    pub username: String,
}
