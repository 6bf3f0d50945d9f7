use std::{collections::HashSet, net::SocketAddr, sync::Arc};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

/// Token accepted by `app()`.
pub const DEFAULT_TOKEN: &str = "token_test";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Identity {
    pub country: String,
    pub email: String,
    pub name: String,
    pub username: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub created: String,
    pub id: String,
    pub identity: Option<Identity>,
}

#[derive(Clone)]
pub struct AppState {
    tokens: Arc<HashSet<String>>,
    account: Arc<Account>,
}

pub fn app() -> Router {
    app_with_tokens([DEFAULT_TOKEN])
}

pub fn app_with_tokens<I, S>(tokens: I) -> Router
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let state = AppState {
        tokens: Arc::new(tokens.into_iter().map(Into::into).collect()),
        account: Arc::new(Account {
            created: "2024-01-01T00:00:00Z".to_string(),
            id: Uuid::new_v4().to_string(),
            identity: Some(Identity {
                country: "NL".to_string(),
                email: "test@example.com".to_string(),
                name: "Test User".to_string(),
                username: "test".to_string(),
            }),
        }),
    };
    Router::new()
        .route("/check", get(check))
        .route("/auth/check", get(auth_check))
        .route("/account/", get(account))
        .route("/account/identity", get(identity))
        .route("/echo/{*path}", any(echo))
        .route("/malformed", any(malformed))
        .layer(middleware::from_fn(response_id))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_app(listener, app()).await
}

/// Serves `router` with peer addresses available to the `/check` handler.
pub async fn run_app(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}

async fn response_id(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&Uuid::new_v4().to_string()) {
        response.headers_mut().insert("x-response-id", value);
    }
    response
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<String, Response> {
    match bearer(headers) {
        Some(token) if state.tokens.contains(token) => Ok(token.to_string()),
        _ => Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid token"})),
        )
            .into_response()),
    }
}

async fn check(request: Request) -> Json<Value> {
    let (ip, port) = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| (addr.ip().to_string(), addr.port()))
        .unwrap_or_else(|| ("0.0.0.0".to_string(), 0));
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    Json(json!({"ip": ip, "port": port, "userAgent": user_agent}))
}

async fn auth_check(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers) {
        Ok(token) => Json(json!({
            "authenticated": true,
            "via": "token",
            "token": {"id": Uuid::new_v5(&Uuid::NAMESPACE_OID, token.as_bytes()).to_string()},
            "session": null,
        }))
        .into_response(),
        Err(rejection) => rejection,
    }
}

async fn account(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers) {
        Ok(_) => Json(state.account.as_ref().clone()).into_response(),
        Err(rejection) => rejection,
    }
}

async fn identity(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match authorize(&state, &headers) {
        Ok(_) => Json(state.account.identity.clone()).into_response(),
        Err(rejection) => rejection,
    }
}

/// Reflects the request back so clients can see what they sent.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    Json(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "contentType": content_type,
        "body": body,
    }))
}

async fn malformed() -> &'static str {
    "this is not json"
}
