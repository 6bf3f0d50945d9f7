//! The API client: URL building, authentication and dispatch.
//!
//! # Design
//! `ApiClient` holds the base URL, the bearer token, a shared `Transport`
//! and the resource table. All of it is fixed at `build()` time and never
//! mutated afterwards, so a client can be cloned and used from any number of
//! tasks at once. Each call is split into a pure `build_request` step, the
//! transport round-trip, and a pure `parse_response` step.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn, Span};
use url::Url;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::method::{Method, Payload};
use crate::namespace::{Namespace, Resource};
use crate::response::{ApiResponse, RawResponse};
use crate::template::Params;
use crate::transport::{ReqwestTransport, Transport};

pub const DEFAULT_PRODUCT: &str = "resty";
pub const DEFAULT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Credential prefixes the API issues. Other shapes only produce a warning.
pub const TOKEN_PREFIXES: &[&str] = &["token_", "session_"];

/// What happens when two resources are registered under the same name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Fail construction with `ApiError::DuplicateResource`.
    #[default]
    Reject,
    /// Keep the later registration.
    Replace,
}

/// Builder for configuring an [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: String,
    token: String,
    user_agent: String,
    transport: Option<Arc<dyn Transport>>,
    resources: Option<Vec<Resource>>,
    collision_policy: CollisionPolicy,
    accept_invalid_certs: bool,
}

impl ApiClientBuilder {
    fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: String::new(),
            user_agent: format!("{DEFAULT_PRODUCT}/{DEFAULT_VERSION}"),
            transport: None,
            resources: None,
            collision_policy: CollisionPolicy::default(),
            accept_invalid_certs: false,
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Sets the `User-Agent` to `product/version`.
    pub fn user_agent(mut self, product: &str, version: &str) -> Self {
        self.user_agent = format!("{product}/{version}");
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Replaces the default registry. Entries are bound in order.
    pub fn resources(mut self, resources: Vec<Resource>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Skips TLS verification on the default transport. Ignored when a
    /// custom transport is supplied.
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Builds the client.
    ///
    /// ## Errors
    ///
    /// Fails if the base URL is not absolute, if two resources collide under
    /// `CollisionPolicy::Reject`, or if the default transport cannot be
    /// constructed. A token of unexpected shape only logs a warning.
    pub fn build(self) -> Result<ApiClient> {
        let parsed = Url::parse(&self.base_url).map_err(ApiError::InvalidBaseUrl)?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(
                url::ParseError::RelativeUrlWithCannotBeABaseBase,
            ));
        }

        check_token_shape(&self.token);

        let resources = match self.resources {
            Some(resources) => resources,
            None => crate::resources::registry()?,
        };
        let resources = bind_resources(resources, self.collision_policy)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::with_invalid_certs(self.accept_invalid_certs)?),
        };

        Ok(ApiClient {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            token: self.token,
            user_agent: self.user_agent,
            transport,
            resources: Arc::new(resources),
        })
    }
}

fn check_token_shape(token: &str) {
    if !TOKEN_PREFIXES.iter().any(|prefix| token.starts_with(prefix)) {
        warn!(
            expected = ?TOKEN_PREFIXES,
            "API token does not have a recognised prefix; requests will likely be rejected"
        );
    }
}

fn bind_resources(
    resources: Vec<Resource>,
    policy: CollisionPolicy,
) -> Result<BTreeMap<String, Resource>> {
    let mut bound = BTreeMap::new();
    for resource in resources {
        let name = resource.name().to_string();
        if bound.contains_key(&name) {
            match policy {
                CollisionPolicy::Reject => return Err(ApiError::DuplicateResource { name }),
                CollisionPolicy::Replace => {
                    warn!(resource = %name, "resource registered twice; keeping the later one");
                }
            }
        }
        bound.insert(name, resource);
    }
    Ok(bound)
}

/// Authenticated client for a REST API described by a resource registry.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    token: String,
    user_agent: String,
    transport: Arc<dyn Transport>,
    resources: Arc<BTreeMap<String, Resource>>,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder::new(base_url.into())
    }

    /// Client with the default registry and transport.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::builder(base_url).token(token).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.resource(name).and_then(Resource::as_namespace)
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Looks up a method by path: `namespace.method`, `namespace/method`, or
    /// the name of a root-level method.
    pub fn method(&self, path: &str) -> Result<&Method> {
        let found = match path.split_once(|c: char| c == '.' || c == '/') {
            Some((ns, name)) => self.namespace(ns).and_then(|ns| ns.lookup_method(name)),
            None => match self.resource(path) {
                Some(Resource::Method { method, .. }) => Some(method),
                _ => None,
            },
        };
        debug!(path, found = found.is_some(), "method lookup");
        found.ok_or_else(|| ApiError::MethodNotFound {
            path: path.to_string(),
        })
    }

    /// Every invokable method with its lookup path, in name order.
    pub fn methods(&self) -> Vec<(String, &Method)> {
        let mut out = Vec::new();
        for resource in self.resources.values() {
            match resource {
                Resource::Namespace(ns) => {
                    for (name, method) in ns.methods() {
                        out.push((format!("{}.{name}", ns.name()), method));
                    }
                }
                Resource::Method { name, method } => out.push((name.clone(), method)),
            }
        }
        out
    }

    /// Resolves `path` and invokes it with `input`.
    pub async fn call(&self, path: &str, input: Params) -> Result<ApiResponse> {
        self.method(path)?.invoke(self, input).await
    }

    /// Builds the wire request for `method` without sending it.
    pub fn build_request(
        &self,
        method: &Method,
        path_params: &Params,
        body_params: &Params,
    ) -> Result<HttpRequest> {
        let call = method.prepare(path_params, body_params)?;
        let mut url = format!("{}/{}", self.base_url, call.path.trim_start_matches('/'));
        let mut headers = vec![
            ("Authorization".to_string(), format!("Bearer {}", self.token)),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ];
        let body = match call.payload {
            Payload::None => None,
            Payload::Query(query) => {
                url.push('?');
                url.push_str(&query);
                None
            }
            Payload::Body { content_type, body } => {
                headers.push(("Content-Type".to_string(), content_type.to_string()));
                Some(body)
            }
        };
        Ok(HttpRequest {
            method: call.method,
            url,
            headers,
            body,
        })
    }

    /// Wraps a transport response. Any status is accepted; only a body that
    /// is not JSON fails. Responses to HEAD carry no body and decode to `null`.
    pub fn parse_response(&self, verb: HttpMethod, response: HttpResponse) -> Result<ApiResponse> {
        let body = if verb == HttpMethod::Head {
            Value::Null
        } else {
            serde_json::from_str(&response.body).map_err(|source| ApiError::Decode {
                status: response.status,
                source,
            })?
        };
        let raw = RawResponse::new(response.status, response.status_text, response.headers);
        Ok(ApiResponse::new(raw, body))
    }

    /// Sends one call for `method` and wraps the answer.
    ///
    /// ## Errors
    ///
    /// Transport failures and non-JSON bodies. A non-2xx status is returned
    /// as a normal `ApiResponse`.
    #[instrument(
        name = "api_request",
        skip_all,
        fields(
            http.method = %method.verb(),
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn dispatch(
        &self,
        method: &Method,
        path_params: &Params,
        body_params: &Params,
    ) -> Result<ApiResponse> {
        let request = self.build_request(method, path_params, body_params)?;
        Span::current().record("http.url", request.url.as_str());

        let response = self.transport.send(request).await?;
        Span::current().record("http.status_code", response.status);

        self.parse_response(method.verb(), response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tracing_test::traced_test;

    use super::*;
    use crate::method::MethodSpec;

    /// Records requests and answers each with a fixed response.
    struct Recorder {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        response: HttpResponse,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn ok_json(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("x-response-id".to_string(), "r-1".to_string())],
            body: body.to_string(),
        }
    }

    fn client_with(response: HttpResponse) -> (ApiClient, Arc<Mutex<Vec<HttpRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let client = ApiClient::builder("https://api.example.com/")
            .token("token_abc")
            .transport(Recorder {
                requests: requests.clone(),
                response,
            })
            .build()
            .unwrap();
        (client, requests)
    }

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn build_request_for_namespaced_get() {
        let (client, _) = client_with(ok_json("{}"));
        let method = client.method("auth.check").unwrap();
        let req = client.build_request(method, &Params::new(), &Params::new()).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://api.example.com/auth/check");
        assert_eq!(req.header("authorization"), Some("Bearer token_abc"));
        assert_eq!(
            req.header("user-agent"),
            Some(format!("resty/{DEFAULT_VERSION}").as_str())
        );
        assert!(req.body.is_none());
    }

    #[test]
    fn build_request_appends_query_for_get() {
        let (client, _) = client_with(ok_json("{}"));
        let method = Method::new(MethodSpec::get("items"));
        let req = client
            .build_request(&method, &Params::new(), &params(json!({"page": 2})))
            .unwrap();
        assert_eq!(req.url, "https://api.example.com/items?page=2");
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
    }

    #[test]
    fn path_values_cannot_swallow_the_query() {
        let (client, _) = client_with(ok_json("{}"));
        let method = Method::new(MethodSpec::get("files/:name"));
        let (path, rest) = method.split_params(params(json!({"name": "a?b#c", "page": 2})));
        let req = client.build_request(&method, &path, &rest).unwrap();
        assert_eq!(req.url, "https://api.example.com/files/a%3Fb%23c?page=2");

        let parsed = Url::parse(&req.url).unwrap();
        assert_eq!(parsed.path(), "/files/a%3Fb%23c");
        assert_eq!(parsed.query(), Some("page=2"));
        assert_eq!(parsed.fragment(), None);
    }

    #[tokio::test]
    async fn dot_segment_path_value_fails_before_sending() {
        let (client, requests) = client_with(ok_json("{}"));
        let method = Method::new(MethodSpec::delete("account/:id/keys"));
        let err = method
            .invoke(&client, params(json!({"id": ".."})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidPathValue { .. }));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn build_request_sets_body_for_post() {
        let (client, _) = client_with(ok_json("{}"));
        let method = Method::new(MethodSpec::post("account/:id"));
        let (path, rest) = method.split_params(params(json!({"id": "42", "name": "x"})));
        let req = client.build_request(&method, &path, &rest).unwrap();
        assert_eq!(req.url, "https://api.example.com/account/42");
        assert!(!req.url.contains('?'));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(r#"{"name":"x"}"#));
    }

    #[test]
    fn user_agent_is_configurable() {
        let client = ApiClient::builder("https://api.example.com")
            .token("token_abc")
            .user_agent("acme-cli", "2.3.4")
            .transport(Recorder {
                requests: Arc::default(),
                response: ok_json("{}"),
            })
            .build()
            .unwrap();
        assert_eq!(client.user_agent(), "acme-cli/2.3.4");
    }

    #[tokio::test]
    async fn dispatch_wraps_non_success_status() {
        let (client, requests) = client_with(HttpResponse {
            status: 401,
            status_text: "Unauthorized".to_string(),
            headers: vec![],
            body: r#"{"error":"invalid token"}"#.to_string(),
        });
        let res = client.auth().check().await.unwrap();
        assert_eq!(res.status(), 401);
        assert_eq!(res.get("error"), Some(&json!("invalid token")));
        assert_eq!(res.id(), None);
        assert_eq!(requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dispatch_fails_on_non_json_body() {
        let (client, _) = client_with(ok_json("<html>oops</html>"));
        let err = client.check().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { status: 200, .. }));
    }

    #[tokio::test]
    async fn head_responses_are_not_decoded() {
        let (client, requests) = client_with(ok_json(""));
        let method = Method::new(MethodSpec::head("check"));
        let res = method.invoke(&client, Params::new()).await.unwrap();
        assert_eq!(res.body(), &Value::Null);
        assert_eq!(res.id(), Some("r-1"));
        assert_eq!(requests.lock().unwrap()[0].method, HttpMethod::Head);
    }

    #[tokio::test]
    async fn nested_query_value_fails_before_sending() {
        let (client, requests) = client_with(ok_json("{}"));
        let method = Method::new(MethodSpec::get("search"));
        let err = method
            .invoke(&client, params(json!({"tags": ["a"]})))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedQueryValue { .. }));
        assert!(requests.lock().unwrap().is_empty());
    }

    #[test]
    fn method_lookup_accepts_dot_slash_and_root() {
        let (client, _) = client_with(ok_json("{}"));
        assert_eq!(client.method("auth.check").unwrap().path(), "auth/check");
        assert_eq!(client.method("auth/check").unwrap().path(), "auth/check");
        assert_eq!(client.method("check").unwrap().path(), "check");
        assert_eq!(client.method("account.identity").unwrap().path(), "account/identity");
    }

    #[test]
    fn unknown_method_is_not_found() {
        let (client, _) = client_with(ok_json("{}"));
        for path in ["auth.logout", "nope", "check.sub", "account"] {
            let err = client.method(path).unwrap_err();
            assert!(matches!(err, ApiError::MethodNotFound { .. }), "{path}");
        }
    }

    #[test]
    fn methods_lists_registry() {
        let (client, _) = client_with(ok_json("{}"));
        let names: Vec<_> = client.methods().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec!["account.identity", "account.retrieve", "auth.check", "check"]
        );
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let err = ApiClient::builder("api.example.com")
            .token("token_abc")
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl(_)));
    }

    #[test]
    fn duplicate_resources_are_rejected_by_default() {
        let err = ApiClient::builder("https://api.example.com")
            .token("token_abc")
            .resources(vec![
                Resource::method("ping", MethodSpec::get("ping")),
                Resource::method("ping", MethodSpec::get("v2/ping")),
            ])
            .build()
            .unwrap_err();
        assert!(matches!(err, ApiError::DuplicateResource { ref name } if name == "ping"));
    }

    #[traced_test]
    #[test]
    fn replace_policy_keeps_later_resource() {
        let client = ApiClient::builder("https://api.example.com")
            .token("token_abc")
            .collision_policy(CollisionPolicy::Replace)
            .resources(vec![
                Resource::method("ping", MethodSpec::get("ping")),
                Resource::method("ping", MethodSpec::get("v2/ping")),
            ])
            .build()
            .unwrap();
        assert_eq!(client.method("ping").unwrap().path(), "v2/ping");
        assert!(logs_contain("resource registered twice"));
    }

    #[traced_test]
    #[test]
    fn unrecognised_token_warns_but_builds() {
        let client = ApiClient::builder("https://api.example.com")
            .token("not-a-real-token")
            .build();
        assert!(client.is_ok());
        assert!(logs_contain("recognised prefix"));
        assert!(!logs_contain("not-a-real-token"));
    }

    #[traced_test]
    #[test]
    fn recognised_token_does_not_warn() {
        let _client = ApiClient::new("https://api.example.com", "session_xyz").unwrap();
        assert!(!logs_contain("recognised prefix"));
    }

    #[test]
    fn debug_output_redacts_token() {
        let (client, _) = client_with(ok_json("{}"));
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("token_abc"));
    }

    #[test]
    fn client_is_shareable_across_tasks() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ApiClient>();
    }
}
