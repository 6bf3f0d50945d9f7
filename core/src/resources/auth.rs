use crate::client::ApiClient;
use crate::error::Result;
use crate::method::MethodSpec;
use crate::namespace::Namespace;
use crate::response::ApiResponse;
use crate::template::Params;

pub(super) fn namespace() -> Result<Namespace> {
    Namespace::new("auth").method("check", MethodSpec::get("check"))
}

/// Typed access to the `auth` namespace.
#[derive(Debug, Clone, Copy)]
pub struct AuthResource<'a> {
    client: &'a ApiClient,
}

impl AuthResource<'_> {
    /// Reports how the request was authenticated. A rejected token comes back
    /// as a 401 response, not as an error.
    pub async fn check(&self) -> Result<ApiResponse> {
        self.client.call("auth.check", Params::new()).await
    }
}

impl ApiClient {
    pub fn auth(&self) -> AuthResource<'_> {
        AuthResource { client: self }
    }
}
