use crate::client::ApiClient;
use crate::error::Result;
use crate::method::MethodSpec;
use crate::namespace::Namespace;
use crate::response::ApiResponse;
use crate::template::Params;

pub(super) fn namespace() -> Result<Namespace> {
    Namespace::new("account")
        .method("retrieve", MethodSpec::get(""))?
        .method("identity", MethodSpec::get("identity"))
}

/// Typed access to the `account` namespace.
#[derive(Debug, Clone, Copy)]
pub struct AccountResource<'a> {
    client: &'a ApiClient,
}

impl AccountResource<'_> {
    /// The authenticated account. Deserializes into [`crate::types::Account`].
    pub async fn retrieve(&self) -> Result<ApiResponse> {
        self.client.call("account.retrieve", Params::new()).await
    }

    /// Profile of the account owner. Deserializes into
    /// [`crate::types::Identity`].
    pub async fn identity(&self) -> Result<ApiResponse> {
        self.client.call("account.identity", Params::new()).await
    }
}

impl ApiClient {
    pub fn account(&self) -> AccountResource<'_> {
        AccountResource { client: self }
    }
}
