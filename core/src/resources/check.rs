use crate::client::ApiClient;
use crate::error::Result;
use crate::method::MethodSpec;
use crate::namespace::Resource;
use crate::response::ApiResponse;
use crate::template::Params;

pub(super) fn resource() -> Resource {
    Resource::method("check", MethodSpec::get("check"))
}

impl ApiClient {
    /// Health check echoing basic request details. Deserializes into
    /// [`crate::types::RequestInfo`].
    pub async fn check(&self) -> Result<ApiResponse> {
        self.call("check", Params::new()).await
    }
}
