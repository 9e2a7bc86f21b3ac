//! `fetch`-backed remote client for the API endpoint and the package catalog resource.

use platform_host::{
    parse_packages_body, ApiMethod, ApiRequest, PackageCatalog, RemoteClient, RemoteFuture,
    API_PATH, PACKAGES_PATH,
};
use serde_json::Value;

use crate::bridge::{self, FetchResponse};

#[derive(Debug, Clone, Default)]
/// Browser remote client. Paths are resolved against `base_url`, which is empty for
/// same-origin deployments.
pub struct WebRemoteClient {
    base_url: String,
}

impl WebRemoteClient {
    /// Creates a client rooted at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        path: &str,
        method: ApiMethod,
        body: Option<&str>,
    ) -> Result<FetchResponse, String> {
        let url = self.url(path);
        let response = bridge::fetch_text(&url, method.as_str(), body).await?;
        if !response.is_success() {
            return Err(format!("{} {url} returned HTTP {}", method.as_str(), response.status));
        }
        Ok(response)
    }
}

/// Converts an API response body according to the request's `parse_json` flag.
fn decode_api_body(request: &ApiRequest, body: String) -> Result<Value, String> {
    if !request.parse_json {
        return Ok(Value::String(body));
    }
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| format!("invalid API response: {e}"))
}

impl RemoteClient for WebRemoteClient {
    fn call<'a>(&'a self, request: &'a ApiRequest) -> RemoteFuture<'a, Result<Value, String>> {
        Box::pin(async move {
            let body = request
                .payload
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(|e| e.to_string())?;
            let response = self.send(API_PATH, request.method, body.as_deref()).await?;
            decode_api_body(request, response.body)
        })
    }

    fn poll_packages<'a>(&'a self) -> RemoteFuture<'a, Result<Option<PackageCatalog>, String>> {
        Box::pin(async move {
            let response = self.send(PACKAGES_PATH, ApiMethod::Get, None).await?;
            parse_packages_body(&response.body)
        })
    }
}
