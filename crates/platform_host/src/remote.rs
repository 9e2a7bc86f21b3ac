//! Remote API and package-catalog transport contracts.
//!
//! Requests are single-shot: each call issues exactly one transport operation, never retries,
//! and resolves exactly once with either the parsed payload or a diagnostic string. No timeout
//! is applied at this layer.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{PackageCatalog, PackageMetadata};

/// Fixed path of the remote API endpoint.
pub const API_PATH: &str = "/API";
/// Fixed path of the static package catalog resource.
pub const PACKAGES_PATH: &str = "/packages.json";

/// Object-safe boxed future used by [`RemoteClient`].
pub type RemoteFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
/// HTTP method used for an API request.
pub enum ApiMethod {
    /// Read-only request without a body.
    Get,
    /// Request carrying a JSON payload.
    #[default]
    Post,
}

impl ApiMethod {
    /// Returns the HTTP method token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Options for one request against [`API_PATH`]; passed through to the transport unchanged.
pub struct ApiRequest {
    /// HTTP method.
    pub method: ApiMethod,
    /// Optional JSON body.
    pub payload: Option<Value>,
    /// Whether the response body is parsed as JSON or returned as a JSON string.
    pub parse_json: bool,
}

impl ApiRequest {
    /// Builds a JSON POST request.
    pub fn post(payload: Value) -> Self {
        Self {
            method: ApiMethod::Post,
            payload: Some(payload),
            parse_json: true,
        }
    }

    /// Builds a body-less GET request.
    pub fn get() -> Self {
        Self {
            method: ApiMethod::Get,
            payload: None,
            parse_json: true,
        }
    }
}

/// Host service for outbound calls to the API endpoint and the package catalog resource.
pub trait RemoteClient {
    /// Issues one request to [`API_PATH`].
    fn call<'a>(&'a self, request: &'a ApiRequest) -> RemoteFuture<'a, Result<Value, String>>;

    /// Fetches [`PACKAGES_PATH`] and parses it as a catalog.
    ///
    /// An empty or `null` body resolves to `Ok(None)`; only transport and parse failures are
    /// errors.
    fn poll_packages<'a>(&'a self) -> RemoteFuture<'a, Result<Option<PackageCatalog>, String>>;
}

/// Parses a package catalog response body.
///
/// Entries that are not metadata objects (for example `null`, or a `mime` that is not a list of
/// strings) are skipped with a warning; the remaining entries keep their order.
///
/// # Errors
///
/// Returns an error when the body is neither empty/`null` nor a JSON object.
pub fn parse_packages_body(body: &str) -> Result<Option<PackageCatalog>, String> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let entries: Option<IndexMap<String, Value>> =
        serde_json::from_str(body).map_err(|e| format!("invalid package catalog: {e}"))?;
    let Some(entries) = entries else {
        return Ok(None);
    };

    let mut catalog = PackageCatalog::default();
    for (name, raw) in entries {
        match serde_json::from_value::<PackageMetadata>(raw) {
            Ok(metadata) => catalog.insert(name, metadata),
            Err(err) => {
                tracing::warn!(
                    application = name.as_str(),
                    error = %err,
                    "skipping malformed package entry"
                );
            }
        }
    }
    Ok(Some(catalog))
}

#[derive(Debug, Clone, Copy, Default)]
/// Remote client for targets without network access. Every call fails.
pub struct NoopRemoteClient;

impl RemoteClient for NoopRemoteClient {
    fn call<'a>(&'a self, _request: &'a ApiRequest) -> RemoteFuture<'a, Result<Value, String>> {
        Box::pin(async { Err("remote API is unavailable on this host".to_string()) })
    }

    fn poll_packages<'a>(&'a self) -> RemoteFuture<'a, Result<Option<PackageCatalog>, String>> {
        Box::pin(async { Err("package catalog is unavailable on this host".to_string()) })
    }
}

#[derive(Debug)]
struct MemoryRemoteState {
    packages: RefCell<Result<Option<PackageCatalog>, String>>,
    api_response: RefCell<Result<Value, String>>,
    package_polls: Cell<usize>,
    api_calls: RefCell<Vec<ApiRequest>>,
}

#[derive(Debug, Clone)]
/// Scripted in-memory remote client that records every request it receives.
///
/// Clones share responses and recorded requests.
pub struct MemoryRemoteClient {
    state: Rc<MemoryRemoteState>,
}

impl Default for MemoryRemoteClient {
    fn default() -> Self {
        Self {
            state: Rc::new(MemoryRemoteState {
                packages: RefCell::new(Ok(None)),
                api_response: RefCell::new(Ok(Value::Null)),
                package_polls: Cell::new(0),
                api_calls: RefCell::new(Vec::new()),
            }),
        }
    }
}

impl MemoryRemoteClient {
    /// Creates a client whose package poll returns `catalog`.
    pub fn with_packages(catalog: PackageCatalog) -> Self {
        let client = Self::default();
        client.set_packages_response(Ok(Some(catalog)));
        client
    }

    /// Replaces the result returned by subsequent package polls.
    pub fn set_packages_response(&self, response: Result<Option<PackageCatalog>, String>) {
        *self.state.packages.borrow_mut() = response;
    }

    /// Replaces the result returned by subsequent API calls.
    pub fn set_api_response(&self, response: Result<Value, String>) {
        *self.state.api_response.borrow_mut() = response;
    }

    /// Number of package polls issued so far.
    pub fn package_polls(&self) -> usize {
        self.state.package_polls.get()
    }

    /// API requests received so far, in issue order.
    pub fn api_calls(&self) -> Vec<ApiRequest> {
        self.state.api_calls.borrow().clone()
    }
}

impl RemoteClient for MemoryRemoteClient {
    fn call<'a>(&'a self, request: &'a ApiRequest) -> RemoteFuture<'a, Result<Value, String>> {
        Box::pin(async move {
            self.state.api_calls.borrow_mut().push(request.clone());
            self.state.api_response.borrow().clone()
        })
    }

    fn poll_packages<'a>(&'a self) -> RemoteFuture<'a, Result<Option<PackageCatalog>, String>> {
        Box::pin(async move {
            self.state
                .package_polls
                .set(self.state.package_polls.get() + 1);
            self.state.packages.borrow().clone()
        })
    }
}
