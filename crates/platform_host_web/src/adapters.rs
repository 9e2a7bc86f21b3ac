use std::rc::Rc;

use platform_host::{
    ApiRequest, CapabilityError, HostCapabilities, HostServices, HostStrategy,
    MemoryPersistentStore, NoopRemoteClient, PackageCatalog, PersistentStore,
    PersistentStoreFuture, RemoteClient, RemoteFuture,
};
use serde_json::Value;

use crate::{WebPersistentStore, WebRemoteClient};

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "headless-host")]
    {
        HostStrategy::Headless
    }

    #[cfg(not(feature = "headless-host"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    selected_host_strategy().as_str()
}

/// Returns the capability posture of the compile-time selected strategy.
pub const fn host_capabilities() -> HostCapabilities {
    match selected_host_strategy() {
        HostStrategy::Browser => HostCapabilities::browser(),
        HostStrategy::Headless => HostCapabilities::headless(),
    }
}

/// Adapter enum that erases the concrete persistent-store backend behind [`PersistentStore`].
#[derive(Debug, Clone)]
pub enum PersistentStoreAdapter {
    /// Browser `localStorage` persistence.
    Browser(WebPersistentStore),
    /// In-memory persistence for headless builds.
    Headless(MemoryPersistentStore),
}

impl PersistentStore for PersistentStoreAdapter {
    fn namespace(&self) -> &str {
        match self {
            Self::Browser(store) => store.namespace(),
            Self::Headless(store) => store.namespace(),
        }
    }

    fn load_raw<'a>(
        &'a self,
        key: &'a str,
    ) -> PersistentStoreFuture<'a, Result<Option<String>, String>> {
        match self {
            Self::Browser(store) => store.load_raw(key),
            Self::Headless(store) => store.load_raw(key),
        }
    }

    fn save_raw<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PersistentStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.save_raw(key, raw_json),
            Self::Headless(store) => store.save_raw(key, raw_json),
        }
    }

    fn delete<'a>(&'a self, key: &'a str) -> PersistentStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.delete(key),
            Self::Headless(store) => store.delete(key),
        }
    }
}

/// Adapter enum that erases the concrete transport behind [`RemoteClient`].
#[derive(Debug, Clone)]
pub enum RemoteClientAdapter {
    /// Browser `fetch` transport.
    Browser(WebRemoteClient),
    /// Headless builds have no network.
    Headless(NoopRemoteClient),
}

impl RemoteClient for RemoteClientAdapter {
    fn call<'a>(&'a self, request: &'a ApiRequest) -> RemoteFuture<'a, Result<Value, String>> {
        match self {
            Self::Browser(client) => client.call(request),
            Self::Headless(client) => client.call(request),
        }
    }

    fn poll_packages<'a>(&'a self) -> RemoteFuture<'a, Result<Option<PackageCatalog>, String>> {
        match self {
            Self::Browser(client) => client.poll_packages(),
            Self::Headless(client) => client.poll_packages(),
        }
    }
}

/// Builds the persistent-store adapter for the compile-time selected host strategy.
///
/// # Errors
///
/// Returns [`CapabilityError::Unavailable`] when the browser strategy is selected and the host
/// has no usable `localStorage`.
pub fn persistent_store(namespace: &str) -> Result<PersistentStoreAdapter, CapabilityError> {
    match selected_host_strategy() {
        HostStrategy::Browser => {
            WebPersistentStore::new(namespace).map(PersistentStoreAdapter::Browser)
        }
        HostStrategy::Headless => Ok(PersistentStoreAdapter::Headless(
            MemoryPersistentStore::with_namespace(namespace),
        )),
    }
}

/// Builds the remote-client adapter for the compile-time selected host strategy.
pub fn remote_client(base_url: &str) -> RemoteClientAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => RemoteClientAdapter::Browser(WebRemoteClient::new(base_url)),
        HostStrategy::Headless => RemoteClientAdapter::Headless(NoopRemoteClient),
    }
}

/// Builds the host service bundle consumed by the session handler.
///
/// # Errors
///
/// Propagates the persistent-storage capability failure from [`persistent_store`].
pub fn build_host_services(
    namespace: &str,
    base_url: &str,
) -> Result<HostServices, CapabilityError> {
    let store = persistent_store(namespace)?;
    let services = HostServices {
        store: Rc::new(store),
        remote: Rc::new(remote_client(base_url)),
        capabilities: host_capabilities(),
        host_strategy: selected_host_strategy(),
    };
    tracing::debug!(
        strategy = host_strategy_name(),
        namespace,
        "host services composed"
    );
    Ok(services)
}
