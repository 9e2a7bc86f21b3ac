//! Typed host-domain contracts and shared models used by the session handler and browser
//! adapters.
//!
//! This crate is the API-first boundary for platform services. It exposes the persistent
//! key/value store and remote-client service traits, the package catalog model, and the
//! capability/host-bundle types, while concrete browser adapters live in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod host;
pub mod packages;
pub mod remote;
pub mod storage;

pub use host::{
    CapabilityError, CapabilityStatus, HostCapabilities, HostServices, HostStrategy,
    PERSISTENT_STORAGE_CAPABILITY, REMOTE_API_CAPABILITY,
};
pub use packages::{PackageCatalog, PackageMetadata};
pub use remote::{
    parse_packages_body, ApiMethod, ApiRequest, MemoryRemoteClient, NoopRemoteClient,
    RemoteClient, RemoteFuture, API_PATH, PACKAGES_PATH,
};
pub use storage::persistent::{
    load_json_with, namespaced_key, save_json_with, MemoryPersistentStore, NoopPersistentStore,
    PersistentStore, PersistentStoreFuture, DEFAULT_STORAGE_NAMESPACE,
};
