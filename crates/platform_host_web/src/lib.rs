//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! This crate is the concrete browser-side host wiring layer for the persistent store
//! (`localStorage`) and the remote client (`fetch`).
//!
//! Bridge bindings are split by domain under `bridge/`:
//! - `bridge::local_storage`
//! - `bridge::http`
//! - `bridge::interop` (shared wasm/non-wasm transport glue)

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and concrete adapter factories for runtime wiring.
pub mod adapters;
mod bridge;
pub mod remote;
pub mod storage;

pub use adapters::{
    build_host_services, host_capabilities, host_strategy_name, persistent_store, remote_client,
    selected_host_strategy, PersistentStoreAdapter, RemoteClientAdapter,
};
pub use remote::WebRemoteClient;
pub use storage::local_store::WebPersistentStore;
