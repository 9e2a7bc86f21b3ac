//! `localStorage`-backed persistent store implementation.
//!
//! The browser API is synchronous; the adapter still implements the async
//! [`platform_host::PersistentStore`] contract so higher layers stay backend-agnostic.

use platform_host::{
    namespaced_key, CapabilityError, PersistentStore, PersistentStoreFuture,
    PERSISTENT_STORAGE_CAPABILITY,
};

use crate::bridge;

/// Logical key written and removed once when the store is opened.
const AVAILABILITY_PROBE_KEY: &str = "__storage_probe__";

#[derive(Debug, Clone)]
/// Browser persistent store backed by `window.localStorage`, scoped to one namespace.
pub struct WebPersistentStore {
    namespace: String,
}

impl WebPersistentStore {
    /// Opens the store for `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Unavailable`] when the host has no usable `localStorage`. The
    /// failure is final; callers decide whether to fall back to another store.
    pub fn new(namespace: impl Into<String>) -> Result<Self, CapabilityError> {
        let namespace = namespace.into();
        if !bridge::local_storage_available(&probe_key(&namespace)) {
            tracing::warn!("localStorage is not available on this host");
            return Err(CapabilityError::Unavailable {
                capability: PERSISTENT_STORAGE_CAPABILITY,
            });
        }
        Ok(Self { namespace })
    }

    fn physical_key(&self, key: &str) -> String {
        namespaced_key(&self.namespace, key)
    }

    /// Loads raw JSON text for a logical key.
    ///
    /// # Errors
    ///
    /// Returns an error when the `localStorage` read throws.
    pub fn load_json(&self, key: &str) -> Result<Option<String>, String> {
        bridge::local_storage_get(&self.physical_key(key))
    }

    /// Saves raw JSON text for a logical key.
    ///
    /// # Errors
    ///
    /// Returns an error when the write fails, for example when the storage quota is exceeded.
    pub fn save_json(&self, key: &str, raw_json: &str) -> Result<(), String> {
        bridge::local_storage_set(&self.physical_key(key), raw_json)
    }

    /// Removes a logical key.
    ///
    /// # Errors
    ///
    /// Returns an error when the `localStorage` delete throws.
    pub fn delete_json(&self, key: &str) -> Result<(), String> {
        bridge::local_storage_remove(&self.physical_key(key))
    }
}

/// Physical key used to check that `localStorage` accepts writes for `namespace`.
fn probe_key(namespace: &str) -> String {
    namespaced_key(namespace, AVAILABILITY_PROBE_KEY)
}

impl PersistentStore for WebPersistentStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn load_raw<'a>(
        &'a self,
        key: &'a str,
    ) -> PersistentStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { self.load_json(key) })
    }

    fn save_raw<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PersistentStoreFuture<'a, Result<(), String>> {
        Box::pin(async move { self.save_json(key, raw_json) })
    }

    fn delete<'a>(&'a self, key: &'a str) -> PersistentStoreFuture<'a, Result<(), String>> {
        Box::pin(async move { self.delete_json(key) })
    }
}
