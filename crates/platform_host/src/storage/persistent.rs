//! Namespaced persistent key/value storage contracts and adapters.
//!
//! Values cross the store boundary as JSON text. Every store owns a namespace prefix that is
//! prepended to logical keys so several deployments can share one storage origin without
//! reading each other's entries.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::{de::DeserializeOwned, Serialize};

/// Namespace prefix used when a deployment does not configure its own.
pub const DEFAULT_STORAGE_NAMESPACE: &str = "webdesk.session.v1/";

/// Object-safe boxed future used by [`PersistentStore`] async methods.
pub type PersistentStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Builds the physical storage key for a logical `key` under `namespace`.
pub fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{namespace}{key}")
}

/// Host service for durable JSON values keyed by logical name within one namespace.
pub trait PersistentStore {
    /// Returns the namespace prefix applied to every logical key.
    fn namespace(&self) -> &str;

    /// Loads the raw JSON text stored for a logical key.
    fn load_raw<'a>(
        &'a self,
        key: &'a str,
    ) -> PersistentStoreFuture<'a, Result<Option<String>, String>>;

    /// Stores raw JSON text for a logical key, replacing any prior value.
    fn save_raw<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PersistentStoreFuture<'a, Result<(), String>>;

    /// Removes the value stored for a logical key.
    fn delete<'a>(&'a self, key: &'a str) -> PersistentStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op store for unsupported targets and baseline tests. Reads are always empty.
pub struct NoopPersistentStore;

impl PersistentStore for NoopPersistentStore {
    fn namespace(&self) -> &str {
        ""
    }

    fn load_raw<'a>(
        &'a self,
        _key: &'a str,
    ) -> PersistentStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_raw<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PersistentStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }

    fn delete<'a>(&'a self, _key: &'a str) -> PersistentStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone)]
/// In-memory store keyed by physical (namespaced) key.
///
/// Clones and [`MemoryPersistentStore::scoped`] views share the same backing map, which makes
/// the type usable both as a test double and as the headless-host store.
pub struct MemoryPersistentStore {
    namespace: String,
    inner: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<Cell<usize>>,
}

impl Default for MemoryPersistentStore {
    fn default() -> Self {
        Self::with_namespace(DEFAULT_STORAGE_NAMESPACE)
    }
}

impl MemoryPersistentStore {
    /// Creates an empty store using `namespace` as key prefix.
    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            inner: Rc::new(RefCell::new(HashMap::new())),
            writes: Rc::new(Cell::new(0)),
        }
    }

    /// Returns a view over the same backing map under a different namespace.
    pub fn scoped(&self, namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            inner: Rc::clone(&self.inner),
            writes: Rc::clone(&self.writes),
        }
    }

    /// Number of save/delete operations issued against the backing map.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Physical keys currently present in the backing map, sorted.
    pub fn physical_keys(&self) -> Vec<String> {
        let mut keys = self.inner.borrow().keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }

    fn bump_writes(&self) {
        self.writes.set(self.writes.get() + 1);
    }
}

impl PersistentStore for MemoryPersistentStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn load_raw<'a>(
        &'a self,
        key: &'a str,
    ) -> PersistentStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move {
            Ok(self
                .inner
                .borrow()
                .get(&namespaced_key(&self.namespace, key))
                .cloned())
        })
    }

    fn save_raw<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PersistentStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.bump_writes();
            self.inner
                .borrow_mut()
                .insert(namespaced_key(&self.namespace, key), raw_json.to_string());
            Ok(())
        })
    }

    fn delete<'a>(&'a self, key: &'a str) -> PersistentStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.bump_writes();
            self.inner
                .borrow_mut()
                .remove(&namespaced_key(&self.namespace, key));
            Ok(())
        })
    }
}

/// Loads and deserializes a typed value through a [`PersistentStore`] implementation.
///
/// A key that was never written yields `Ok(None)`.
///
/// # Errors
///
/// Returns an error when the store read or JSON deserialization fails.
pub async fn load_json_with<S: PersistentStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = store.load_raw(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    Ok(Some(value))
}

/// Serializes and saves a typed value through a [`PersistentStore`] implementation.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_json_with<S: PersistentStore + ?Sized, T: Serialize + ?Sized>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.save_raw(key, &raw).await
}
