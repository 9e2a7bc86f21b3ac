//! Session handler: configuration bootstrap, package catalog, login/logout, and persisted user
//! settings and session snapshots.
//!
//! The handler is single-threaded. Shared state sits in `Cell`/`RefCell` and no borrow is held
//! across an `.await`, so overlapping operations on one handler interleave safely on a local
//! executor.

use std::{
    cell::{Cell, RefCell},
    future::Future,
    pin::Pin,
    rc::Rc,
};

use platform_host::{
    load_json_with, save_json_with, ApiRequest, HostCapabilities, HostServices, PackageCatalog,
    PackageMetadata, PersistentStore, RemoteClient,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{
    auth::{AllowAllAuthenticator, Authenticator},
    config::{Config, ConfigProvider, DefaultConfigProvider, StaticConfigProvider},
    error::SessionError,
    mime::MimeIndex,
    snapshot::{RunningProcess, SessionSnapshot},
};

/// Logical store key for user settings.
pub const USER_SETTINGS_KEY: &str = "userSettings";
/// Logical store key for the saved session snapshot.
pub const USER_SESSION_KEY: &str = "userSession";

/// Object-safe boxed future used by [`SessionBackend`].
pub type SessionFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Lifecycle of a handler with respect to its package catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    /// Built, `init` not yet called.
    Constructed,
    /// A catalog poll is in flight and none has been applied yet.
    Initializing,
    /// A non-empty catalog is loaded.
    Ready,
    /// The latest poll failed and no catalog was ever loaded.
    Failed,
}

/// Operations a desktop runtime needs from a session backend.
///
/// Every future resolves exactly once and nothing is retried; retry policy belongs to the
/// caller. Calls other than `init` and the metadata queries are only meaningful once the
/// backend is [`HandlerState::Ready`].
pub trait SessionBackend {
    /// Current lifecycle state.
    fn state(&self) -> HandlerState;

    /// Loads the package catalog.
    ///
    /// Resolves to [`SessionError::NoPackages`] when the catalog is empty and to
    /// [`SessionError::Transport`] when it could not be fetched.
    fn init(&self) -> SessionFuture<'_, Result<(), SessionError>>;

    /// Checks credentials with the configured authenticator.
    fn login<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
    ) -> SessionFuture<'a, Result<(), SessionError>>;

    /// Ends the session, saving a snapshot of `processes` when `save` is set.
    ///
    /// The snapshot is taken before this method returns, so `processes` need not outlive the
    /// returned future.
    fn logout<'a>(
        &'a self,
        save: bool,
        processes: &[&dyn RunningProcess],
    ) -> SessionFuture<'a, Result<(), SessionError>>;

    /// Fetches the package catalog without applying it.
    ///
    /// Fails with [`SessionError::Capability`] when the host reports no remote API.
    fn poll_packages(&self) -> SessionFuture<'_, Result<PackageCatalog, SessionError>>;

    /// Issues one request against the remote API endpoint.
    ///
    /// Fails with [`SessionError::Capability`] when the host reports no remote API.
    fn call_api<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> SessionFuture<'a, Result<Value, SessionError>>;

    /// Currently applied catalog; empty until a poll succeeds.
    fn applications_metadata(&self) -> Rc<PackageCatalog>;

    /// Applications able to open files of `mime`, in catalog order.
    ///
    /// `filename` is accepted for resolvers that also match on extensions; this backend matches
    /// on the MIME type alone.
    fn application_names_by_mime(&self, mime: &str, filename: Option<&str>) -> Vec<String>;

    /// Catalog entry for `name`.
    fn application_metadata(&self, name: &str) -> Option<PackageMetadata>;

    /// Persists opaque user settings.
    fn set_user_settings<'a>(
        &'a self,
        settings: &'a Value,
    ) -> SessionFuture<'a, Result<(), SessionError>>;

    /// Reads user settings; `None` when never saved.
    fn user_settings(&self) -> SessionFuture<'_, Result<Option<Value>, SessionError>>;

    /// Persists a session as given. [`SessionSnapshot`] values written by `logout` are stored
    /// in the same shape.
    fn set_user_session<'a>(
        &'a self,
        session: &'a Value,
    ) -> SessionFuture<'a, Result<(), SessionError>>;

    /// Reads the saved session exactly as stored; `None` when never saved.
    ///
    /// The value is not decoded into [`SessionSnapshot`], so geometry and fields written by
    /// other producers come back unchanged.
    fn user_session(&self) -> SessionFuture<'_, Result<Option<Value>, SessionError>>;

    /// Removes the saved session snapshot.
    fn clear_user_session(&self) -> SessionFuture<'_, Result<(), SessionError>>;

    /// Whole configuration tree.
    fn config(&self) -> &Config;

    /// Top-level configuration section by key.
    fn config_value(&self, key: &str) -> Option<Value>;
}

#[derive(Debug, Default)]
struct LoadedPackages {
    catalog: Rc<PackageCatalog>,
    mime: MimeIndex,
}

/// Default [`SessionBackend`] over a [`HostServices`] bundle.
pub struct SessionHandler {
    store: Rc<dyn PersistentStore>,
    remote: Rc<dyn RemoteClient>,
    capabilities: HostCapabilities,
    authenticator: Box<dyn Authenticator>,
    config: Config,
    packages: RefCell<LoadedPackages>,
    state: Cell<HandlerState>,
    issued_polls: Cell<u64>,
    applied_poll: Cell<u64>,
}

impl std::fmt::Debug for SessionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandler")
            .field("namespace", &self.store.namespace())
            .field("state", &self.state.get())
            .field("packages", &self.packages.borrow().catalog.len())
            .finish()
    }
}

impl SessionHandler {
    /// Builds a handler with the default configuration and authenticator.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Capability`] when the host has no persistent storage.
    pub fn new(services: &HostServices) -> Result<Self, SessionError> {
        Self::with_config_provider(services, &DefaultConfigProvider)
    }

    /// Builds a handler whose configuration comes from `provider`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Capability`] when the host has no persistent storage.
    pub fn with_config_provider(
        services: &HostServices,
        provider: &dyn ConfigProvider,
    ) -> Result<Self, SessionError> {
        services.capabilities.require_persistent_storage()?;
        let config = provider.provide();
        tracing::debug!(
            strategy = services.host_strategy.as_str(),
            namespace = services.store.namespace(),
            window_manager = config.wm.exec.as_str(),
            "session handler constructed"
        );
        Ok(Self {
            store: Rc::clone(&services.store),
            remote: Rc::clone(&services.remote),
            capabilities: services.capabilities,
            authenticator: Box::new(AllowAllAuthenticator),
            config,
            packages: RefCell::new(LoadedPackages::default()),
            state: Cell::new(HandlerState::Constructed),
            issued_polls: Cell::new(0),
            applied_poll: Cell::new(0),
        })
    }

    /// Builds a handler from a TOML configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] when the document does not parse or validate, and
    /// [`SessionError::Capability`] when the host has no persistent storage.
    pub fn with_toml_config(services: &HostServices, raw: &str) -> Result<Self, SessionError> {
        let provider = StaticConfigProvider::from_toml_str(raw)?;
        Self::with_config_provider(services, &provider)
    }

    /// Replaces the login policy.
    pub fn with_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Box::new(authenticator);
        self
    }

    fn issue_poll_ticket(&self) -> u64 {
        let ticket = self.issued_polls.get() + 1;
        self.issued_polls.set(ticket);
        ticket
    }

    /// Applies a poll outcome unless a later-issued poll has already been applied.
    fn settle_poll(
        &self,
        ticket: u64,
        outcome: Result<PackageCatalog, SessionError>,
    ) -> Result<(), SessionError> {
        if ticket < self.applied_poll.get() {
            tracing::debug!(
                ticket,
                applied = self.applied_poll.get(),
                "discarding stale package poll"
            );
            return outcome.map(|_| ());
        }

        match outcome {
            Ok(catalog) => {
                let mime = MimeIndex::from_catalog(&catalog);
                tracing::info!(ticket, packages = catalog.len(), "package catalog applied");
                *self.packages.borrow_mut() = LoadedPackages {
                    catalog: Rc::new(catalog),
                    mime,
                };
                self.applied_poll.set(ticket);
                self.state.set(HandlerState::Ready);
                Ok(())
            }
            Err(err) => {
                if self.state.get() != HandlerState::Ready {
                    self.state.set(HandlerState::Failed);
                }
                Err(err)
            }
        }
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), SessionError> {
        save_json_with(self.store.as_ref(), key, value)
            .await
            .map_err(|detail| {
                tracing::warn!(key, %detail, "session store write failed");
                SessionError::storage(key, detail)
            })
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        load_json_with(self.store.as_ref(), key)
            .await
            .map_err(|detail| {
                tracing::warn!(key, %detail, "session store read failed");
                SessionError::storage(key, detail)
            })
    }
}

impl SessionBackend for SessionHandler {
    fn state(&self) -> HandlerState {
        self.state.get()
    }

    fn init(&self) -> SessionFuture<'_, Result<(), SessionError>> {
        let ticket = self.issue_poll_ticket();
        if self.state.get() != HandlerState::Ready {
            self.state.set(HandlerState::Initializing);
        }
        Box::pin(async move {
            let outcome = self.poll_packages().await;
            self.settle_poll(ticket, outcome)
        })
    }

    fn login<'a>(
        &'a self,
        username: &'a str,
        password: &'a str,
    ) -> SessionFuture<'a, Result<(), SessionError>> {
        Box::pin(async move {
            match self.authenticator.authenticate(username, password).await {
                Ok(true) => {
                    tracing::info!(username, "login accepted");
                    Ok(())
                }
                Ok(false) => {
                    tracing::info!(username, "login rejected");
                    Err(SessionError::LoginRejected {
                        username: username.to_string(),
                    })
                }
                Err(detail) => Err(SessionError::Authentication(detail)),
            }
        })
    }

    fn logout<'a>(
        &'a self,
        save: bool,
        processes: &[&dyn RunningProcess],
    ) -> SessionFuture<'a, Result<(), SessionError>> {
        if !save {
            return Box::pin(async { Ok(()) });
        }
        let snapshot = SessionSnapshot::capture(processes);
        Box::pin(async move {
            tracing::info!(applications = snapshot.len(), "saving session on logout");
            self.write_json(USER_SESSION_KEY, &snapshot).await
        })
    }

    fn poll_packages(&self) -> SessionFuture<'_, Result<PackageCatalog, SessionError>> {
        Box::pin(async move {
            self.capabilities.require_remote_api()?;
            match self.remote.poll_packages().await {
                Ok(Some(catalog)) if !catalog.is_empty() => Ok(catalog),
                Ok(_) => {
                    tracing::warn!("package catalog is empty");
                    Err(SessionError::NoPackages)
                }
                Err(detail) => {
                    tracing::warn!(%detail, "package catalog request failed");
                    Err(SessionError::Transport(detail))
                }
            }
        })
    }

    fn call_api<'a>(
        &'a self,
        request: &'a ApiRequest,
    ) -> SessionFuture<'a, Result<Value, SessionError>> {
        Box::pin(async move {
            self.capabilities.require_remote_api()?;
            self.remote.call(request).await.map_err(SessionError::Api)
        })
    }

    fn applications_metadata(&self) -> Rc<PackageCatalog> {
        Rc::clone(&self.packages.borrow().catalog)
    }

    fn application_names_by_mime(&self, mime: &str, _filename: Option<&str>) -> Vec<String> {
        self.packages.borrow().mime.applications_for(mime)
    }

    fn application_metadata(&self, name: &str) -> Option<PackageMetadata> {
        self.packages.borrow().catalog.get(name).cloned()
    }

    fn set_user_settings<'a>(
        &'a self,
        settings: &'a Value,
    ) -> SessionFuture<'a, Result<(), SessionError>> {
        Box::pin(async move { self.write_json(USER_SETTINGS_KEY, settings).await })
    }

    fn user_settings(&self) -> SessionFuture<'_, Result<Option<Value>, SessionError>> {
        Box::pin(async move { self.read_json(USER_SETTINGS_KEY).await })
    }

    fn set_user_session<'a>(
        &'a self,
        session: &'a Value,
    ) -> SessionFuture<'a, Result<(), SessionError>> {
        Box::pin(async move { self.write_json(USER_SESSION_KEY, session).await })
    }

    fn user_session(&self) -> SessionFuture<'_, Result<Option<Value>, SessionError>> {
        Box::pin(async move { self.read_json(USER_SESSION_KEY).await })
    }

    fn clear_user_session(&self) -> SessionFuture<'_, Result<(), SessionError>> {
        Box::pin(async move {
            self.store
                .delete(USER_SESSION_KEY)
                .await
                .map_err(|detail| SessionError::storage(USER_SESSION_KEY, detail))
        })
    }

    fn config(&self) -> &Config {
        &self.config
    }

    fn config_value(&self, key: &str) -> Option<Value> {
        self.config.value(key)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::VecDeque, task::Poll};

    use futures::{channel::oneshot, executor::block_on, future};
    use platform_host::{
        MemoryPersistentStore, MemoryRemoteClient, PersistentStoreFuture, RemoteFuture,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::config::ConfigError;
    use crate::snapshot::fixtures::{FakeApp, FakeService};

    fn catalog(value: Value) -> PackageCatalog {
        serde_json::from_value(value).expect("catalog fixture")
    }

    fn sample_catalog() -> PackageCatalog {
        catalog(json!({
            "A": {"mime": ["text/.*"], "name": "Writer"},
            "B": {"mime": ["image/.*"]}
        }))
    }

    struct Fixture {
        store: MemoryPersistentStore,
        remote: MemoryRemoteClient,
        handler: SessionHandler,
    }

    fn fixture() -> Fixture {
        let store = MemoryPersistentStore::with_namespace("test/");
        let remote = MemoryRemoteClient::with_packages(sample_catalog());
        let services = HostServices::in_memory(Rc::new(store.clone()), Rc::new(remote.clone()));
        let handler = SessionHandler::new(&services).expect("handler");
        Fixture {
            store,
            remote,
            handler,
        }
    }

    #[test]
    fn init_applies_catalog_and_becomes_ready() {
        let fx = fixture();
        assert_eq!(fx.handler.state(), HandlerState::Constructed);
        assert!(fx.handler.applications_metadata().is_empty());

        block_on(fx.handler.init()).expect("init");

        assert_eq!(fx.handler.state(), HandlerState::Ready);
        assert_eq!(*fx.handler.applications_metadata(), sample_catalog());
        assert_eq!(
            fx.handler.application_metadata("A"),
            sample_catalog().get("A").cloned()
        );
        assert_eq!(fx.handler.application_metadata("Z"), None);
    }

    #[test]
    fn empty_catalog_reports_no_packages_without_detail() {
        for response in [Ok(None), Ok(Some(PackageCatalog::default()))] {
            let fx = fixture();
            fx.remote.set_packages_response(response);

            let err = block_on(fx.handler.init()).expect_err("empty catalog");

            assert_eq!(err, SessionError::NoPackages);
            assert_eq!(err.detail(), None);
            assert_eq!(fx.handler.state(), HandlerState::Failed);
            assert!(fx.handler.applications_metadata().is_empty());
        }
    }

    #[test]
    fn transport_failure_reports_detail() {
        let fx = fixture();
        fx.remote
            .set_packages_response(Err("HTTP 503 from /packages.json".to_string()));

        let err = block_on(fx.handler.init()).expect_err("transport failure");

        assert_eq!(err.detail(), Some("HTTP 503 from /packages.json"));
        assert_eq!(fx.handler.state(), HandlerState::Failed);
    }

    #[test]
    fn failed_repoll_keeps_loaded_catalog() {
        let fx = fixture();
        block_on(fx.handler.init()).expect("first init");
        fx.remote.set_packages_response(Err("offline".to_string()));

        assert!(block_on(fx.handler.init()).is_err());

        assert_eq!(fx.handler.state(), HandlerState::Ready);
        assert_eq!(fx.handler.applications_metadata().len(), 2);
    }

    #[test]
    fn successful_repoll_replaces_catalog_wholesale() {
        let fx = fixture();
        block_on(fx.handler.init()).expect("first init");
        fx.remote
            .set_packages_response(Ok(Some(catalog(json!({"C": {"mime": []}})))));

        block_on(fx.handler.init()).expect("second init");

        let names = fx
            .handler
            .applications_metadata()
            .iter()
            .map(|(name, _)| name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["C".to_string()]);
        assert!(fx.handler.application_names_by_mime("text/plain", None).is_empty());
    }

    #[test]
    fn polls_are_not_coalesced() {
        let fx = fixture();
        let (first, second) = block_on(future::join(
            fx.handler.poll_packages(),
            fx.handler.poll_packages(),
        ));
        assert!(first.is_ok() && second.is_ok());
        assert_eq!(fx.remote.package_polls(), 2);
        assert_eq!(fx.handler.state(), HandlerState::Constructed);
    }

    type QueuedResponse = Result<Option<PackageCatalog>, String>;

    struct QueuedRemote {
        pending: RefCell<VecDeque<oneshot::Receiver<QueuedResponse>>>,
    }

    impl RemoteClient for QueuedRemote {
        fn call<'a>(&'a self, _request: &'a ApiRequest) -> RemoteFuture<'a, Result<Value, String>> {
            Box::pin(async { Err("not scripted".to_string()) })
        }

        fn poll_packages<'a>(&'a self) -> RemoteFuture<'a, QueuedResponse> {
            let next = self.pending.borrow_mut().pop_front();
            Box::pin(async move {
                match next {
                    Some(rx) => rx.await.unwrap_or_else(|_| Err("cancelled".to_string())),
                    None => Err("not scripted".to_string()),
                }
            })
        }
    }

    async fn yield_now() {
        let mut yielded = false;
        future::poll_fn(|cx| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .await
    }

    #[test]
    fn overlapping_inits_last_issued_wins() {
        let (older_tx, older_rx) = oneshot::channel();
        let (newer_tx, newer_rx) = oneshot::channel();
        let remote = QueuedRemote {
            pending: RefCell::new(VecDeque::from([older_rx, newer_rx])),
        };
        let services =
            HostServices::in_memory(Rc::new(MemoryPersistentStore::default()), Rc::new(remote));
        let handler = SessionHandler::new(&services).expect("handler");

        let older = handler.init();
        let newer = handler.init();
        let driver = async move {
            let _ = newer_tx.send(Ok(Some(catalog(json!({"Newer": {"mime": []}})))));
            yield_now().await;
            let _ = older_tx.send(Ok(Some(catalog(json!({"Older": {"mime": []}})))));
        };

        let (older_result, newer_result, ()) = block_on(future::join3(older, newer, driver));

        assert!(older_result.is_ok());
        assert!(newer_result.is_ok());
        assert!(handler.application_metadata("Newer").is_some());
        assert!(handler.application_metadata("Older").is_none());
        assert_eq!(handler.state(), HandlerState::Ready);
    }

    #[test]
    fn mime_lookup_uses_applied_catalog() {
        let fx = fixture();
        assert!(fx.handler.application_names_by_mime("text/plain", None).is_empty());

        block_on(fx.handler.init()).expect("init");

        assert_eq!(
            fx.handler.application_names_by_mime("text/plain", Some("a.txt")),
            vec!["A".to_string()]
        );
        assert_eq!(
            fx.handler.application_names_by_mime("image/png", None),
            vec!["B".to_string()]
        );
    }

    #[test]
    fn settings_round_trip_and_reads_are_stable() {
        let fx = fixture();
        assert_eq!(block_on(fx.handler.user_settings()).expect("empty read"), None);

        for settings in [
            json!({}),
            json!({"desktop": {"wallpaper": "teal", "icons": [1, 2, {"x": null}]}}),
            json!("plain string"),
        ] {
            block_on(fx.handler.set_user_settings(&settings)).expect("save");
            let first = block_on(fx.handler.user_settings()).expect("read");
            let second = block_on(fx.handler.user_settings()).expect("read again");
            assert_eq!(first, Some(settings));
            assert_eq!(first, second);
        }
        assert_eq!(fx.store.physical_keys(), vec!["test/userSettings".to_string()]);
    }

    #[test]
    fn logout_without_save_performs_no_io() {
        let fx = fixture();
        let app = FakeApp::with_windows("Writer", 2);
        let processes: Vec<&dyn RunningProcess> = vec![&app];

        block_on(fx.handler.logout(false, &processes)).expect("logout");

        assert_eq!(fx.store.write_count(), 0);
        assert_eq!(block_on(fx.handler.user_session()).expect("read"), None);
    }

    #[test]
    fn logout_with_save_persists_snapshot_of_applications() {
        let fx = fixture();
        let writer = FakeApp::with_windows("Writer", 3);
        let daemon = FakeService;
        let clock = FakeApp::with_windows("Clock", 0);
        let processes: Vec<&dyn RunningProcess> = vec![&writer, &daemon, &clock];

        block_on(fx.handler.logout(true, &processes)).expect("logout");

        let restored = block_on(fx.handler.user_session())
            .expect("read")
            .expect("saved session");
        let again = block_on(fx.handler.user_session()).expect("read again");
        assert_eq!(again.as_ref(), Some(&restored));

        let expected = serde_json::to_value(SessionSnapshot::capture(&processes)).expect("ser");
        assert_eq!(restored, expected);
        let restored: SessionSnapshot = serde_json::from_value(restored).expect("typed view");
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.applications[0].windows.len(), 3);
        let window_names = restored.applications[0]
            .windows
            .iter()
            .map(|w| w.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(window_names, vec!["main", "dialog", "about"]);
        assert!(restored.applications[1].windows.is_empty());
        assert_eq!(fx.store.write_count(), 1);
    }

    #[test]
    fn logout_snapshot_is_taken_before_awaiting() {
        let fx = fixture();
        let pending = {
            let app = FakeApp::with_windows("Writer", 1);
            let processes: Vec<&dyn RunningProcess> = vec![&app];
            fx.handler.logout(true, &processes)
        };

        block_on(pending).expect("logout");

        let restored = block_on(fx.handler.user_session()).expect("read");
        assert_eq!(
            restored.as_ref().and_then(Value::as_array).map(Vec::len),
            Some(1)
        );
    }

    #[test]
    fn restored_session_is_returned_exactly_as_stored() {
        let fx = fixture();
        let raw = concat!(
            r#"[{"args":{"path":"/home"},"name":"Writer","windows":[{"dimension":"#,
            r#"{"height":300,"width":400.5},"name":"main","position":{"x":12.25,"y":0},"#,
            r#""state":{},"zIndex":3}]}]"#
        );
        block_on(fx.store.save_raw(USER_SESSION_KEY, raw)).expect("seed");

        let restored = block_on(fx.handler.user_session())
            .expect("read")
            .expect("saved session");

        assert_eq!(serde_json::to_string(&restored).expect("ser"), raw);

        block_on(fx.handler.set_user_session(&restored)).expect("save back");
        assert_eq!(
            block_on(fx.store.load_raw(USER_SESSION_KEY)).expect("load"),
            Some(raw.to_string())
        );
    }

    #[test]
    fn clear_user_session_removes_snapshot() {
        let fx = fixture();
        block_on(fx.handler.set_user_session(&json!([]))).expect("save");
        assert_eq!(
            block_on(fx.handler.user_session()).expect("read"),
            Some(json!([]))
        );

        block_on(fx.handler.clear_user_session()).expect("clear");

        assert_eq!(block_on(fx.handler.user_session()).expect("read"), None);
    }

    #[test]
    fn corrupt_session_is_a_storage_error() {
        let fx = fixture();
        block_on(fx.store.save_raw(USER_SESSION_KEY, "[{\"name\": ")).expect("seed");

        let err = block_on(fx.handler.user_session()).expect_err("corrupt session");

        assert!(matches!(err, SessionError::Storage { ref key, .. } if key == USER_SESSION_KEY));
    }

    #[derive(Debug, Default)]
    struct QuotaExceededStore;

    impl PersistentStore for QuotaExceededStore {
        fn namespace(&self) -> &str {
            "full/"
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
            Box::pin(async { Err("QuotaExceededError".to_string()) })
        }

        fn delete<'a>(&'a self, _key: &'a str) -> PersistentStoreFuture<'a, Result<(), String>> {
            Box::pin(async { Ok(()) })
        }
    }

    #[test]
    fn storage_write_failures_are_surfaced() {
        let services = HostServices::in_memory(
            Rc::new(QuotaExceededStore),
            Rc::new(MemoryRemoteClient::default()),
        );
        let handler = SessionHandler::new(&services).expect("handler");

        let err = block_on(handler.set_user_settings(&json!({"a": 1}))).expect_err("quota");

        assert_eq!(
            err,
            SessionError::Storage {
                key: USER_SETTINGS_KEY.to_string(),
                detail: "QuotaExceededError".to_string(),
            }
        );
    }

    #[test]
    fn construction_requires_persistent_storage() {
        let mut services = HostServices::in_memory(
            Rc::new(MemoryPersistentStore::default()),
            Rc::new(MemoryRemoteClient::default()),
        );
        services.capabilities.persistent_storage = platform_host::CapabilityStatus::Unavailable;

        let err = SessionHandler::new(&services).expect_err("no storage");

        assert!(matches!(err, SessionError::Capability(_)));
    }

    struct DenyAll;

    impl Authenticator for DenyAll {
        fn authenticate<'a>(
            &'a self,
            _username: &'a str,
            _password: &'a str,
        ) -> crate::auth::AuthFuture<'a> {
            Box::pin(async { Ok(false) })
        }
    }

    #[test]
    fn login_reports_authenticator_decision() {
        let fx = fixture();
        block_on(fx.handler.login("demo", "demo")).expect("default policy accepts");

        let handler = fx.handler.with_authenticator(DenyAll);
        let err = block_on(handler.login("mallory", "guess")).expect_err("rejected");
        assert_eq!(
            err,
            SessionError::LoginRejected {
                username: "mallory".to_string()
            }
        );
    }

    #[test]
    fn remote_operations_require_remote_api() {
        let store = MemoryPersistentStore::default();
        let remote = MemoryRemoteClient::with_packages(sample_catalog());
        let mut services = HostServices::in_memory(Rc::new(store), Rc::new(remote.clone()));
        services.capabilities.remote_api = platform_host::CapabilityStatus::Unavailable;
        let handler = SessionHandler::new(&services).expect("handler");

        let err = block_on(handler.init()).expect_err("no remote api");
        assert!(matches!(
            err,
            SessionError::Capability(ref cap)
                if cap.capability() == platform_host::REMOTE_API_CAPABILITY
        ));
        assert_eq!(handler.state(), HandlerState::Failed);

        let request = ApiRequest::get();
        assert!(matches!(
            block_on(handler.call_api(&request)),
            Err(SessionError::Capability(_))
        ));
        assert_eq!(remote.package_polls(), 0);
        assert!(remote.api_calls().is_empty());
    }

    #[test]
    fn toml_config_errors_surface_as_config_failures() {
        let services = HostServices::in_memory(
            Rc::new(MemoryPersistentStore::default()),
            Rc::new(MemoryRemoteClient::default()),
        );

        let handler = SessionHandler::with_toml_config(
            &services,
            "[Core]\nHome = \"/h\"\nMaxUploadSize = 8\n[WM]\nexec = \"TilingWM\"\n",
        )
        .expect("valid config");
        assert_eq!(handler.config().wm.exec, "TilingWM");

        let err = SessionHandler::with_toml_config(
            &services,
            "[Core]\nHome = \"/h\"\nMaxUploadSize = 0\n[WM]\nexec = \"CoreWM\"\n",
        )
        .expect_err("invalid config");
        assert!(matches!(err, SessionError::Config(ConfigError::Invalid(_))));
    }

    #[test]
    fn config_lookup_matches_whole_tree() {
        let fx = fixture();
        let whole = fx.handler.config().to_value();
        for key in ["Core", "WM"] {
            assert_eq!(fx.handler.config_value(key).as_ref(), whole.get(key));
        }
        assert_eq!(fx.handler.config_value("Nope"), None);
    }

    #[test]
    fn api_calls_pass_through_unchanged() {
        let fx = fixture();
        let request = ApiRequest::post(json!({"method": "fs.ls", "path": "/home"}));
        fx.remote.set_api_response(Ok(json!({"result": []})));

        let response = block_on(fx.handler.call_api(&request)).expect("api call");

        assert_eq!(response, json!({"result": []}));
        assert_eq!(fx.remote.api_calls(), vec![request.clone()]);

        fx.remote.set_api_response(Err("HTTP 500".to_string()));
        let err = block_on(fx.handler.call_api(&request)).expect_err("api failure");
        assert_eq!(err, SessionError::Api("HTTP 500".to_string()));
    }
}
