//! Session and settings handling for the web desktop runtime.
//!
//! [`SessionHandler`] bootstraps configuration, loads the package catalog, answers package
//! metadata queries, and persists user settings and session snapshots through the
//! [`platform_host`] store and remote-client services. Hosts build a
//! [`platform_host::HostServices`] bundle, construct a handler directly or through a
//! [`HandlerRegistry`], and drive it through the [`SessionBackend`] interface.

pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod mime;
pub mod registry;
pub mod snapshot;

pub use auth::{AllowAllAuthenticator, AuthFuture, Authenticator};
pub use config::{
    Config, ConfigError, ConfigProvider, CoreConfig, DefaultConfigProvider, Preload, PreloadKind,
    StaticConfigProvider, WindowManagerConfig,
};
pub use error::SessionError;
pub use handler::{
    HandlerState, SessionBackend, SessionFuture, SessionHandler, USER_SESSION_KEY,
    USER_SETTINGS_KEY,
};
pub use mime::MimeIndex;
pub use registry::{HandlerFactory, HandlerRegistry, DEFAULT_HANDLER};
pub use snapshot::{
    ApplicationSessionEntry, Dimension, Position, RunningProcess, SessionApplication,
    SessionSnapshot, SessionWindow, WindowSessionEntry,
};
