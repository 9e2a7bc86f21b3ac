use platform_host::CapabilityError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Failures surfaced by session handler operations. None of them is retried internally.
pub enum SessionError {
    /// A host capability the handler cannot work without is missing.
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    /// The package catalog could not be fetched or parsed.
    #[error("package catalog request failed: {0}")]
    Transport(String),
    /// The package catalog request succeeded but listed no applications.
    #[error("no packages found")]
    NoPackages,
    /// A passthrough API call failed.
    #[error("API call failed: {0}")]
    Api(String),
    /// A persistent store read, write, or decode failed.
    #[error("storage operation on `{key}` failed: {detail}")]
    Storage { key: String, detail: String },
    /// The authenticator could not reach a decision.
    #[error("authentication failed: {0}")]
    Authentication(String),
    /// The authenticator rejected the credentials.
    #[error("login rejected for `{username}`")]
    LoginRejected { username: String },
    /// No handler factory is registered under the requested name.
    #[error("no session handler registered as `{0}`")]
    UnknownHandler(String),
    /// The configuration document handed to the handler did not parse or validate.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SessionError {
    pub(crate) fn storage(key: &str, detail: impl Into<String>) -> Self {
        Self::Storage {
            key: key.to_string(),
            detail: detail.into(),
        }
    }

    /// Diagnostic detail carried by the failure, if any.
    ///
    /// [`SessionError::NoPackages`] carries none, which is how callers tell "nothing to show"
    /// apart from "could not ask".
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Transport(detail) | Self::Api(detail) | Self::Authentication(detail) => {
                Some(detail.as_str())
            }
            Self::Storage { detail, .. } => Some(detail.as_str()),
            Self::NoPackages
            | Self::Capability(_)
            | Self::LoginRejected { .. }
            | Self::UnknownHandler(_)
            | Self::Config(_) => None,
        }
    }
}
