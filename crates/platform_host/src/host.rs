//! Shared host-bundle and capability models for runtime composition.

use std::rc::Rc;

use crate::{PersistentStore, RemoteClient};

/// Capability identifier for durable key/value storage.
pub const PERSISTENT_STORAGE_CAPABILITY: &str = "persistent-storage";
/// Capability identifier for the remote API and package catalog transport.
pub const REMOTE_API_CAPABILITY: &str = "remote-api";

/// Stable host strategy selected for the current build/runtime composition path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostStrategy {
    /// Browser-backed composition (`localStorage` + `fetch`).
    Browser,
    /// Headless composition with in-memory storage and no network.
    Headless,
}

impl HostStrategy {
    /// Returns a stable string token for diagnostics and runtime inspection.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Headless => "headless",
        }
    }
}

/// Host availability state for one capability domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityStatus {
    /// Capability is available.
    Available,
    /// Capability is not implemented or not supported on the active host.
    Unavailable,
}

impl CapabilityStatus {
    /// Returns whether the capability can be used immediately.
    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Typed error describing capability-level rejection before a host operation executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// The host does not support the requested capability.
    Unavailable {
        /// Stable capability identifier used in diagnostics.
        capability: &'static str,
    },
}

impl CapabilityError {
    /// Returns a stable capability label for diagnostics.
    pub const fn capability(&self) -> &'static str {
        match self {
            Self::Unavailable { capability } => capability,
        }
    }
}

impl std::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable { capability } => write!(f, "capability unavailable: {capability}"),
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Host capability snapshot exposed to runtime wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    /// Durable key/value storage availability.
    pub persistent_storage: CapabilityStatus,
    /// Remote API and package catalog availability.
    pub remote_api: CapabilityStatus,
}

impl HostCapabilities {
    /// Browser capability posture.
    pub const fn browser() -> Self {
        Self {
            persistent_storage: CapabilityStatus::Available,
            remote_api: CapabilityStatus::Available,
        }
    }

    /// Headless capability posture. Storage is in-memory, so it still counts as available.
    pub const fn headless() -> Self {
        Self {
            persistent_storage: CapabilityStatus::Available,
            remote_api: CapabilityStatus::Unavailable,
        }
    }

    /// Fails with [`CapabilityError::Unavailable`] unless persistent storage is available.
    ///
    /// # Errors
    ///
    /// Returns an error naming [`PERSISTENT_STORAGE_CAPABILITY`] when storage is missing.
    pub fn require_persistent_storage(&self) -> Result<(), CapabilityError> {
        if self.persistent_storage.is_available() {
            Ok(())
        } else {
            Err(CapabilityError::Unavailable {
                capability: PERSISTENT_STORAGE_CAPABILITY,
            })
        }
    }

    /// Fails with [`CapabilityError::Unavailable`] unless the remote API is available.
    ///
    /// # Errors
    ///
    /// Returns an error naming [`REMOTE_API_CAPABILITY`] when there is no transport.
    pub fn require_remote_api(&self) -> Result<(), CapabilityError> {
        if self.remote_api.is_available() {
            Ok(())
        } else {
            Err(CapabilityError::Unavailable {
                capability: REMOTE_API_CAPABILITY,
            })
        }
    }
}

/// Runtime-selected host service bundle injected into the session handler.
///
/// All environment-specific service selection happens before this bundle is built, which keeps
/// the handler decoupled from browser adapter details.
#[derive(Clone)]
pub struct HostServices {
    /// Namespaced durable store for settings and session snapshots.
    pub store: Rc<dyn PersistentStore>,
    /// Remote API and package catalog transport.
    pub remote: Rc<dyn RemoteClient>,
    /// Host availability snapshot.
    pub capabilities: HostCapabilities,
    /// Stable strategy identifier for diagnostics and policy.
    pub host_strategy: HostStrategy,
}

impl HostServices {
    /// Bundles caller-supplied services, mainly in-memory doubles for tests and tooling.
    ///
    /// Both capabilities are reported available since the caller hands over working services.
    pub fn in_memory(store: Rc<dyn PersistentStore>, remote: Rc<dyn RemoteClient>) -> Self {
        Self {
            store,
            remote,
            capabilities: HostCapabilities {
                persistent_storage: CapabilityStatus::Available,
                remote_api: CapabilityStatus::Available,
            },
            host_strategy: HostStrategy::Headless,
        }
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices")
            .field("namespace", &self.store.namespace())
            .field("capabilities", &self.capabilities)
            .field("host_strategy", &self.host_strategy)
            .finish()
    }
}
