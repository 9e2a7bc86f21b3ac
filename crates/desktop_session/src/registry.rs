//! Named handler construction for runtime composition.
//!
//! The registry is an ordinary value owned by whoever composes the desktop runtime; there is no
//! process-wide handler table.

use std::collections::BTreeMap;

use platform_host::HostServices;

use crate::{
    error::SessionError,
    handler::{SessionBackend, SessionHandler},
};

/// Name under which [`SessionHandler`] is registered by [`HandlerRegistry::with_defaults`].
pub const DEFAULT_HANDLER: &str = "default";

/// Builds a session backend from the host service bundle.
pub type HandlerFactory = fn(&HostServices) -> Result<Box<dyn SessionBackend>, SessionError>;

fn default_factory(services: &HostServices) -> Result<Box<dyn SessionBackend>, SessionError> {
    let handler = SessionHandler::new(services)?;
    Ok(Box::new(handler))
}

#[derive(Clone, Default)]
pub struct HandlerRegistry {
    factories: BTreeMap<String, HandlerFactory>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.names())
            .finish()
    }
}

impl HandlerRegistry {
    /// Registry containing [`DEFAULT_HANDLER`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(DEFAULT_HANDLER, default_factory);
        registry
    }

    /// Registers `factory` under `name`, returning the factory it replaced.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: HandlerFactory,
    ) -> Option<HandlerFactory> {
        self.factories.insert(name.into(), factory)
    }

    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    /// Constructs the backend registered as `name`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownHandler`] for unregistered names and forwards the
    /// factory's own construction failure.
    pub fn create(
        &self,
        name: &str,
        services: &HostServices,
    ) -> Result<Box<dyn SessionBackend>, SessionError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| SessionError::UnknownHandler(name.to_string()))?;
        factory(services)
    }
}
