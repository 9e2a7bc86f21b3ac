//! Credential check seam used by `login`. Policy lives with the host, not the handler.

use std::{future::Future, pin::Pin};

pub type AuthFuture<'a> = Pin<Box<dyn Future<Output = Result<bool, String>> + 'a>>;

pub trait Authenticator {
    /// Resolves to `Ok(true)` when the credentials are accepted.
    fn authenticate<'a>(&'a self, username: &'a str, password: &'a str) -> AuthFuture<'a>;
}

/// Accepts every login. Used when the host performs no authentication of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllAuthenticator;

impl Authenticator for AllowAllAuthenticator {
    fn authenticate<'a>(&'a self, _username: &'a str, _password: &'a str) -> AuthFuture<'a> {
        Box::pin(async { Ok(true) })
    }
}
