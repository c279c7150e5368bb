//! Admin authorization capability.
//!
//! The pipeline only needs to know that ingestion was authorized. How that
//! was established is up to the [`Authenticator`] implementation; the bundled
//! [`SharedSecretAuthenticator`] checks a single configured username/password
//! pair and is not meant as a real authentication system.

use async_trait::async_trait;
use tracing::warn;

use crate::error::{RagError, Result};

/// Proof that an admin was authenticated.
///
/// Ingestion requires one. Sessions are meant to be minted by an
/// [`Authenticator`] after a successful check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    username: String,
}

impl AdminSession {
    /// Mint a session for `username`. Intended for [`Authenticator`] implementations.
    pub fn grant(username: impl Into<String>) -> Self {
        Self { username: username.into() }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

/// Trait for authorizing admin access.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Check credentials and return an admin session.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Unauthorized`] if the credentials are rejected.
    async fn authenticate(&self, username: &str, password: &str) -> Result<AdminSession>;
}

/// Compares credentials against one shared username/password pair.
#[derive(Clone)]
pub struct SharedSecretAuthenticator {
    username: String,
    password: String,
}

impl std::fmt::Debug for SharedSecretAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretAuthenticator")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl SharedSecretAuthenticator {
    /// Create an authenticator for the given credential pair.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if either value is empty.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() || password.is_empty() {
            return Err(RagError::ConfigError(
                "admin username and password must not be empty".to_string(),
            ));
        }
        Ok(Self { username, password })
    }
}

#[async_trait]
impl Authenticator for SharedSecretAuthenticator {
    async fn authenticate(&self, username: &str, password: &str) -> Result<AdminSession> {
        // Both comparisons always run.
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        if user_ok & pass_ok {
            Ok(AdminSession::grant(username))
        } else {
            warn!(username, "admin login rejected");
            Err(RagError::Unauthorized("invalid admin credentials".to_string()))
        }
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
