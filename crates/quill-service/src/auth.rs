//! Write-path authentication gate.

use async_trait::async_trait;
use quill_config::SecurityConfig;
use std::fmt;
use subtle::ConstantTimeEq;

/// Username and password presented with a write request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Pass/fail check for write credentials.
#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Returns true when the credentials may write.
    async fn check(&self, credentials: &Credentials) -> bool;
}

/// Gate that accepts a single configured username/password pair.
pub struct StaticCredentialGate {
    expected: Credentials,
}

impl StaticCredentialGate {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            expected: Credentials::new(username, password),
        }
    }

    #[must_use]
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(&config.admin_username, &config.admin_password)
    }
}

#[async_trait]
impl AuthGate for StaticCredentialGate {
    async fn check(&self, credentials: &Credentials) -> bool {
        // Both comparisons always run.
        let username_ok = credentials
            .username
            .as_bytes()
            .ct_eq(self.expected.username.as_bytes());
        let password_ok = credentials
            .password
            .as_bytes()
            .ct_eq(self.expected.password.as_bytes());
        bool::from(username_ok & password_ok)
    }
}
