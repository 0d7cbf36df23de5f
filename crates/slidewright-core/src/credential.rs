//! Credential collaborator interface.
//!
//! Defines how the composition engine obtains an authorized client handle.

use crate::error::Result;
use std::fmt;

/// An opaque bearer credential for the document service.
///
/// The token never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientHandle {
    access_token: String,
}

impl ClientHandle {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Value for an HTTP `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("access_token", &"<redacted>")
            .finish()
    }
}

/// Service for obtaining an authorized client handle.
///
/// Implementations may run an interactive consent flow on first use and
/// persist state for reuse.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Token files have appropriate permissions (e.g., 600 on Unix)
/// - Tokens are never logged or exposed in error messages
///
/// Failures are reported as [`crate::SlideError::SessionState`].
#[async_trait::async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn authorize(&self) -> Result<ClientHandle>;
}

/// A provider that always hands out the same handle.
///
/// Used for dry runs and tests.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    handle: ClientHandle,
}

impl StaticCredentialProvider {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            handle: ClientHandle::new(access_token),
        }
    }
}

#[async_trait::async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn authorize(&self) -> Result<ClientHandle> {
        Ok(self.handle.clone())
    }
}
