//! Credential provider reading a ready-made access token from the environment.

use async_trait::async_trait;
use slidewright_core::credential::{ClientHandle, CredentialProvider};
use slidewright_core::{Result, SlideError};
use std::env;

/// Default variable holding the access token.
pub const ACCESS_TOKEN_ENV: &str = "SLIDEWRIGHT_ACCESS_TOKEN";

/// Hands out the token stored in an environment variable.
///
/// Meant for CI and other non-interactive runs where a token is minted
/// elsewhere. The variable is read on every `authorize` call.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var_name: String,
}

impl EnvTokenProvider {
    pub fn new() -> Self {
        Self::with_var(ACCESS_TOKEN_ENV)
    }

    pub fn with_var(var_name: impl Into<String>) -> Self {
        Self {
            var_name: var_name.into(),
        }
    }

    /// Whether the variable is currently set to a non-empty value.
    pub fn is_available(&self) -> bool {
        env::var(&self.var_name).is_ok_and(|value| !value.trim().is_empty())
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for EnvTokenProvider {
    async fn authorize(&self) -> Result<ClientHandle> {
        let token = env::var(&self.var_name).map_err(|_| {
            SlideError::session_state(format!("{} is not set", self.var_name))
        })?;
        let token = token.trim();
        if token.is_empty() {
            return Err(SlideError::session_state(format!(
                "{} is empty",
                self.var_name
            )));
        }
        Ok(ClientHandle::new(token))
    }
}
