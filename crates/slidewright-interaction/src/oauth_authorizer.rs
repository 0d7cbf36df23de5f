//! OAuthAuthorizer - installed-app OAuth flow for the Slides API.
//!
//! Reuses the persisted token while it is valid, refreshes it when it has
//! expired, and otherwise asks the user for consent.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use slidewright_core::config::AuthConfig;
use slidewright_core::credential::{ClientHandle, CredentialProvider};
use slidewright_core::{Result, SlideError};
use slidewright_infrastructure::SlidewrightPaths;
use slidewright_infrastructure::storage::{
    ClientSecret, ClientSecretStorage, StoredToken, TokenStorage,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Tokens expiring within this window are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

/// Obtains an authorization code from the user.
#[async_trait]
pub trait ConsentPrompt: Send + Sync {
    /// Shows `consent_url` and returns whatever the user pastes back.
    async fn request_code(&self, consent_url: &str) -> Result<String>;
}

/// Prints the consent URL on stderr and reads the code from stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioConsentPrompt;

#[async_trait]
impl ConsentPrompt for StdioConsentPrompt {
    async fn request_code(&self, consent_url: &str) -> Result<String> {
        eprintln!("Open this URL in your browser to authorize Slidewright:\n\n  {consent_url}\n");
        eprintln!("Paste the authorization code (or the full redirected URL) here:");

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| {
                SlideError::session_state(format!("Failed to read authorization code: {e}"))
            })?;
        Ok(line)
    }
}

/// Credential provider for the OAuth installed-app flow.
pub struct OAuthAuthorizer {
    http: Client,
    auth: AuthConfig,
    secrets: ClientSecretStorage,
    tokens: TokenStorage,
    prompt: Arc<dyn ConsentPrompt>,
}

impl OAuthAuthorizer {
    pub fn new(auth: AuthConfig, secrets: ClientSecretStorage, tokens: TokenStorage) -> Self {
        Self {
            http: Client::new(),
            auth,
            secrets,
            tokens,
            prompt: Arc::new(StdioConsentPrompt),
        }
    }

    /// Uses `credentials.json` and `token.json` from the config directory.
    pub fn from_paths(paths: &SlidewrightPaths, auth: AuthConfig) -> Result<Self> {
        let secrets = ClientSecretStorage::new(paths)
            .map_err(|e| SlideError::session_state(e.to_string()))?;
        let tokens = TokenStorage::new(paths)?;
        Ok(Self::new(auth, secrets, tokens))
    }

    pub fn with_prompt(mut self, prompt: Arc<dyn ConsentPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    fn load_secret(&self) -> Result<ClientSecret> {
        self.secrets
            .load()
            .map_err(|e| SlideError::session_state(e.to_string()))
    }

    fn token_uri<'a>(&'a self, secret: &'a ClientSecret) -> &'a str {
        secret.token_uri.as_deref().unwrap_or(&self.auth.token_uri)
    }

    /// Builds the URL the user visits to grant access.
    pub fn consent_url(&self, secret: &ClientSecret) -> Result<Url> {
        let auth_uri = secret.auth_uri.as_deref().unwrap_or(&self.auth.auth_uri);
        let scope = self.auth.scopes.join(" ");
        Url::parse_with_params(
            auth_uri,
            &[
                ("client_id", secret.client_id.as_str()),
                ("redirect_uri", self.auth.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| SlideError::session_state(format!("Invalid auth URI '{auth_uri}': {e}")))
    }

    async fn refresh(&self, stored: &StoredToken, refresh_token: &str) -> Result<StoredToken> {
        let secret = self.load_secret()?;
        tracing::info!("Refreshing OAuth access token");

        let response = self
            .request_token(
                self.token_uri(&secret),
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                    ("client_id", secret.client_id.as_str()),
                    ("client_secret", secret.client_secret.as_str()),
                ],
            )
            .await?;

        // Refresh replies usually omit the refresh token; keep the old one.
        let mut token = response.into_stored(stored.scopes.clone());
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token.to_string());
        }
        Ok(token)
    }

    async fn run_consent_flow(&self) -> Result<StoredToken> {
        let secret = self.load_secret()?;
        let url = self.consent_url(&secret)?;
        tracing::info!("Requesting user consent for Slides access");

        let pasted = self.prompt.request_code(url.as_str()).await?;
        let code = extract_code(&pasted)?;

        let response = self
            .request_token(
                self.token_uri(&secret),
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code.as_str()),
                    ("client_id", secret.client_id.as_str()),
                    ("client_secret", secret.client_secret.as_str()),
                    ("redirect_uri", self.auth.redirect_uri.as_str()),
                ],
            )
            .await?;

        Ok(response.into_stored(self.auth.scopes.clone()))
    }

    async fn request_token(&self, token_uri: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let response = self
            .http
            .post(token_uri)
            .form(form)
            .send()
            .await
            .map_err(|e| SlideError::session_state(format!("Token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .map(|err| match err.error_description {
                    Some(description) => format!("{}: {description}", err.error),
                    None => err.error,
                })
                .unwrap_or(body);
            return Err(SlideError::session_state(format!(
                "Token endpoint returned HTTP {}: {detail}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SlideError::session_state(format!("Failed to parse token response: {e}")))
    }
}

#[async_trait]
impl CredentialProvider for OAuthAuthorizer {
    async fn authorize(&self) -> Result<ClientHandle> {
        let now = Utc::now();
        let skew = Duration::seconds(EXPIRY_SKEW_SECS);
        let stored = self.tokens.load().map_err(|e| {
            SlideError::session_state(format!("Failed to load stored token: {e}"))
        })?;

        let token = match stored {
            Some(token) if !token.covers_scopes(&self.auth.scopes) => {
                tracing::info!("Stored token lacks required scopes");
                self.run_consent_flow().await?
            }
            Some(token) if !token.is_expired(now, skew) => {
                tracing::debug!("Using stored OAuth token");
                return Ok(ClientHandle::new(token.access_token));
            }
            Some(token) => match token.refresh_token.clone() {
                Some(refresh_token) => self.refresh(&token, &refresh_token).await?,
                None => self.run_consent_flow().await?,
            },
            None => self.run_consent_flow().await?,
        };

        self.tokens
            .save(&token)
            .map_err(|e| SlideError::session_state(format!("Failed to store token: {e}")))?;
        Ok(ClientHandle::new(token.access_token))
    }
}

/// Accepts a bare code or a redirected URL carrying `code=`.
fn extract_code(pasted: &str) -> Result<String> {
    let pasted = pasted.trim();
    if pasted.is_empty() {
        return Err(SlideError::session_state("No authorization code entered"));
    }

    match Url::parse(pasted) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| SlideError::session_state("Redirect URL has no 'code' parameter")),
        Err(_) => Ok(pasted.to_string()),
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn into_stored(self, requested_scopes: Vec<String>) -> StoredToken {
        let scopes = match self.scope {
            Some(scope) => scope.split_whitespace().map(str::to_string).collect(),
            None => requested_scopes,
        };
        StoredToken {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            scopes,
        }
    }
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}
