//! OAuth client secret file storage.
//!
//! Provides loading of the client secret from ~/.config/slidewright/credentials.json,
//! in the format the Google Cloud console downloads.

use crate::paths::SlidewrightPaths;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Errors that can occur while loading the client secret.
#[derive(Debug)]
pub enum ClientSecretStorageError {
    /// Credentials file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Neither an `installed` nor a `web` section is present.
    MissingClient(PathBuf),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for ClientSecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientSecretStorageError::NotFound(path) => {
                write!(f, "OAuth client secret not found at: {}", path.display())
            }
            ClientSecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            ClientSecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            ClientSecretStorageError::MissingClient(path) => write!(
                f,
                "{} has neither an 'installed' nor a 'web' client section",
                path.display()
            ),
            ClientSecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine config directory")
            }
        }
    }
}

impl std::error::Error for ClientSecretStorageError {}

impl From<std::io::Error> for ClientSecretStorageError {
    fn from(e: std::io::Error) -> Self {
        ClientSecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for ClientSecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        ClientSecretStorageError::ParseError(e)
    }
}

/// The OAuth client registration.
#[derive(Clone, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub auth_uri: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

impl std::fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecret")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct ClientSecretFile {
    #[serde(default)]
    installed: Option<ClientSecret>,
    #[serde(default)]
    web: Option<ClientSecret>,
}

/// Storage for the OAuth client secret (credentials.json).
///
/// Read-only; the file is provisioned by the user.
pub struct ClientSecretStorage {
    path: PathBuf,
}

impl ClientSecretStorage {
    pub fn new(paths: &SlidewrightPaths) -> Result<Self, ClientSecretStorageError> {
        let path = paths
            .client_secret_file()
            .map_err(|_| ClientSecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a ClientSecretStorage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the client secret, preferring the `installed` section.
    pub fn load(&self) -> Result<ClientSecret, ClientSecretStorageError> {
        if !self.path.exists() {
            return Err(ClientSecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let file: ClientSecretFile = serde_json::from_str(&content)?;

        file.installed
            .or(file.web)
            .ok_or_else(|| ClientSecretStorageError::MissingClient(self.path.clone()))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
