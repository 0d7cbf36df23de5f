//! Persisted OAuth token (`token.json`).

use super::atomic_file::AtomicJsonFile;
use crate::paths::SlidewrightPaths;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use slidewright_core::{Result, SlideError};
use std::path::PathBuf;

/// An OAuth token as stored on disk.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl StoredToken {
    /// Whether the access token is expired, or expires within `skew`.
    ///
    /// Tokens without an expiry are treated as valid.
    pub fn is_expired(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - skew <= now,
            None => false,
        }
    }

    /// Whether this token was granted every scope in `required`.
    pub fn covers_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }
}

impl std::fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredToken")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Reads and writes the token file.
///
/// Writes are atomic and the file is kept at permissions 600 on Unix.
pub struct TokenStorage {
    file: AtomicJsonFile<StoredToken>,
}

impl TokenStorage {
    /// Creates a TokenStorage at the default location.
    pub fn new(paths: &SlidewrightPaths) -> Result<Self> {
        let path = paths
            .token_file()
            .map_err(|e| SlideError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicJsonFile::new(path).private(),
        }
    }

    /// Loads the token, `None` when no token has been stored yet.
    pub fn load(&self) -> Result<Option<StoredToken>> {
        Ok(self.file.load()?)
    }

    pub fn save(&self, token: &StoredToken) -> Result<()> {
        self.file.save(token)?;
        tracing::debug!(path = %self.file.path().display(), "Stored OAuth token");
        Ok(())
    }

    /// Removes the stored token, if any.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(self.file.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn token(expires_in: Option<i64>) -> StoredToken {
        StoredToken {
            access_token: "ya29.access".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expires_at: expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
            scopes: vec!["scope-a".to_string()],
        }
    }

    #[test]
    fn test_expiry_with_skew() {
        let now = Utc::now();
        assert!(!token(Some(3600)).is_expired(now, Duration::seconds(60)));
        assert!(token(Some(30)).is_expired(now, Duration::seconds(60)));
        assert!(token(Some(-10)).is_expired(now, Duration::zero()));
        assert!(!token(None).is_expired(now, Duration::seconds(60)));
    }

    #[test]
    fn test_scope_coverage() {
        let t = token(None);
        assert!(t.covers_scopes(&["scope-a".to_string()]));
        assert!(!t.covers_scopes(&["scope-a".to_string(), "scope-b".to_string()]));
    }

    #[test]
    fn test_save_load_clear() {
        let temp_dir = TempDir::new().unwrap();
        let storage = TokenStorage::with_path(temp_dir.path().join("token.json"));
        assert!(storage.load().unwrap().is_none());

        let stored = token(Some(3600));
        storage.save(&stored).unwrap();
        assert_eq!(storage.load().unwrap(), Some(stored));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        storage.clear().unwrap();
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", token(None));
        assert!(!debug.contains("ya29.access"));
        assert!(!debug.contains("1//refresh"));
    }
}
