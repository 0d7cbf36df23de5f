//! Unified path management for slidewright configuration files.
//!
//! All configuration, OAuth secrets, and logs live under one config directory.

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for slidewright.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/slidewright/       # Config directory (or the base path given)
/// ├── config.toml              # Application configuration
/// ├── credentials.json         # OAuth client secret (downloaded from the console)
/// ├── token.json               # Persisted OAuth token
/// └── logs/                    # Application logs
///     └── slidewright.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone)]
pub struct SlidewrightPaths {
    base: Option<PathBuf>,
}

impl SlidewrightPaths {
    /// Creates a path resolver. With `Some(base)`, every path is resolved
    /// under `base` instead of the platform config directory.
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the slidewright configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/slidewright/`)
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join("slidewright"))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the OAuth client secret.
    pub fn client_secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("credentials.json"))
    }

    /// Returns the path to the persisted OAuth token.
    ///
    /// # Security Note
    ///
    /// The token file is written with permissions 600 on Unix.
    pub fn token_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("token.json"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}

impl Default for SlidewrightPaths {
    fn default() -> Self {
        Self::new(None)
    }
}
