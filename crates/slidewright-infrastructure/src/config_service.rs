//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/slidewright/config.toml).

use crate::paths::SlidewrightPaths;
use crate::storage::AtomicTomlFile;
use slidewright_core::config::RootConfig;
use slidewright_core::{Result, SlideError};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// A missing file is created with defaults on first load.
#[derive(Clone)]
pub struct ConfigService {
    file: Arc<AtomicTomlFile<RootConfig>>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService for the default config file location.
    pub fn new(paths: &SlidewrightPaths) -> Result<Self> {
        let path = paths
            .config_file()
            .map_err(|e| SlideError::config(e.to_string()))?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> Result<RootConfig> {
        {
            let read_lock = self
                .config
                .read()
                .map_err(|_| SlideError::config("config cache lock poisoned"))?;
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_or_create()?;

        let mut write_lock = self
            .config
            .write()
            .map_err(|_| SlideError::config("config cache lock poisoned"))?;
        *write_lock = Some(loaded.clone());

        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        if let Ok(mut write_lock) = self.config.write() {
            *write_lock = None;
        }
    }

    fn load_or_create(&self) -> Result<RootConfig> {
        match self.file.load()? {
            Some(config) => {
                tracing::debug!(path = %self.file.path().display(), "Loaded configuration");
                Ok(config)
            }
            None => {
                let config = RootConfig::default();
                self.file.save(&config)?;
                tracing::info!(path = %self.file.path().display(), "Created default configuration");
                Ok(config)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_created_with_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let service = ConfigService::with_path(path.clone());

        let config = service.get_config().unwrap();
        assert_eq!(config, RootConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_cache_until_invalidated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[composer]\ntitle_font_family = \"Roboto\"\n").unwrap();

        let service = ConfigService::with_path(path.clone());
        assert_eq!(service.get_config().unwrap().composer.title_font_family, "Roboto");

        fs::write(&path, "[composer]\ntitle_font_family = \"Lato\"\n").unwrap();
        assert_eq!(service.get_config().unwrap().composer.title_font_family, "Roboto");

        service.invalidate_cache();
        assert_eq!(service.get_config().unwrap().composer.title_font_family, "Lato");
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[composer\n").unwrap();

        let err = ConfigService::with_path(path).get_config().unwrap_err();
        assert!(matches!(err, SlideError::Serialization { .. }));
    }
}
