//! Atomic file operations for small TOML and JSON documents.
//!
//! Writes go to a temp file in the same directory, are fsynced, then renamed
//! over the target while an exclusive lock file is held.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// Errors that can occur during atomic file operations.
#[derive(Debug)]
pub enum AtomicFileError {
    /// File I/O error.
    IoError(std::io::Error),
    /// Parse or serialization error, tagged with the format name.
    FormatError { format: &'static str, message: String },
    /// File locking error.
    LockError(String),
}

impl std::fmt::Display for AtomicFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicFileError::IoError(e) => write!(f, "I/O error: {}", e),
            AtomicFileError::FormatError { format, message } => {
                write!(f, "{} error: {}", format, message)
            }
            AtomicFileError::LockError(e) => write!(f, "Lock error: {}", e),
        }
    }
}

impl std::error::Error for AtomicFileError {}

impl From<std::io::Error> for AtomicFileError {
    fn from(e: std::io::Error) -> Self {
        AtomicFileError::IoError(e)
    }
}

impl From<AtomicFileError> for slidewright_core::SlideError {
    fn from(e: AtomicFileError) -> Self {
        match e {
            AtomicFileError::IoError(io) => io.into(),
            AtomicFileError::FormatError { format, message } => Self::Serialization {
                format: format.to_string(),
                message,
            },
            AtomicFileError::LockError(message) => Self::io(message),
        }
    }
}

/// Serialization format of an atomic file.
pub trait FileFormat {
    const NAME: &'static str;

    fn parse<T: DeserializeOwned>(content: &str) -> Result<T, AtomicFileError>;

    fn render<T: Serialize>(data: &T) -> Result<String, AtomicFileError>;
}

pub struct Toml;

impl FileFormat for Toml {
    const NAME: &'static str = "TOML";

    fn parse<T: DeserializeOwned>(content: &str) -> Result<T, AtomicFileError> {
        toml::from_str(content).map_err(|e| format_error::<Self>(e))
    }

    fn render<T: Serialize>(data: &T) -> Result<String, AtomicFileError> {
        toml::to_string_pretty(data).map_err(|e| format_error::<Self>(e))
    }
}

pub struct Json;

impl FileFormat for Json {
    const NAME: &'static str = "JSON";

    fn parse<T: DeserializeOwned>(content: &str) -> Result<T, AtomicFileError> {
        serde_json::from_str(content).map_err(|e| format_error::<Self>(e))
    }

    fn render<T: Serialize>(data: &T) -> Result<String, AtomicFileError> {
        serde_json::to_string_pretty(data).map_err(|e| format_error::<Self>(e))
    }
}

fn format_error<F: FileFormat>(e: impl std::fmt::Display) -> AtomicFileError {
    AtomicFileError::FormatError {
        format: F::NAME,
        message: e.to_string(),
    }
}

/// A handle to a file that is replaced atomically on every save.
pub struct AtomicFile<T, F> {
    path: PathBuf,
    private: bool,
    _phantom: PhantomData<(T, F)>,
}

pub type AtomicTomlFile<T> = AtomicFile<T, Toml>;
pub type AtomicJsonFile<T> = AtomicFile<T, Json>;

impl<T, F> AtomicFile<T, F>
where
    T: Serialize + DeserializeOwned,
    F: FileFormat,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            private: false,
            _phantom: PhantomData,
        }
    }

    /// Saved files get permissions 600 on Unix.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicFileError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        F::parse(&content).map(Some)
    }

    /// Saves data atomically while holding the lock.
    pub fn save(&self, data: &T) -> Result<(), AtomicFileError> {
        let _lock = FileLock::acquire(&self.path)?;
        self.write_unlocked(data)
    }

    /// Loads the current value (or `default_value`), applies `f`, and writes
    /// the result back, all under one lock.
    pub fn update<U>(&self, default_value: T, f: U) -> Result<T, AtomicFileError>
    where
        U: FnOnce(&mut T),
    {
        let _lock = FileLock::acquire(&self.path)?;
        let mut data = self.load()?.unwrap_or(default_value);
        f(&mut data);
        self.write_unlocked(&data)?;
        Ok(data)
    }

    fn write_unlocked(&self, data: &T) -> Result<(), AtomicFileError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let rendered = F::render(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(rendered.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if self.private {
                fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
            }
        }

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf, AtomicFileError> {
        let parent = self.path.parent().ok_or_else(|| {
            AtomicFileError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no parent directory",
            ))
        })?;

        let file_name = self.path.file_name().ok_or_else(|| {
            AtomicFileError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Path has no file name",
            ))
        })?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// A file lock guard that releases the lock when dropped.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicFileError> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive()
                .map_err(|e| AtomicFileError::LockError(format!("Failed to acquire lock: {}", e)))?;
        }

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Best effort; the OS lock goes away with the handle.
        let _ = fs::remove_file(&self.lock_path);
    }
}
