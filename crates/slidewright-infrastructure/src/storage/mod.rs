//! Storage layer for atomic file operations and OAuth secrets.

mod atomic_file;
mod client_secret_storage;
mod token_storage;

pub use atomic_file::{
    AtomicFile, AtomicFileError, AtomicJsonFile, AtomicTomlFile, FileFormat, Json, Toml,
};
pub use client_secret_storage::{ClientSecret, ClientSecretStorage, ClientSecretStorageError};
pub use token_storage::{StoredToken, TokenStorage};
