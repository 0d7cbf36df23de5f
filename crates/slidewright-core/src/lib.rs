//! Domain layer for Slidewright.
//!
//! Holds the presentation model, the mutation wire types, the collaborator
//! traits (document service, credentials, row source), the session context
//! threaded through composition calls, and the shared error type.

pub mod config;
pub mod credential;
pub mod error;
pub mod presentation;
pub mod rows;
pub mod session;

// Re-export common error type
pub use error::{Result, SlideError};
pub use session::SessionContext;
