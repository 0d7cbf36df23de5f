//! Session context for slide composition.
//!
//! A `SessionContext` carries the active document id and the authorized
//! client handle through a chain of composition calls. It is an ordinary value:
//! every bootstrapper, composer, and orchestrator call takes it explicitly, so
//! independent presentations can be composed with independent contexts.

use crate::credential::ClientHandle;
use crate::error::{Result, SlideError};

/// The active document and authorized client for one logical session.
///
/// Setters never reject input; the last write wins. Dependents that need a
/// value use the `require_*` accessors, which report a missing value as
/// [`SlideError::SessionState`].
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    document_id: Option<String>,
    client_handle: Option<ClientHandle>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context that already holds an authorized client.
    pub fn with_client(client_handle: ClientHandle) -> Self {
        Self {
            document_id: None,
            client_handle: Some(client_handle),
        }
    }

    pub fn set_document_id(&mut self, document_id: impl Into<String>) {
        self.document_id = Some(document_id.into());
    }

    pub fn set_client_handle(&mut self, client_handle: ClientHandle) {
        self.client_handle = Some(client_handle);
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn client_handle(&self) -> Option<&ClientHandle> {
        self.client_handle.as_ref()
    }

    /// Returns the active document id, or a session state error if none is set.
    pub fn require_document_id(&self) -> Result<&str> {
        match self.document_id.as_deref() {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(SlideError::session_state("no active document id in session")),
        }
    }

    /// Returns the authorized client handle, or a session state error if none is set.
    pub fn require_client_handle(&self) -> Result<&ClientHandle> {
        self.client_handle
            .as_ref()
            .ok_or_else(|| SlideError::session_state("no authorized client handle in session"))
    }

    /// Forgets both the document id and the client handle.
    pub fn clear(&mut self) {
        self.document_id = None;
        self.client_handle = None;
    }
}
