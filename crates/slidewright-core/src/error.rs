//! Error types for Slidewright.

use thiserror::Error;

/// A shared error type for the whole slide composition stack.
///
/// The first five variants form the domain taxonomy surfaced to the calling
/// agent; the remaining ones cover local file handling and the orchestrator's
/// wrapped failure.
#[derive(Error, Debug, Clone)]
pub enum SlideError {
    /// Malformed or missing caller input. Raised before any remote call.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required session value (document id, client handle) is absent,
    /// or the credential flow could not produce one.
    #[error("Session state error: {0}")]
    SessionState(String),

    /// Lookup by name or key found nothing.
    #[error("Not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The remote document does not have the shape composition relies on.
    #[error("Document structure error: {0}")]
    Structure(String),

    /// The document service or its transport failed.
    #[error("Remote service error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    RemoteService {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Building a whole presentation failed part way.
    #[error("Failed to build presentation for '{company}': {source}")]
    Presentation {
        company: String,
        #[source]
        source: Box<SlideError>,
    },
}

impl SlideError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn session_state(message: impl Into<String>) -> Self {
        Self::SessionState(message.into())
    }

    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn structure(message: impl Into<String>) -> Self {
        Self::Structure(message.into())
    }

    /// Creates a RemoteService error without an HTTP status (transport level).
    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteService {
            status: None,
            message: message.into(),
            retryable: false,
        }
    }

    /// Creates a RemoteService error from an HTTP status.
    pub fn remote_status(status: u16, message: impl Into<String>, retryable: bool) -> Self {
        Self::RemoteService {
            status: Some(status),
            message: message.into(),
            retryable,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Wraps any error raised while building the deck for `company`.
    pub fn presentation(company: impl Into<String>, source: SlideError) -> Self {
        Self::Presentation {
            company: company.into(),
            source: Box::new(source),
        }
    }

    /// Re-labels a non-domain failure as a remote service failure, keeping
    /// the typed domain variants intact.
    pub fn into_remote(self, context: &str) -> Self {
        match self {
            Self::RemoteService { .. }
            | Self::NotFound { .. }
            | Self::Structure(_)
            | Self::Validation(_)
            | Self::SessionState(_) => self,
            other => Self::remote(format!("{context}: {other}")),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_session_state(&self) -> bool {
        matches!(self, Self::SessionState(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_structure(&self) -> bool {
        matches!(self, Self::Structure(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteService { .. })
    }

    /// Whether repeating the same call might succeed (rate limits, 5xx).
    ///
    /// Nothing in the crate retries on its own; this is surfaced so callers
    /// can decide.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RemoteService { retryable, .. } => *retryable,
            Self::Presentation { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Returns the innermost error, unwrapping `Presentation`.
    pub fn root_cause(&self) -> &SlideError {
        match self {
            Self::Presentation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for SlideError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for SlideError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SlideError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for SlideError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, SlideError>`.
pub type Result<T> = std::result::Result<T, SlideError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_display_includes_status() {
        let err = SlideError::remote_status(429, "quota exceeded", true);
        assert_eq!(
            err.to_string(),
            "Remote service error (HTTP 429): quota exceeded"
        );
        assert!(err.is_retryable());

        let err = SlideError::remote("connection reset");
        assert_eq!(err.to_string(), "Remote service error: connection reset");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_into_remote_keeps_domain_variants() {
        let structure = SlideError::structure("no slides").into_remote("bootstrap");
        assert!(structure.is_structure());

        let io = SlideError::io("disk full").into_remote("bootstrap");
        assert!(io.is_remote());
        assert!(io.to_string().contains("bootstrap: IO error: disk full"));
    }

    #[test]
    fn test_presentation_wraps_root_cause() {
        let inner = SlideError::remote_status(503, "backend unavailable", true);
        let err = SlideError::presentation("Acme", inner);

        assert!(err.to_string().starts_with("Failed to build presentation for 'Acme'"));
        assert!(err.root_cause().is_remote());
        assert!(err.is_retryable());
    }
}
