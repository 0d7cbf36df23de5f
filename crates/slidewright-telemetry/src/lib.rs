//! Logging for Slidewright: subscriber setup and the progress event layer.

pub mod event_layer;
pub mod logging;

pub use event_layer::{ProgressEvent, ProgressEventLayer};
pub use logging::{LoggingGuard, init_tracing};
