//! Application layer for Slidewright.
//!
//! This crate provides the use cases that drive a document service to build
//! slide decks: document bootstrapping, per-slide composition, whole-deck
//! orchestration, and the tool surface exposed to an LLM agent.

pub mod document_bootstrapper;
pub mod presentation_orchestrator;
pub mod slide_composer;
pub mod tools;

pub use document_bootstrapper::DocumentBootstrapper;
pub use presentation_orchestrator::{PresentationOrchestrator, template_slides};
pub use slide_composer::SlideComposer;
pub use tools::{PresentationTools, ToolDefinition};
