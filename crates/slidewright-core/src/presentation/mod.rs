//! Presentation documents, mutation requests, and the document service.

pub mod composition;
pub mod memory;
pub mod model;
pub mod request;
pub mod service;

pub use composition::{
    CompositionState, PlaceholderRoles, SlideComposition, SlideContentRequest, SlideStyle,
};
pub use memory::{InMemoryDocumentService, ServiceCall};
pub use model::{Document, PageElement, Paragraph, Placeholder, Slide};
pub use request::{
    BatchUpdateResponse, Dimension, LayoutPlaceholder, MutationBatch, MutationRequest,
    PlaceholderIdMapping, PlaceholderType, TextStyle,
};
pub use service::DocumentService;
