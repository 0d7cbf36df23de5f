//! Document service trait.

use super::model::Document;
use super::request::{BatchUpdateResponse, MutationBatch};
use crate::credential::ClientHandle;
use crate::error::Result;
use async_trait::async_trait;

/// The remote presentation-editing service.
///
/// Every call is authorized with the caller's client handle. Implementations
/// report transport and service failures as
/// [`crate::SlideError::RemoteService`].
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Creates a new document with the given title.
    ///
    /// The returned document carries the service-assigned id and its default
    /// first slide.
    async fn create_document(&self, client: &ClientHandle, title: &str) -> Result<Document>;

    /// Reads the full document, slides and page elements in order.
    async fn get_document(&self, client: &ClientHandle, document_id: &str) -> Result<Document>;

    /// Applies `batch` in order. The service commits all operations or none.
    async fn batch_update(
        &self,
        client: &ClientHandle,
        document_id: &str,
        batch: &MutationBatch,
    ) -> Result<BatchUpdateResponse>;
}
