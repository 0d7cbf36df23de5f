//! Document bootstrapper.
//!
//! Creates a new presentation, makes it the session's active document, and
//! fills its title slide with the title and creation date.

use chrono::{Local, NaiveDate};
use slidewright_core::presentation::{DocumentService, MutationBatch, PlaceholderRoles};
use slidewright_core::{Result, SessionContext, SlideError};
use std::sync::Arc;

pub struct DocumentBootstrapper {
    service: Arc<dyn DocumentService>,
}

impl DocumentBootstrapper {
    pub fn new(service: Arc<dyn DocumentService>) -> Self {
        Self { service }
    }

    /// Creates a presentation titled `title`, dated today (local time).
    ///
    /// On success the new id is also the active document id of `ctx`.
    pub async fn create_document(&self, ctx: &mut SessionContext, title: &str) -> Result<String> {
        self.create_document_on(ctx, title, Local::now().date_naive()).await
    }

    /// Same as [`Self::create_document`] with an explicit creation date.
    pub async fn create_document_on(
        &self,
        ctx: &mut SessionContext,
        title: &str,
        created_on: NaiveDate,
    ) -> Result<String> {
        if title.trim().is_empty() {
            return Err(SlideError::validation("document title must not be empty"));
        }
        let client = ctx.require_client_handle()?.clone();

        let created = self
            .service
            .create_document(&client, title)
            .await
            .map_err(|e| e.into_remote("create document"))?;
        if created.id.is_empty() {
            return Err(SlideError::remote(
                "create document: service returned an empty document id",
            ));
        }
        let document_id = created.id;
        ctx.set_document_id(document_id.clone());
        tracing::info!(document_id = %document_id, title, "Created presentation");

        let document = self
            .service
            .get_document(&client, &document_id)
            .await
            .map_err(|e| e.into_remote("read new document"))?;
        let title_slide = document
            .slides
            .first()
            .ok_or_else(|| SlideError::not_found("slide", format!("{document_id}/0")))?;
        let roles = PlaceholderRoles::positional(title_slide)?;

        let subtitle = format!("Created: {}", created_on.format("%Y-%m-%d"));
        let batch = MutationBatch::new()
            .insert_text(&roles.title_id, title)
            .insert_text(&roles.body_id, subtitle);
        self.service
            .batch_update(&client, &document_id, &batch)
            .await
            .map_err(|e| e.into_remote("populate title slide"))?;

        tracing::debug!(
            document_id = %document_id,
            slide_id = %roles.slide_id,
            "Populated title slide"
        );
        Ok(document_id)
    }
}
