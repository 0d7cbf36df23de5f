//! Slide composer.
//!
//! Appends one slide to a presentation in three phases: create the slide
//! shell, re-read the document to find its placeholders, then write and
//! style the content. The slide's element ids do not exist until the first
//! batch has committed, so the phases cannot be merged into one batch.

use slidewright_core::config::ComposerConfig;
use slidewright_core::credential::ClientHandle;
use slidewright_core::presentation::{
    Dimension, DocumentService, LayoutPlaceholder, MutationBatch, PlaceholderIdMapping,
    PlaceholderRoles, PlaceholderType, SlideComposition, SlideContentRequest, SlideStyle,
    TextStyle,
};
use slidewright_core::{Result, SessionContext, SlideError};
use std::sync::Arc;
use uuid::Uuid;

/// Object ids the composer picks for a new slide before creating it.
#[derive(Debug, Clone, PartialEq, Eq)]
struct AssignedIds {
    slide: String,
    title: String,
    body: String,
}

impl AssignedIds {
    fn generate() -> Self {
        let key = Uuid::new_v4().simple().to_string();
        Self {
            slide: format!("slide_{key}"),
            title: format!("title_{key}"),
            body: format!("body_{key}"),
        }
    }

    fn mappings(&self) -> Vec<PlaceholderIdMapping> {
        vec![
            PlaceholderIdMapping {
                layout_placeholder: LayoutPlaceholder {
                    kind: PlaceholderType::Title,
                    index: 0,
                },
                object_id: self.title.clone(),
            },
            PlaceholderIdMapping {
                layout_placeholder: LayoutPlaceholder {
                    kind: PlaceholderType::Body,
                    index: 0,
                },
                object_id: self.body.clone(),
            },
        ]
    }
}

pub struct SlideComposer {
    service: Arc<dyn DocumentService>,
    config: ComposerConfig,
}

impl SlideComposer {
    pub fn new(service: Arc<dyn DocumentService>, config: ComposerConfig) -> Self {
        Self { service, config }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Adds a slide from untyped input.
    ///
    /// `style` is parsed (case-insensitively) and the input validated before
    /// anything is sent to the service.
    pub async fn add_slide(
        &self,
        ctx: &SessionContext,
        document_id: &str,
        title: &str,
        body: &str,
        style: &str,
    ) -> Result<SlideComposition> {
        let request = SlideContentRequest::parse(title, body, style)?;
        self.compose(ctx, document_id, &request).await
    }

    /// Appends a slide holding `request` to the end of `document_id`.
    ///
    /// Not idempotent: every call creates a new slide. When a later phase
    /// fails the created slide is left in place, unpopulated.
    pub async fn compose(
        &self,
        ctx: &SessionContext,
        document_id: &str,
        request: &SlideContentRequest,
    ) -> Result<SlideComposition> {
        request.validate()?;
        if document_id.trim().is_empty() {
            return Err(SlideError::validation("document id must not be empty"));
        }
        let client = ctx.require_client_handle()?;

        // Phase 1: structure
        let ids = AssignedIds::generate();
        let batch = MutationBatch::new().create_slide(
            Some(ids.slide.clone()),
            self.config.layout.as_str(),
            ids.mappings(),
        );
        let reply = self
            .service
            .batch_update(client, document_id, &batch)
            .await
            .map_err(|e| e.into_remote("create slide"))?;
        let echoed = reply.created_slide_id().map(str::to_string);

        let slide_id = echoed.clone().unwrap_or_else(|| ids.slide.clone());
        let composition = SlideComposition::created(document_id, slide_id);
        tracing::info!(
            document_id,
            slide_id = %composition.slide_id,
            state = %composition.state,
            "Slide created"
        );

        match self
            .discover_and_populate(client, document_id, request, echoed.as_deref(), &ids)
            .await
        {
            Ok(roles) => {
                let composition = composition.populated(&roles);
                tracing::info!(
                    document_id,
                    slide_id = %composition.slide_id,
                    state = %composition.state,
                    style = %request.style,
                    "Slide populated"
                );
                Ok(composition)
            }
            Err(err) => {
                tracing::error!(
                    document_id,
                    slide_id = %composition.slide_id,
                    state = %composition.state,
                    error = %err,
                    "Slide left unpopulated"
                );
                Err(err)
            }
        }
    }

    async fn discover_and_populate(
        &self,
        client: &ClientHandle,
        document_id: &str,
        request: &SlideContentRequest,
        echoed: Option<&str>,
        ids: &AssignedIds,
    ) -> Result<PlaceholderRoles> {
        // Phase 2: discovery
        let document = self
            .service
            .get_document(client, document_id)
            .await
            .map_err(|e| e.into_remote("read document"))?;

        let wanted = echoed.unwrap_or(&ids.slide);
        let slide = match (document.find_slide(wanted), echoed) {
            (Some(slide), _) => slide,
            (None, Some(id)) => {
                return Err(SlideError::structure(format!(
                    "created slide '{id}' is missing from document '{document_id}'"
                )));
            }
            (None, None) => {
                tracing::warn!(
                    document_id,
                    "Service did not report the created slide id, assuming the last slide"
                );
                document.last_slide().ok_or_else(|| {
                    SlideError::structure(format!("document '{document_id}' has no slides"))
                })?
            }
        };
        let assigned = Some((ids.title.as_str(), ids.body.as_str()));
        let roles = PlaceholderRoles::resolve(slide, assigned)?;
        if roles.title_id != ids.title {
            tracing::warn!(
                slide_id = %roles.slide_id,
                "Assigned placeholder ids not found, using element positions"
            );
        }

        // Phase 3: populate and style
        let batch = self.content_batch(&roles, request);
        tracing::debug!(
            document_id,
            requests = batch.len(),
            kinds = %batch.summary(),
            "Populating slide"
        );
        self.service
            .batch_update(client, document_id, &batch)
            .await
            .map_err(|e| e.into_remote("populate slide"))?;

        Ok(roles)
    }

    fn content_batch(
        &self,
        roles: &PlaceholderRoles,
        request: &SlideContentRequest,
    ) -> MutationBatch {
        let title_style = TextStyle {
            bold: Some(true),
            font_family: Some(self.config.title_font_family.clone()),
            font_size: Some(Dimension::pt(self.config.title_font_size_pt)),
        };

        let batch = MutationBatch::new()
            .insert_text(&roles.title_id, &request.title)
            .update_text_style(&roles.title_id, title_style);

        // The service rejects empty insertions; an empty body stays blank.
        if request.body.is_empty() {
            return batch;
        }

        let batch = batch.insert_text(&roles.body_id, &request.body);
        match request.style {
            SlideStyle::Bullet => {
                batch.create_bullets(&roles.body_id, self.config.bullet_preset.as_str())
            }
            SlideStyle::Paragraph => batch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidewright_core::presentation::{InMemoryDocumentService, MutationRequest, ServiceCall};

    async fn setup(
        service: InMemoryDocumentService,
    ) -> (Arc<InMemoryDocumentService>, SessionContext, String) {
        let service = Arc::new(service);
        let client = ClientHandle::new("token");
        let document = service.create_document(&client, "Deck").await.unwrap();
        (service, SessionContext::with_client(client), document.id)
    }

    fn composer(service: &Arc<InMemoryDocumentService>) -> SlideComposer {
        SlideComposer::new(service.clone(), ComposerConfig::default())
    }

    fn batches(calls: &[ServiceCall]) -> Vec<&MutationBatch> {
        calls
            .iter()
            .filter_map(|call| match call {
                ServiceCall::BatchUpdate { batch, .. } => Some(batch),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_assigned_ids_are_valid_object_ids() {
        let ids = AssignedIds::generate();
        for id in [&ids.slide, &ids.title, &ids.body] {
            assert!((5..=50).contains(&id.len()), "{id}");
            assert!(id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        }
        assert_ne!(ids, AssignedIds::generate());
    }

    #[tokio::test]
    async fn test_bullet_slide_uses_three_phases() {
        let (service, ctx, doc) = setup(InMemoryDocumentService::new()).await;

        let composition = composer(&service)
            .add_slide(&ctx, &doc, "Overview", "a\nb", "bullet")
            .await
            .unwrap();
        assert!(composition.is_populated());

        let calls = service.calls().await;
        let kinds: Vec<&str> = calls
            .iter()
            .skip(1)
            .map(|call| match call {
                ServiceCall::CreateDocument { .. } => "create",
                ServiceCall::GetDocument { .. } => "get",
                ServiceCall::BatchUpdate { .. } => "batch",
            })
            .collect();
        assert_eq!(kinds, vec!["batch", "get", "batch"]);

        let batches = batches(&calls);
        assert_eq!(batches[0].len(), 1);
        assert_eq!(
            batches[1].summary(),
            "insertText,updateTextStyle,insertText,createParagraphBullets"
        );
    }

    #[tokio::test]
    async fn test_paragraph_slide_has_no_bullet_operation() {
        let (service, ctx, doc) = setup(InMemoryDocumentService::new()).await;

        composer(&service)
            .add_slide(&ctx, &doc, "Summary", "one\ntwo", "Paragraph")
            .await
            .unwrap();

        let calls = service.calls().await;
        let populate = batches(&calls)[1];
        assert_eq!(populate.summary(), "insertText,updateTextStyle,insertText");

        let document = service.document(&doc).await.unwrap();
        let body = &document.slides[1].page_elements[1];
        assert!(body.bullet_items().is_empty());
        assert_eq!(body.text(), "one\ntwo");
    }

    #[tokio::test]
    async fn test_title_is_styled_from_config() {
        let (service, ctx, doc) = setup(InMemoryDocumentService::new()).await;
        let config = ComposerConfig {
            title_font_family: "Roboto".into(),
            title_font_size_pt: 30.0,
            ..ComposerConfig::default()
        };

        SlideComposer::new(service.clone(), config)
            .add_slide(&ctx, &doc, "Styled", "", "Paragraph")
            .await
            .unwrap();

        let calls = service.calls().await;
        let populate = batches(&calls)[1];
        match &populate.requests()[1] {
            MutationRequest::UpdateTextStyle(update) => {
                assert_eq!(update.style.bold, Some(true));
                assert_eq!(update.style.font_family.as_deref(), Some("Roboto"));
                assert_eq!(update.style.font_size, Some(Dimension::pt(30.0)));
                assert_eq!(update.fields, "bold,fontFamily,fontSize");
            }
            other => panic!("unexpected request: {other:?}"),
        }
        // Empty body: nothing is inserted into the body placeholder.
        assert_eq!(populate.len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_calls() {
        let (service, ctx, doc) = setup(InMemoryDocumentService::new()).await;
        let composer = composer(&service);
        let before = service.calls().await.len();

        let err = composer
            .add_slide(&ctx, &doc, "Title", "body", "Numbered")
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = composer.add_slide(&ctx, &doc, "", "body", "Bullet").await.unwrap_err();
        assert!(err.is_validation());

        let err = composer.add_slide(&ctx, " ", "Title", "body", "Bullet").await.unwrap_err();
        assert!(err.is_validation());

        let err = composer
            .add_slide(&SessionContext::new(), &doc, "Title", "body", "Bullet")
            .await
            .unwrap_err();
        assert!(err.is_session_state());

        assert_eq!(service.calls().await.len(), before);
    }

    #[tokio::test]
    async fn test_falls_back_to_positions_when_mappings_ignored() {
        let (service, ctx, doc) =
            setup(InMemoryDocumentService::new().ignoring_placeholder_mappings()).await;

        let composition = composer(&service)
            .add_slide(&ctx, &doc, "Positional", "x", "Paragraph")
            .await
            .unwrap();

        let document = service.document(&doc).await.unwrap();
        let slide = document.find_slide(&composition.slide_id).unwrap();
        assert_eq!(
            composition.title_id.as_deref(),
            Some(slide.page_elements[0].object_id.as_str())
        );
        assert_eq!(slide.page_elements[0].text(), "Positional");
    }

    #[tokio::test]
    async fn test_single_placeholder_layout_is_structure_error() {
        let (service, ctx, doc) = setup(
            InMemoryDocumentService::new()
                .with_layout_elements(1)
                .ignoring_placeholder_mappings(),
        )
        .await;

        let err = composer(&service)
            .add_slide(&ctx, &doc, "Title", "body", "Paragraph")
            .await
            .unwrap_err();

        assert!(err.is_structure());
        // Only the structural batch was sent.
        assert_eq!(batches(&service.calls().await).len(), 1);
    }

    #[tokio::test]
    async fn test_failed_population_leaves_created_slide() {
        // Batch 0 is the createSlide of this composition; batch 1 populates it.
        let (service, ctx, doc) = setup(InMemoryDocumentService::new().failing_batch_at(1)).await;

        let err = composer(&service)
            .add_slide(&ctx, &doc, "Title", "body", "Paragraph")
            .await
            .unwrap_err();
        assert!(err.is_retryable());

        let document = service.document(&doc).await.unwrap();
        assert_eq!(document.slides.len(), 2);
        assert!(document.slides[1].page_elements.iter().all(|e| e.text().is_empty()));
    }

    #[tokio::test]
    async fn test_echoed_slide_missing_from_document_is_structure_error() {
        let (service, ctx, doc) =
            setup(InMemoryDocumentService::new().echoing_unknown_slide_id()).await;

        let err = composer(&service)
            .add_slide(&ctx, &doc, "Title", "body", "Paragraph")
            .await
            .unwrap_err();

        assert!(err.is_structure(), "{err}");
        assert!(err.to_string().contains("missing from document"));
        assert_eq!(batches(&service.calls().await).len(), 1);
    }
}
