//! Presentation orchestrator.
//!
//! Builds a complete company deck: authorize, create the document, then add
//! the template slides one at a time.

use crate::document_bootstrapper::DocumentBootstrapper;
use crate::slide_composer::SlideComposer;
use slidewright_core::config::ComposerConfig;
use slidewright_core::credential::CredentialProvider;
use slidewright_core::presentation::{DocumentService, SlideContentRequest, SlideStyle};
use slidewright_core::{Result, SessionContext, SlideError};
use std::sync::Arc;

/// Slides every generated deck gets after its title slide.
pub fn template_slides(company: &str) -> Vec<SlideContentRequest> {
    vec![
        SlideContentRequest::new(
            format!("{company} Overview"),
            format!(
                "{company} at a glance: who the company serves, what it offers, \
                 and where it is heading next."
            ),
            SlideStyle::Paragraph,
        ),
        SlideContentRequest::new(
            "Key Highlights",
            "Market position and core products\nRecent performance and growth\nStrategic priorities for the year ahead",
            SlideStyle::Bullet,
        ),
    ]
}

pub struct PresentationOrchestrator {
    credentials: Arc<dyn CredentialProvider>,
    bootstrapper: DocumentBootstrapper,
    composer: Arc<SlideComposer>,
}

impl PresentationOrchestrator {
    pub fn new(
        service: Arc<dyn DocumentService>,
        credentials: Arc<dyn CredentialProvider>,
        composer_config: ComposerConfig,
    ) -> Self {
        Self {
            credentials,
            bootstrapper: DocumentBootstrapper::new(service.clone()),
            composer: Arc::new(SlideComposer::new(service, composer_config)),
        }
    }

    pub fn composer(&self) -> &Arc<SlideComposer> {
        &self.composer
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    /// Builds the deck for `company` and returns its document id.
    ///
    /// Any failure is reported as a single [`SlideError::Presentation`]. A
    /// failure part way leaves whatever was already created in the document.
    pub async fn build_presentation(
        &self,
        ctx: &mut SessionContext,
        company: &str,
    ) -> Result<String> {
        self.build(ctx, company)
            .await
            .map_err(|source| SlideError::presentation(company, source))
    }

    async fn build(&self, ctx: &mut SessionContext, company: &str) -> Result<String> {
        if company.trim().is_empty() {
            return Err(SlideError::validation("company name must not be empty"));
        }

        let client = self.credentials.authorize().await?;
        ctx.set_client_handle(client);

        let document_id = self
            .bootstrapper
            .create_document(ctx, &format!("{company} Slide Deck"))
            .await?;
        ctx.set_document_id(document_id.clone());
        tracing::info!(company, document_id = %document_id, "[Orchestrator] Document ready");

        let slides = template_slides(company);
        for (index, slide) in slides.iter().enumerate() {
            let active = ctx.require_document_id()?.to_string();
            let composition = self.composer.compose(ctx, &active, slide).await?;
            tracing::info!(
                company,
                slide = index + 1,
                of = slides.len(),
                slide_id = %composition.slide_id,
                "[Orchestrator] Template slide added"
            );
        }

        Ok(document_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidewright_core::credential::{ClientHandle, StaticCredentialProvider};
    use slidewright_core::presentation::{InMemoryDocumentService, ServiceCall};

    struct DenyingProvider;

    #[async_trait::async_trait]
    impl CredentialProvider for DenyingProvider {
        async fn authorize(&self) -> Result<ClientHandle> {
            Err(SlideError::session_state("consent was not granted"))
        }
    }

    fn orchestrator(service: &Arc<InMemoryDocumentService>) -> PresentationOrchestrator {
        PresentationOrchestrator::new(
            service.clone(),
            Arc::new(StaticCredentialProvider::new("token")),
            ComposerConfig::default(),
        )
    }

    #[test]
    fn test_template_slides_are_distinct() {
        let slides = template_slides("Acme");
        assert_eq!(slides[0].title, "Acme Overview");
        assert_eq!(slides[0].style, SlideStyle::Paragraph);
        assert_eq!(slides[1].title, "Key Highlights");
        assert_eq!(slides[1].expected_bullet_count(), 3);
    }

    #[tokio::test]
    async fn test_builds_title_and_template_slides() {
        let service = Arc::new(InMemoryDocumentService::new());
        let mut ctx = SessionContext::new();

        let id = orchestrator(&service)
            .build_presentation(&mut ctx, "Acme")
            .await
            .unwrap();

        assert_eq!(ctx.document_id(), Some(id.as_str()));
        let document = service.document(&id).await.unwrap();
        assert_eq!(document.title, "Acme Slide Deck");
        assert_eq!(document.slides.len(), 3);
        assert_eq!(document.slides[1].page_elements[0].text(), "Acme Overview");
        assert_eq!(document.slides[2].page_elements[1].bullet_items().len(), 3);
    }

    #[tokio::test]
    async fn test_credential_failure_is_wrapped() {
        let service = Arc::new(InMemoryDocumentService::new());
        let orchestrator = PresentationOrchestrator::new(
            service.clone(),
            Arc::new(DenyingProvider),
            ComposerConfig::default(),
        );

        let err = orchestrator
            .build_presentation(&mut SessionContext::new(), "Acme")
            .await
            .unwrap_err();

        match &err {
            SlideError::Presentation { company, source } => {
                assert_eq!(company, "Acme");
                assert!(source.is_session_state());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(service.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_mid_sequence_failure_keeps_partial_document() {
        // Batch 0 fills the title slide, batch 1 creates the first template slide.
        let service = Arc::new(InMemoryDocumentService::new().failing_batch_at(2));
        let mut ctx = SessionContext::new();

        let err = orchestrator(&service)
            .build_presentation(&mut ctx, "Acme")
            .await
            .unwrap_err();
        assert!(matches!(err, SlideError::Presentation { .. }));

        let id = ctx.document_id().unwrap().to_string();
        let document = service.document(&id).await.unwrap();
        assert_eq!(document.slides.len(), 2);
        let creates = service
            .calls()
            .await
            .iter()
            .filter(|call| matches!(call, ServiceCall::CreateDocument { .. }))
            .count();
        assert_eq!(creates, 1);
    }
}
