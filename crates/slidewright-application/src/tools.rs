//! Agent-facing tool surface.
//!
//! Exposes record extraction, deck creation, and custom slides as tools an
//! LLM agent can call. Every tool returns a human readable message; failures
//! are reported in the message, never as an error.

use crate::presentation_orchestrator::PresentationOrchestrator;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use slidewright_core::presentation::SlideContentRequest;
use slidewright_core::rows::RowSource;
use slidewright_core::{Result, SessionContext, SlideError};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const EXTRACT_RECORD: &str = "extract_record";
pub const CREATE_DOCUMENT: &str = "create_document";
pub const ADD_CUSTOM_SLIDE: &str = "add_custom_slide";

/// Describes one tool for registration with an agent runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Deserialize)]
struct ExtractRecordArgs {
    #[serde(alias = "company_name")]
    key: String,
}

#[derive(Debug, Deserialize)]
struct CreateDocumentArgs {
    company_name: String,
}

#[derive(Debug, Deserialize)]
struct AddCustomSlideArgs {
    title: String,
    content: String,
    document_id: String,
    #[serde(default = "default_style")]
    style: String,
}

fn default_style() -> String {
    "Paragraph".to_string()
}

/// The tool host: one session context shared by all tool calls.
///
/// The context lock is held for the whole of each call, so tool calls are
/// serialized.
pub struct PresentationTools {
    orchestrator: PresentationOrchestrator,
    rows: Arc<dyn RowSource>,
    context: Mutex<SessionContext>,
}

impl PresentationTools {
    pub fn new(orchestrator: PresentationOrchestrator, rows: Arc<dyn RowSource>) -> Self {
        Self {
            orchestrator,
            rows,
            context: Mutex::new(SessionContext::new()),
        }
    }

    /// Active document id of the shared session.
    pub async fn active_document_id(&self) -> Option<String> {
        self.context.lock().await.document_id().map(str::to_string)
    }

    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: EXTRACT_RECORD,
                description: "Look up a company's row in the data source and return its fields.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "key": {
                            "type": "string",
                            "description": "Value of the key column, e.g. the company name"
                        }
                    },
                    "required": ["key"]
                }),
            },
            ToolDefinition {
                name: CREATE_DOCUMENT,
                description: "Create a new slide deck for a company with a title slide and template slides. Returns the document id.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "company_name": {
                            "type": "string",
                            "description": "Company the deck is about"
                        }
                    },
                    "required": ["company_name"]
                }),
            },
            ToolDefinition {
                name: ADD_CUSTOM_SLIDE,
                description: "Append a slide with a title and body to an existing deck. Use style 'Bullet' for one bullet per line.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "content": {
                            "type": "string",
                            "description": "Body text; lines are separated by newlines"
                        },
                        "document_id": { "type": "string" },
                        "style": {
                            "type": "string",
                            "enum": ["Paragraph", "Bullet"],
                            "default": "Paragraph"
                        }
                    },
                    "required": ["title", "content", "document_id"]
                }),
            },
        ]
    }

    /// Runs the tool `name` with JSON arguments.
    pub async fn dispatch(&self, name: &str, args: Value) -> String {
        tracing::debug!(tool = name, "Dispatching tool call");
        match name {
            EXTRACT_RECORD => match serde_json::from_value::<ExtractRecordArgs>(args) {
                Ok(args) => self.extract_record(&args.key).await,
                Err(e) => invalid_arguments(name, e),
            },
            CREATE_DOCUMENT => match serde_json::from_value::<CreateDocumentArgs>(args) {
                Ok(args) => self.create_document(&args.company_name).await,
                Err(e) => invalid_arguments(name, e),
            },
            ADD_CUSTOM_SLIDE => match serde_json::from_value::<AddCustomSlideArgs>(args) {
                Ok(args) => {
                    self.add_custom_slide(
                        &args.title,
                        &args.content,
                        &args.document_id,
                        &args.style,
                    )
                    .await
                }
                Err(e) => invalid_arguments(name, e),
            },
            other => {
                tracing::warn!(tool = other, "Unknown tool requested");
                format!("Unknown tool '{other}'")
            }
        }
    }

    pub async fn extract_record(&self, key: &str) -> String {
        match self.rows.lookup(key).await {
            Ok(Some(record)) => format!("Record for '{key}':\n{}", record.to_lines()),
            Ok(None) => format!("No record found for '{key}'"),
            Err(e) => {
                tracing::warn!(key, error = %e, "Record extraction failed");
                format!("Failed to extract record for '{key}': {e}")
            }
        }
    }

    pub async fn create_document(&self, company_name: &str) -> String {
        let mut ctx = self.context.lock().await;
        match self
            .orchestrator
            .build_presentation(&mut ctx, company_name)
            .await
        {
            Ok(document_id) => {
                format!("Created presentation for {company_name}. Document ID: {document_id}")
            }
            Err(e) => {
                tracing::error!(company = company_name, error = %e, "Presentation build failed");
                format!("Failed to create presentation: {e}")
            }
        }
    }

    /// Adds a slide to `document_id`, which also becomes the active document.
    pub async fn add_custom_slide(
        &self,
        title: &str,
        content: &str,
        document_id: &str,
        style: &str,
    ) -> String {
        let mut ctx = self.context.lock().await;
        match self
            .add_slide_in(&mut ctx, title, content, document_id, style)
            .await
        {
            Ok(slide_id) => {
                format!("Added slide '{title}' ({slide_id}) to presentation {document_id}")
            }
            Err(e) => {
                tracing::error!(document_id, error = %e, "Adding custom slide failed");
                format!("Failed to add slide '{title}': {e}")
            }
        }
    }

    async fn add_slide_in(
        &self,
        ctx: &mut SessionContext,
        title: &str,
        content: &str,
        document_id: &str,
        style: &str,
    ) -> Result<String> {
        let composer = self.orchestrator.composer();
        // Checked before authorizing so bad input never reaches the network.
        let request = SlideContentRequest::parse(title, content, style)?;
        if document_id.trim().is_empty() {
            return Err(SlideError::validation("document id must not be empty"));
        }

        // Providers hand back their cached token until it expires, so a
        // handle kept from an earlier call may be stale.
        let client = self.orchestrator.credentials().authorize().await?;
        ctx.set_client_handle(client);
        ctx.set_document_id(document_id);

        let composition = composer.compose(ctx, document_id, &request).await?;
        Ok(composition.slide_id)
    }
}

fn invalid_arguments(tool: &str, error: serde_json::Error) -> String {
    tracing::warn!(tool, error = %error, "Invalid tool arguments");
    format!("Invalid arguments for '{tool}': {error}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use slidewright_core::config::ComposerConfig;
    use slidewright_core::credential::{ClientHandle, CredentialProvider, StaticCredentialProvider};
    use slidewright_core::presentation::{
        BatchUpdateResponse, Document, DocumentService, InMemoryDocumentService, MutationBatch,
    };
    use slidewright_core::rows::{CellValue, Record};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct OneRow;

    #[async_trait]
    impl RowSource for OneRow {
        async fn lookup(&self, key: &str) -> Result<Option<Record>> {
            match key {
                "Acme" => {
                    let mut record = Record::new();
                    record.push("Company", CellValue::parse("Acme"));
                    record.push("Employees", CellValue::parse("120"));
                    Ok(Some(record))
                }
                "broken" => Err(SlideError::io("disk on fire")),
                _ => Ok(None),
            }
        }
    }

    fn tools(service: &Arc<InMemoryDocumentService>) -> PresentationTools {
        let orchestrator = PresentationOrchestrator::new(
            service.clone(),
            Arc::new(StaticCredentialProvider::new("token")),
            ComposerConfig::default(),
        );
        PresentationTools::new(orchestrator, Arc::new(OneRow))
    }

    #[test]
    fn test_definitions_cover_every_tool() {
        let names: Vec<&str> = PresentationTools::definitions()
            .iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec![EXTRACT_RECORD, CREATE_DOCUMENT, ADD_CUSTOM_SLIDE]);
        for definition in PresentationTools::definitions() {
            assert_eq!(definition.input_schema["type"], "object");
        }
    }

    #[tokio::test]
    async fn test_extract_record_messages() {
        let tools = tools(&Arc::new(InMemoryDocumentService::new()));

        assert_eq!(
            tools.extract_record("Acme").await,
            "Record for 'Acme':\nCompany: Acme\nEmployees: 120"
        );
        assert_eq!(tools.extract_record("Nobody").await, "No record found for 'Nobody'");
        assert!(tools.extract_record("broken").await.starts_with("Failed to extract record"));
    }

    #[tokio::test]
    async fn test_dispatch_create_then_add_slide() {
        let service = Arc::new(InMemoryDocumentService::new());
        let tools = tools(&service);

        let message = tools
            .dispatch(CREATE_DOCUMENT, json!({"company_name": "Acme"}))
            .await;
        let id = tools.active_document_id().await.unwrap();
        assert!(message.ends_with(&format!("Document ID: {id}")));

        let message = tools
            .dispatch(
                ADD_CUSTOM_SLIDE,
                json!({"title": "Roadmap", "content": "Q1\nQ2", "document_id": id.as_str(), "style": "Bullet"}),
            )
            .await;
        assert!(message.starts_with("Added slide 'Roadmap'"), "{message}");

        let document = service.document(&id).await.unwrap();
        assert_eq!(document.slides.len(), 4);
        assert_eq!(document.slides[3].page_elements[1].bullet_items(), vec!["Q1", "Q2"]);
    }

    #[tokio::test]
    async fn test_add_slide_to_existing_document_authorizes() {
        let service = Arc::new(InMemoryDocumentService::new());
        let existing = service
            .create_document(&ClientHandle::new("t"), "Deck")
            .await
            .unwrap();
        let tools = tools(&service);

        let message = tools
            .add_custom_slide("Notes", "text", &existing.id, "paragraph")
            .await;

        assert!(message.starts_with("Added slide"), "{message}");
        assert_eq!(tools.active_document_id().await, Some(existing.id));
    }

    #[tokio::test]
    async fn test_failures_become_messages() {
        let service = Arc::new(InMemoryDocumentService::new());
        let tools = tools(&service);

        let message = tools.add_custom_slide("T", "body", "doc", "Numbered").await;
        assert!(message.starts_with("Failed to add slide 'T': Validation error"), "{message}");
        assert!(service.calls().await.is_empty());

        let message = tools.dispatch(ADD_CUSTOM_SLIDE, json!({"title": "T"})).await;
        assert!(message.starts_with("Invalid arguments for 'add_custom_slide'"));

        assert_eq!(
            tools.dispatch("delete_everything", json!({})).await,
            "Unknown tool 'delete_everything'"
        );
    }

    /// Issues `tok0`, `tok1`, ... ; each call replaces the previous token.
    #[derive(Default)]
    struct RotatingTokens {
        issued: AtomicUsize,
    }

    impl RotatingTokens {
        fn current(&self) -> String {
            format!("tok{}", self.issued.load(Ordering::SeqCst).saturating_sub(1))
        }
    }

    #[async_trait]
    impl CredentialProvider for RotatingTokens {
        async fn authorize(&self) -> Result<ClientHandle> {
            let n = self.issued.fetch_add(1, Ordering::SeqCst);
            Ok(ClientHandle::new(format!("tok{n}")))
        }
    }

    /// Rejects every token except the one most recently issued.
    struct LatestTokenOnly {
        inner: InMemoryDocumentService,
        tokens: Arc<RotatingTokens>,
    }

    impl LatestTokenOnly {
        fn check(&self, client: &ClientHandle) -> Result<()> {
            if client.access_token() == self.tokens.current() {
                Ok(())
            } else {
                Err(SlideError::remote_status(401, "token expired", false))
            }
        }
    }

    #[async_trait]
    impl DocumentService for LatestTokenOnly {
        async fn create_document(&self, client: &ClientHandle, title: &str) -> Result<Document> {
            self.check(client)?;
            self.inner.create_document(client, title).await
        }

        async fn get_document(&self, client: &ClientHandle, document_id: &str) -> Result<Document> {
            self.check(client)?;
            self.inner.get_document(client, document_id).await
        }

        async fn batch_update(
            &self,
            client: &ClientHandle,
            document_id: &str,
            batch: &MutationBatch,
        ) -> Result<BatchUpdateResponse> {
            self.check(client)?;
            self.inner.batch_update(client, document_id, batch).await
        }
    }

    #[tokio::test]
    async fn test_add_slide_after_token_refresh_uses_new_token() {
        let tokens = Arc::new(RotatingTokens::default());
        let service = Arc::new(LatestTokenOnly {
            inner: InMemoryDocumentService::new(),
            tokens: tokens.clone(),
        });
        let orchestrator =
            PresentationOrchestrator::new(service, tokens.clone(), ComposerConfig::default());
        let tools = PresentationTools::new(orchestrator, Arc::new(OneRow));

        let message = tools.create_document("Acme").await;
        assert!(message.starts_with("Created presentation"), "{message}");
        let id = tools.active_document_id().await.unwrap();

        // Another holder refreshes the token; the session's handle is now stale.
        tokens.authorize().await.unwrap();

        let message = tools.add_custom_slide("Later", "text", &id, "Paragraph").await;
        assert!(message.starts_with("Added slide 'Later'"), "{message}");
    }
}
