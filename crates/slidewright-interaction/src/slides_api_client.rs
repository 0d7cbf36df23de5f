//! SlidesApiClient - REST implementation of the document service.
//!
//! Talks to the Google Slides v1 API directly over HTTPS with a bearer token
//! taken from the caller's session.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use slidewright_core::config::{DEFAULT_SLIDES_API_BASE_URL, SlidesApiConfig};
use slidewright_core::credential::ClientHandle;
use slidewright_core::presentation::{
    BatchUpdateResponse, Document, DocumentService, MutationBatch, PageElement, Paragraph,
    Placeholder, Slide, TextStyle,
};
use slidewright_core::{Result, SlideError};
use std::time::Duration;

/// Document service backed by the Slides REST API.
#[derive(Clone)]
pub struct SlidesApiClient {
    client: Client,
    base_url: String,
}

impl SlidesApiClient {
    /// Creates a client for `base_url` (e.g. `https://slides.googleapis.com`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SlideError::remote(format!("Failed to build HTTP client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &SlidesApiConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn presentations_url(&self) -> String {
        format!("{}/v1/presentations", self.base_url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder, action: &str) -> Result<T> {
        let response = request.send().await.map_err(|err| SlideError::RemoteService {
            status: None,
            message: format!("{action} request failed: {err}"),
            retryable: err.is_connect() || err.is_timeout(),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Slides error body".to_string());
            return Err(map_http_error(status, &body_text, action));
        }

        response
            .json()
            .await
            .map_err(|err| SlideError::remote(format!("Failed to parse {action} response: {err}")))
    }
}

impl Default for SlidesApiClient {
    fn default() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_SLIDES_API_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl DocumentService for SlidesApiClient {
    async fn create_document(&self, client: &ClientHandle, title: &str) -> Result<Document> {
        let request = self
            .client
            .post(self.presentations_url())
            .bearer_auth(client.access_token())
            .json(&serde_json::json!({ "title": title }));

        let presentation: PresentationResponse = self.send(request, "createPresentation").await?;
        Ok(presentation.into_document())
    }

    async fn get_document(&self, client: &ClientHandle, document_id: &str) -> Result<Document> {
        let request = self
            .client
            .get(format!("{}/{}", self.presentations_url(), document_id))
            .bearer_auth(client.access_token());

        let presentation: PresentationResponse = self.send(request, "getPresentation").await?;
        Ok(presentation.into_document())
    }

    async fn batch_update(
        &self,
        client: &ClientHandle,
        document_id: &str,
        batch: &MutationBatch,
    ) -> Result<BatchUpdateResponse> {
        tracing::debug!(
            document_id,
            requests = batch.len(),
            kinds = %batch.summary(),
            "Sending batchUpdate"
        );

        let request = self
            .client
            .post(format!("{}/{}:batchUpdate", self.presentations_url(), document_id))
            .bearer_auth(client.access_token())
            .json(batch);

        self.send(request, "batchUpdate").await
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresentationResponse {
    presentation_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    slides: Vec<PageResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageResponse {
    object_id: String,
    #[serde(default)]
    page_elements: Vec<PageElementResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageElementResponse {
    object_id: String,
    #[serde(default)]
    shape: Option<ShapeResponse>,
}

#[derive(Deserialize)]
struct ShapeResponse {
    #[serde(default)]
    placeholder: Option<Placeholder>,
    #[serde(default)]
    text: Option<TextContentResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextContentResponse {
    #[serde(default)]
    text_elements: Vec<TextElementResponse>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TextElementResponse {
    #[serde(default)]
    paragraph_marker: Option<ParagraphMarkerResponse>,
    #[serde(default)]
    text_run: Option<TextRunResponse>,
}

#[derive(Deserialize)]
struct ParagraphMarkerResponse {
    #[serde(default)]
    bullet: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct TextRunResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    style: Option<TextStyle>,
}

impl PresentationResponse {
    fn into_document(self) -> Document {
        Document {
            id: self.presentation_id,
            title: self.title,
            slides: self
                .slides
                .into_iter()
                .map(|page| Slide {
                    object_id: page.object_id,
                    page_elements: page
                        .page_elements
                        .into_iter()
                        .map(PageElementResponse::into_element)
                        .collect(),
                })
                .collect(),
        }
    }
}

impl PageElementResponse {
    fn into_element(self) -> PageElement {
        let mut element = PageElement::new(self.object_id);
        if let Some(shape) = self.shape {
            element.placeholder = shape.placeholder;
            if let Some(text) = shape.text {
                let (paragraphs, style) = collect_paragraphs(text.text_elements);
                element.paragraphs = paragraphs;
                element.style = style;
            }
        }
        element
    }
}

/// Folds text elements into paragraphs.
///
/// A paragraph marker opens a paragraph; text runs append to the open one.
/// The service terminates every paragraph with `\n`, which is stripped.
fn collect_paragraphs(elements: Vec<TextElementResponse>) -> (Vec<Paragraph>, Option<TextStyle>) {
    let mut paragraphs: Vec<Paragraph> = Vec::new();
    let mut style = None;

    for element in elements {
        if let Some(marker) = element.paragraph_marker {
            paragraphs.push(Paragraph {
                text: String::new(),
                bulleted: marker.bullet.is_some(),
            });
        }
        if let Some(run) = element.text_run {
            if style.is_none() {
                style = run.style.filter(|s| *s != TextStyle::default());
            }
            if paragraphs.is_empty() {
                paragraphs.push(Paragraph::plain(""));
            }
            if let Some(open) = paragraphs.last_mut() {
                open.text.push_str(&run.content);
            }
        }
    }

    for paragraph in &mut paragraphs {
        if paragraph.text.ends_with('\n') {
            paragraph.text.pop();
        }
    }

    (paragraphs, style)
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn map_http_error(status: StatusCode, body: &str, action: &str) -> SlideError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| match wrapper.error.status {
            Some(code) => format!("{action}: {code}: {}", wrapper.error.message),
            None => format!("{action}: {}", wrapper.error.message),
        })
        .unwrap_or_else(|_| format!("{action}: {body}"));

    let is_retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );

    SlideError::remote_status(status.as_u16(), message, is_retryable)
}
