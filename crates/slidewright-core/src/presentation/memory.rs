//! In-memory document service.
//!
//! Behaves like the remote service for the operations composition uses:
//! ids are assigned on creation, batches apply in order and commit all or
//! nothing, and every call is recorded. Backs dry runs and tests.

use super::model::{Document, PageElement, Paragraph, Slide};
use super::request::{
    BatchUpdateResponse, CreateSlideRequest, CreatedObject, MutationBatch, MutationRequest,
    PlaceholderType, Reply, TextStyle,
};
use super::service::DocumentService;
use crate::credential::ClientHandle;
use crate::error::{Result, SlideError};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// A call observed by the in-memory service.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceCall {
    CreateDocument { title: String },
    GetDocument { document_id: String },
    BatchUpdate { document_id: String, batch: MutationBatch },
}

impl ServiceCall {
    pub fn is_batch_update(&self) -> bool {
        matches!(self, Self::BatchUpdate { .. })
    }
}

#[derive(Debug, Clone)]
struct MemoryOptions {
    honor_placeholder_mappings: bool,
    echo_created_ids: bool,
    echo_unknown_ids: bool,
    title_slide: bool,
    title_slide_elements: usize,
    layout_elements: usize,
    fail_batch_at: Option<usize>,
    fail_document_creation: bool,
    append_foreign_slide: bool,
}

impl Default for MemoryOptions {
    fn default() -> Self {
        Self {
            honor_placeholder_mappings: true,
            echo_created_ids: true,
            echo_unknown_ids: false,
            title_slide: true,
            title_slide_elements: 2,
            layout_elements: 2,
            fail_batch_at: None,
            fail_document_creation: false,
            append_foreign_slide: false,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    documents: HashMap<String, Document>,
    calls: Vec<ServiceCall>,
    batch_count: usize,
    next_id: usize,
}

impl MemoryState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{:04}", self.next_id)
    }
}

/// A document service that keeps documents in process memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentService {
    state: Mutex<MemoryState>,
    options: MemoryOptions,
}

impl InMemoryDocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies to `createSlide` without the created slide id.
    pub fn without_id_echo(mut self) -> Self {
        self.options.echo_created_ids = false;
        self
    }

    /// Replies to `createSlide` with an id that is not in the document.
    pub fn echoing_unknown_slide_id(mut self) -> Self {
        self.options.echo_unknown_ids = true;
        self
    }

    /// New documents start with no slides at all.
    pub fn without_title_slide(mut self) -> Self {
        self.options.title_slide = false;
        self
    }

    /// Assigns its own placeholder ids even when the request maps them.
    pub fn ignoring_placeholder_mappings(mut self) -> Self {
        self.options.honor_placeholder_mappings = false;
        self
    }

    /// Number of placeholders on the default first slide of new documents.
    pub fn with_title_slide_elements(mut self, count: usize) -> Self {
        self.options.title_slide_elements = count;
        self
    }

    /// Number of placeholders on slides created from a layout.
    pub fn with_layout_elements(mut self, count: usize) -> Self {
        self.options.layout_elements = count;
        self
    }

    /// Rejects the `index`-th (zero based) batch update.
    pub fn failing_batch_at(mut self, index: usize) -> Self {
        self.options.fail_batch_at = Some(index);
        self
    }

    pub fn failing_document_creation(mut self) -> Self {
        self.options.fail_document_creation = true;
        self
    }

    /// Appends an extra slide after every `createSlide`, as a concurrent
    /// editor would.
    pub fn appending_foreign_slides(mut self) -> Self {
        self.options.append_foreign_slide = true;
        self
    }

    /// Every call received so far, in order.
    pub async fn calls(&self) -> Vec<ServiceCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn document(&self, document_id: &str) -> Option<Document> {
        self.state.lock().await.documents.get(document_id).cloned()
    }

    fn build_elements(
        state: &mut MemoryState,
        kinds: &[PlaceholderType],
        count: usize,
    ) -> Vec<PageElement> {
        (0..count)
            .map(|i| {
                let kind = kinds.get(i).copied().unwrap_or(PlaceholderType::Other);
                PageElement::new(state.next_id("element")).with_placeholder(kind, 0)
            })
            .collect()
    }

    fn apply(
        &self,
        state: &mut MemoryState,
        document: &mut Document,
        request: &MutationRequest,
    ) -> Result<Reply> {
        match request {
            MutationRequest::CreateSlide(create) => {
                let slide_id = self.create_slide(state, document, create)?;
                if self.options.append_foreign_slide {
                    let elements = Self::build_elements(
                        state,
                        &[PlaceholderType::Title, PlaceholderType::Body],
                        self.options.layout_elements,
                    );
                    document.slides.push(Slide {
                        object_id: state.next_id("foreign"),
                        page_elements: elements,
                    });
                }
                let object_id = if self.options.echo_unknown_ids {
                    format!("{slide_id}_elsewhere")
                } else {
                    slide_id
                };
                Ok(Reply {
                    create_slide: self
                        .options
                        .echo_created_ids
                        .then_some(CreatedObject { object_id }),
                })
            }
            MutationRequest::InsertText(insert) => {
                let element = element_mut(document, &insert.object_id)?;
                insert_text(element, &insert.text, insert.insertion_index)?;
                Ok(Reply::default())
            }
            MutationRequest::UpdateTextStyle(update) => {
                let element = element_mut(document, &update.object_id)?;
                merge_style(element.style.get_or_insert_with(TextStyle::default), &update.style);
                Ok(Reply::default())
            }
            MutationRequest::CreateParagraphBullets(bullets) => {
                let element = element_mut(document, &bullets.object_id)?;
                for paragraph in &mut element.paragraphs {
                    paragraph.bulleted = true;
                }
                Ok(Reply::default())
            }
        }
    }

    fn create_slide(
        &self,
        state: &mut MemoryState,
        document: &mut Document,
        create: &CreateSlideRequest,
    ) -> Result<String> {
        let slide_id = match &create.object_id {
            Some(id) => {
                ensure_unused(document, id)?;
                id.clone()
            }
            None => state.next_id("slide"),
        };

        let mut elements = Self::build_elements(
            state,
            &[PlaceholderType::Title, PlaceholderType::Body],
            self.options.layout_elements,
        );

        if self.options.honor_placeholder_mappings {
            for mapping in &create.placeholder_id_mappings {
                ensure_unused(document, &mapping.object_id)?;
                let target = elements.iter_mut().find(|element| {
                    element.placeholder.is_some_and(|p| {
                        p.kind == mapping.layout_placeholder.kind
                            && p.index == mapping.layout_placeholder.index
                    })
                });
                match target {
                    Some(element) => element.object_id = mapping.object_id.clone(),
                    None => {
                        return Err(SlideError::remote_status(
                            400,
                            format!(
                                "layout '{}' has no {:?} placeholder at index {}",
                                create.slide_layout_reference.predefined_layout,
                                mapping.layout_placeholder.kind,
                                mapping.layout_placeholder.index
                            ),
                            false,
                        ));
                    }
                }
            }
        }

        document.slides.push(Slide {
            object_id: slide_id.clone(),
            page_elements: elements,
        });
        Ok(slide_id)
    }
}

fn ensure_unused(document: &Document, object_id: &str) -> Result<()> {
    let taken =
        document.find_slide(object_id).is_some() || document.find_element(object_id).is_some();
    if taken {
        return Err(SlideError::remote_status(
            400,
            format!("object id '{object_id}' already exists"),
            false,
        ));
    }
    Ok(())
}

fn element_mut<'a>(document: &'a mut Document, object_id: &str) -> Result<&'a mut PageElement> {
    document
        .slides
        .iter_mut()
        .flat_map(|slide| slide.page_elements.iter_mut())
        .find(|element| element.object_id == object_id)
        .ok_or_else(|| {
            SlideError::remote_status(400, format!("object '{object_id}' not found"), false)
        })
}

fn insert_text(element: &mut PageElement, text: &str, index: usize) -> Result<()> {
    let current: Vec<char> = element.text().chars().collect();
    if index > current.len() {
        return Err(SlideError::remote_status(
            400,
            format!(
                "insertion index {index} is past the end of '{}' ({} chars)",
                element.object_id,
                current.len()
            ),
            false,
        ));
    }
    let bulleted = !element.paragraphs.is_empty() && element.paragraphs.iter().all(|p| p.bulleted);
    let joined: String = current[..index]
        .iter()
        .copied()
        .chain(text.chars())
        .chain(current[index..].iter().copied())
        .collect();
    element.paragraphs = joined
        .split('\n')
        .map(|line| Paragraph {
            text: line.to_string(),
            bulleted,
        })
        .collect();
    Ok(())
}

fn merge_style(target: &mut TextStyle, update: &TextStyle) {
    if update.bold.is_some() {
        target.bold = update.bold;
    }
    if update.font_family.is_some() {
        target.font_family = update.font_family.clone();
    }
    if update.font_size.is_some() {
        target.font_size = update.font_size.clone();
    }
}

#[async_trait]
impl DocumentService for InMemoryDocumentService {
    async fn create_document(&self, _client: &ClientHandle, title: &str) -> Result<Document> {
        let mut state = self.state.lock().await;
        state.calls.push(ServiceCall::CreateDocument {
            title: title.to_string(),
        });

        if self.options.fail_document_creation {
            return Err(SlideError::remote_status(
                503,
                "document creation unavailable",
                true,
            ));
        }

        let id = state.next_id("presentation");
        let mut slides = Vec::new();
        if self.options.title_slide {
            let elements = Self::build_elements(
                &mut state,
                &[PlaceholderType::CenteredTitle, PlaceholderType::Subtitle],
                self.options.title_slide_elements,
            );
            slides.push(Slide {
                object_id: state.next_id("slide"),
                page_elements: elements,
            });
        }
        let document = Document {
            id: id.clone(),
            title: title.to_string(),
            slides,
        };
        state.documents.insert(id, document.clone());
        Ok(document)
    }

    async fn get_document(&self, _client: &ClientHandle, document_id: &str) -> Result<Document> {
        let mut state = self.state.lock().await;
        state.calls.push(ServiceCall::GetDocument {
            document_id: document_id.to_string(),
        });
        state.documents.get(document_id).cloned().ok_or_else(|| {
            SlideError::remote_status(404, format!("presentation '{document_id}' not found"), false)
        })
    }

    async fn batch_update(
        &self,
        _client: &ClientHandle,
        document_id: &str,
        batch: &MutationBatch,
    ) -> Result<BatchUpdateResponse> {
        let mut state = self.state.lock().await;
        state.calls.push(ServiceCall::BatchUpdate {
            document_id: document_id.to_string(),
            batch: batch.clone(),
        });

        let batch_index = state.batch_count;
        state.batch_count += 1;
        if self.options.fail_batch_at == Some(batch_index) {
            return Err(SlideError::remote_status(500, "backend error", true));
        }

        let mut working = state.documents.get(document_id).cloned().ok_or_else(|| {
            SlideError::remote_status(404, format!("presentation '{document_id}' not found"), false)
        })?;

        let mut replies = Vec::with_capacity(batch.len());
        for request in batch.requests() {
            replies.push(self.apply(&mut state, &mut working, request)?);
        }

        state.documents.insert(document_id.to_string(), working);
        Ok(BatchUpdateResponse { replies })
    }
}
