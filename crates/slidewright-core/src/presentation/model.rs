//! Presentation domain model.
//!
//! These are the core's view of a remote document: just enough structure to
//! locate slides and their placeholder elements, plus the text each element
//! holds so results can be inspected.

use super::request::{PlaceholderType, TextStyle};
use serde::{Deserialize, Serialize};

/// A remote presentation document.
///
/// Owned by the document service; the id is assigned at creation and never
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slides: Vec<Slide>,
}

impl Document {
    pub fn find_slide(&self, object_id: &str) -> Option<&Slide> {
        self.slides.iter().find(|slide| slide.object_id == object_id)
    }

    pub fn last_slide(&self) -> Option<&Slide> {
        self.slides.last()
    }

    /// Searches every slide for a page element.
    pub fn find_element(&self, object_id: &str) -> Option<&PageElement> {
        self.slides
            .iter()
            .flat_map(|slide| slide.page_elements.iter())
            .find(|element| element.object_id == object_id)
    }
}

/// One slide and its page elements in z-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub object_id: String,
    #[serde(default)]
    pub page_elements: Vec<PageElement>,
}

impl Slide {
    pub fn element(&self, object_id: &str) -> Option<&PageElement> {
        self.page_elements
            .iter()
            .find(|element| element.object_id == object_id)
    }
}

/// A page element; for composition this is always a layout placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageElement {
    pub object_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<Placeholder>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub paragraphs: Vec<Paragraph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<TextStyle>,
}

impl PageElement {
    pub fn new(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            placeholder: None,
            paragraphs: Vec::new(),
            style: None,
        }
    }

    pub fn with_placeholder(mut self, kind: PlaceholderType, index: u32) -> Self {
        self.placeholder = Some(Placeholder { kind, index });
        self
    }

    /// The element's text with paragraphs joined by line breaks.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of every bulleted paragraph, in order.
    pub fn bullet_items(&self) -> Vec<&str> {
        self.paragraphs
            .iter()
            .filter(|p| p.bulleted)
            .map(|p| p.text.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    #[serde(rename = "type")]
    pub kind: PlaceholderType,
    #[serde(default)]
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    #[serde(default)]
    pub bulleted: bool,
}

impl Paragraph {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bulleted: false,
        }
    }
}
