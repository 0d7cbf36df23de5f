//! Mutation requests and batches.
//!
//! The serde shapes match the Slides `batchUpdate` wire format, so a
//! `MutationBatch` serializes directly into a request body.

use serde::{Deserialize, Serialize};

/// Layout placeholder roles used by slide layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaceholderType {
    Title,
    CenteredTitle,
    Subtitle,
    Body,
    #[serde(other)]
    Other,
}

/// One atomic edit operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MutationRequest {
    CreateSlide(CreateSlideRequest),
    InsertText(InsertTextRequest),
    UpdateTextStyle(UpdateTextStyleRequest),
    CreateParagraphBullets(CreateParagraphBulletsRequest),
}

impl MutationRequest {
    /// The wire name of the operation, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateSlide(_) => "createSlide",
            Self::InsertText(_) => "insertText",
            Self::UpdateTextStyle(_) => "updateTextStyle",
            Self::CreateParagraphBullets(_) => "createParagraphBullets",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSlideRequest {
    /// Caller-chosen slide id; the service assigns one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    pub slide_layout_reference: LayoutReference,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub placeholder_id_mappings: Vec<PlaceholderIdMapping>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutReference {
    pub predefined_layout: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceholderIdMapping {
    pub layout_placeholder: LayoutPlaceholder,
    pub object_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlaceholder {
    #[serde(rename = "type")]
    pub kind: PlaceholderType,
    #[serde(default)]
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertTextRequest {
    pub object_id: String,
    pub text: String,
    pub insertion_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTextStyleRequest {
    pub object_id: String,
    pub style: TextStyle,
    pub text_range: TextRange,
    /// Field mask naming the style fields to apply.
    pub fields: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParagraphBulletsRequest {
    pub object_id: String,
    pub text_range: TextRange,
    pub bullet_preset: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TextRange {
    All,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Dimension>,
}

impl TextStyle {
    /// Field mask covering exactly the fields set on this style.
    pub fn field_mask(&self) -> String {
        let mut fields = Vec::new();
        if self.bold.is_some() {
            fields.push("bold");
        }
        if self.font_family.is_some() {
            fields.push("fontFamily");
        }
        if self.font_size.is_some() {
            fields.push("fontSize");
        }
        fields.join(",")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub magnitude: f64,
    #[serde(default)]
    pub unit: String,
}

impl Dimension {
    pub fn pt(magnitude: f64) -> Self {
        Self {
            magnitude,
            unit: "PT".to_string(),
        }
    }
}

/// An ordered group of operations submitted together against one document.
///
/// Operations apply in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationBatch {
    requests: Vec<MutationRequest>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, request: MutationRequest) -> Self {
        self.requests.push(request);
        self
    }

    pub fn create_slide(
        self,
        object_id: Option<String>,
        layout: impl Into<String>,
        placeholder_id_mappings: Vec<PlaceholderIdMapping>,
    ) -> Self {
        self.push(MutationRequest::CreateSlide(CreateSlideRequest {
            object_id,
            slide_layout_reference: LayoutReference {
                predefined_layout: layout.into(),
            },
            placeholder_id_mappings,
        }))
    }

    pub fn insert_text(self, object_id: impl Into<String>, text: impl Into<String>) -> Self {
        self.push(MutationRequest::InsertText(InsertTextRequest {
            object_id: object_id.into(),
            text: text.into(),
            insertion_index: 0,
        }))
    }

    /// Styles all text of an element; the field mask follows the style.
    pub fn update_text_style(self, object_id: impl Into<String>, style: TextStyle) -> Self {
        let fields = style.field_mask();
        self.push(MutationRequest::UpdateTextStyle(UpdateTextStyleRequest {
            object_id: object_id.into(),
            style,
            text_range: TextRange::All,
            fields,
        }))
    }

    pub fn create_bullets(self, object_id: impl Into<String>, preset: impl Into<String>) -> Self {
        self.push(MutationRequest::CreateParagraphBullets(
            CreateParagraphBulletsRequest {
                object_id: object_id.into(),
                text_range: TextRange::All,
                bullet_preset: preset.into(),
            },
        ))
    }

    pub fn requests(&self) -> &[MutationRequest] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Comma separated operation kinds, for logs.
    pub fn summary(&self) -> String {
        self.requests
            .iter()
            .map(MutationRequest::kind)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Replies from a batch, one per request, in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchUpdateResponse {
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl BatchUpdateResponse {
    /// The slide id echoed by the first `createSlide` reply, if any.
    pub fn created_slide_id(&self) -> Option<&str> {
        self.replies
            .iter()
            .find_map(|reply| reply.create_slide.as_ref())
            .map(|created| created.object_id.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_slide: Option<CreatedObject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedObject {
    pub object_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_batch_serializes_to_wire_format() {
        let batch = MutationBatch::new()
            .insert_text("title_1", "Overview")
            .update_text_style(
                "title_1",
                TextStyle {
                    bold: Some(true),
                    font_family: Some("Arial".into()),
                    font_size: Some(Dimension::pt(24.0)),
                },
            )
            .create_bullets("body_1", "BULLET_DISC_CIRCLE_SQUARE");

        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            value,
            json!({
                "requests": [
                    {"insertText": {"objectId": "title_1", "text": "Overview", "insertionIndex": 0}},
                    {"updateTextStyle": {
                        "objectId": "title_1",
                        "style": {"bold": true, "fontFamily": "Arial", "fontSize": {"magnitude": 24.0, "unit": "PT"}},
                        "textRange": {"type": "ALL"},
                        "fields": "bold,fontFamily,fontSize"
                    }},
                    {"createParagraphBullets": {
                        "objectId": "body_1",
                        "textRange": {"type": "ALL"},
                        "bulletPreset": "BULLET_DISC_CIRCLE_SQUARE"
                    }}
                ]
            })
        );
        assert_eq!(batch.summary(), "insertText,updateTextStyle,createParagraphBullets");
    }

    #[test]
    fn test_create_slide_with_mappings() {
        let batch = MutationBatch::new().create_slide(
            Some("slide_a".into()),
            "TITLE_AND_BODY",
            vec![PlaceholderIdMapping {
                layout_placeholder: LayoutPlaceholder {
                    kind: PlaceholderType::Title,
                    index: 0,
                },
                object_id: "slide_a_title".into(),
            }],
        );

        let value = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            value["requests"][0]["createSlide"],
            json!({
                "objectId": "slide_a",
                "slideLayoutReference": {"predefinedLayout": "TITLE_AND_BODY"},
                "placeholderIdMappings": [
                    {"layoutPlaceholder": {"type": "TITLE", "index": 0}, "objectId": "slide_a_title"}
                ]
            })
        );
    }

    #[test]
    fn test_created_slide_id_from_replies() {
        let response: BatchUpdateResponse = serde_json::from_value(json!({
            "replies": [{"createSlide": {"objectId": "g123"}}]
        }))
        .unwrap();
        assert_eq!(response.created_slide_id(), Some("g123"));

        let empty: BatchUpdateResponse =
            serde_json::from_value(json!({"replies": [{}, {}]})).unwrap();
        assert_eq!(empty.created_slide_id(), None);
    }

    #[test]
    fn test_unknown_placeholder_type_deserializes_as_other() {
        let kind: PlaceholderType = serde_json::from_value(json!("SLIDE_NUMBER")).unwrap();
        assert_eq!(kind, PlaceholderType::Other);
    }
}
