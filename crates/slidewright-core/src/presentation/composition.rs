//! Slide content requests and composition bookkeeping.

use super::model::Slide;
use crate::error::{Result, SlideError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the body placeholder is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlideStyle {
    /// Plain body text.
    #[default]
    Paragraph,
    /// One bullet per line of body text.
    Bullet,
}

impl FromStr for SlideStyle {
    type Err = SlideError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paragraph" => Ok(Self::Paragraph),
            "bullet" => Ok(Self::Bullet),
            other => Err(SlideError::validation(format!(
                "unknown slide style '{other}', expected 'Paragraph' or 'Bullet'"
            ))),
        }
    }
}

impl fmt::Display for SlideStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paragraph => f.write_str("Paragraph"),
            Self::Bullet => f.write_str("Bullet"),
        }
    }
}

/// Caller-supplied content for one slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideContentRequest {
    pub title: String,
    pub body: String,
    pub style: SlideStyle,
}

impl SlideContentRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>, style: SlideStyle) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            style,
        }
    }

    /// Builds a request from untyped tool input, checking everything that can
    /// be checked locally.
    pub fn parse(title: &str, body: &str, style: &str) -> Result<Self> {
        let style = style.parse::<SlideStyle>()?;
        let request = Self::new(title, body, style);
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(SlideError::validation("slide title must not be empty"));
        }
        Ok(())
    }

    /// Number of bullet items the body will produce under `Bullet` style.
    /// An empty body is never inserted, so it produces none.
    pub fn expected_bullet_count(&self) -> usize {
        match self.style {
            SlideStyle::Bullet if !self.body.is_empty() => self.body.matches('\n').count() + 1,
            _ => 0,
        }
    }
}

/// Identifiers of the title and body placeholders of one slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderRoles {
    pub slide_id: String,
    pub title_id: String,
    pub body_id: String,
}

impl PlaceholderRoles {
    /// Resolves roles on `slide`.
    ///
    /// When `assigned` ids are given and both exist on the slide they win;
    /// otherwise element 0 is the title and element 1 the body.
    pub fn resolve(slide: &Slide, assigned: Option<(&str, &str)>) -> Result<Self> {
        if slide.page_elements.is_empty() {
            return Err(SlideError::structure(format!(
                "slide '{}' has no placeholder elements",
                slide.object_id
            )));
        }

        if let Some((title_id, body_id)) = assigned {
            if slide.element(title_id).is_some() && slide.element(body_id).is_some() {
                return Ok(Self {
                    slide_id: slide.object_id.clone(),
                    title_id: title_id.to_string(),
                    body_id: body_id.to_string(),
                });
            }
        }

        Self::positional(slide)
    }

    /// Element 0 is the title, element 1 the body.
    pub fn positional(slide: &Slide) -> Result<Self> {
        match slide.page_elements.as_slice() {
            [title, body, ..] => Ok(Self {
                slide_id: slide.object_id.clone(),
                title_id: title.object_id.clone(),
                body_id: body.object_id.clone(),
            }),
            [] => Err(SlideError::structure(format!(
                "slide '{}' has no placeholder elements",
                slide.object_id
            ))),
            [_] => Err(SlideError::structure(format!(
                "slide '{}' has 1 placeholder element, expected 2",
                slide.object_id
            ))),
        }
    }
}

/// Where a slide is in its composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompositionState {
    /// The structural shell exists; content has not been written.
    Created,
    /// Title and body are written and styled.
    Populated,
}

impl fmt::Display for CompositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Populated => f.write_str("populated"),
        }
    }
}

/// Record of one slide composition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideComposition {
    pub document_id: String,
    pub slide_id: String,
    pub state: CompositionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_id: Option<String>,
}

impl SlideComposition {
    pub fn created(document_id: impl Into<String>, slide_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            slide_id: slide_id.into(),
            state: CompositionState::Created,
            title_id: None,
            body_id: None,
        }
    }

    /// Marks the slide populated through `roles`.
    pub fn populated(mut self, roles: &PlaceholderRoles) -> Self {
        self.slide_id = roles.slide_id.clone();
        self.title_id = Some(roles.title_id.clone());
        self.body_id = Some(roles.body_id.clone());
        self.state = CompositionState::Populated;
        self
    }

    pub fn is_populated(&self) -> bool {
        self.state == CompositionState::Populated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::model::PageElement;

    fn slide(ids: &[&str]) -> Slide {
        Slide {
            object_id: "slide".into(),
            page_elements: ids.iter().map(|id| PageElement::new(*id)).collect(),
        }
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("Bullet".parse::<SlideStyle>().unwrap(), SlideStyle::Bullet);
        assert_eq!(" paragraph ".parse::<SlideStyle>().unwrap(), SlideStyle::Paragraph);
        assert!("Numbered".parse::<SlideStyle>().unwrap_err().is_validation());
        assert!("".parse::<SlideStyle>().unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_rejects_empty_title() {
        let err = SlideContentRequest::parse("  ", "body", "Bullet").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_expected_bullet_count() {
        let request = SlideContentRequest::new("t", "a\nb\nc", SlideStyle::Bullet);
        assert_eq!(request.expected_bullet_count(), 3);
        let request = SlideContentRequest::new("t", "a\nb\nc", SlideStyle::Paragraph);
        assert_eq!(request.expected_bullet_count(), 0);
        let request = SlideContentRequest::new("t", "", SlideStyle::Bullet);
        assert_eq!(request.expected_bullet_count(), 0);
    }

    #[test]
    fn test_resolve_prefers_assigned_ids() {
        let s = slide(&["body_x", "title_x"]);
        let roles = PlaceholderRoles::resolve(&s, Some(("title_x", "body_x"))).unwrap();
        assert_eq!(roles.title_id, "title_x");
        assert_eq!(roles.body_id, "body_x");
    }

    #[test]
    fn test_resolve_falls_back_to_positions() {
        let s = slide(&["e0", "e1"]);
        let roles = PlaceholderRoles::resolve(&s, Some(("missing", "e1"))).unwrap();
        assert_eq!(roles.title_id, "e0");
        assert_eq!(roles.body_id, "e1");
    }

    #[test]
    fn test_resolve_checks_arity() {
        assert!(PlaceholderRoles::resolve(&slide(&[]), None).unwrap_err().is_structure());
        assert!(PlaceholderRoles::resolve(&slide(&["only"]), None).unwrap_err().is_structure());
    }

    #[test]
    fn test_composition_transitions() {
        let record = SlideComposition::created("doc", "slide");
        assert!(!record.is_populated());

        let roles = PlaceholderRoles::positional(&slide(&["t", "b"])).unwrap();
        let record = record.populated(&roles);
        assert!(record.is_populated());
        assert_eq!(record.title_id.as_deref(), Some("t"));
    }
}
