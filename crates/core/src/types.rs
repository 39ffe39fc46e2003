//! Domain types for slide requests and generated slides.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest deck a request may ask for.
pub const MIN_SLIDE_COUNT: usize = 1;

/// Largest deck a request may ask for.
pub const MAX_SLIDE_COUNT: usize = 20;

/// The wizard's answers describing the desired deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideRequest {
    /// What the presentation is for.
    pub purpose: String,

    /// Who will watch it.
    #[serde(default)]
    pub audience: Audience,

    /// Requested number of slides.
    pub slide_count: usize,

    /// Newline-delimited supplementary points.
    #[serde(default)]
    pub details: String,

    /// Free text or file names the user referred to. Never validated.
    #[serde(default)]
    pub inspiration: String,

    /// Which deck structure to produce.
    #[serde(default)]
    pub slide_type: RequestedSlideType,
}

impl SlideRequest {
    /// Create a request with empty details and inspiration.
    pub fn new(
        purpose: impl Into<String>,
        audience: Audience,
        slide_count: usize,
        slide_type: RequestedSlideType,
    ) -> Self {
        Self {
            purpose: purpose.into(),
            audience,
            slide_count,
            details: String::new(),
            inspiration: String::new(),
            slide_type,
        }
    }

    /// Set the supplementary details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Set the inspiration reference.
    pub fn with_inspiration(mut self, inspiration: impl Into<String>) -> Self {
        self.inspiration = inspiration.into();
        self
    }

    /// Check the constraints the wizard enforces.
    pub fn validate(&self) -> Result<()> {
        if self.purpose.trim().is_empty() {
            return Err(Error::InvalidRequest("purpose must not be empty".to_string()));
        }
        if !(MIN_SLIDE_COUNT..=MAX_SLIDE_COUNT).contains(&self.slide_count) {
            return Err(Error::InvalidRequest(format!(
                "slideCount must be between {} and {}, got {}",
                MIN_SLIDE_COUNT, MAX_SLIDE_COUNT, self.slide_count
            )));
        }
        Ok(())
    }

    /// Slide count clamped into the supported range.
    pub fn effective_slide_count(&self) -> usize {
        self.slide_count.clamp(MIN_SLIDE_COUNT, MAX_SLIDE_COUNT)
    }
}

/// Audience category chosen in the wizard.
///
/// Serialized with the wizard's Swedish option values; English names are
/// accepted too, and anything unknown becomes [`Audience::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Audience {
    Board,
    Colleagues,
    Customers,
    Workshop,
    General,
    #[default]
    Other,
}

impl Audience {
    /// Parse a wizard value. Total: unknown values map to `Other`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "styrelse" | "board" => Self::Board,
            "kollegor" | "colleagues" => Self::Colleagues,
            "kunder" | "customers" => Self::Customers,
            "workshop" => Self::Workshop,
            "allmän" | "general" => Self::General,
            _ => Self::Other,
        }
    }

    /// The wizard value for this audience.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Board => "styrelse",
            Self::Colleagues => "kollegor",
            Self::Customers => "kunder",
            Self::Workshop => "workshop",
            Self::General => "allmän",
            Self::Other => "other",
        }
    }

    /// Label used in the title slide subtitle.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Board => "För styrelse och ledning",
            Self::Colleagues => "Teamgenomgång",
            Self::Customers => "Kundpresentation",
            Self::Workshop => "Workshop-session",
            Self::General => "Allmän presentation",
            Self::Other => "Presentation",
        }
    }
}

impl From<String> for Audience {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<Option<String>> for Audience {
    fn from(value: Option<String>) -> Self {
        value.map(Self::from).unwrap_or_default()
    }
}

impl From<Audience> for String {
    fn from(audience: Audience) -> Self {
        audience.as_str().to_string()
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deck structure selected in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestedSlideType {
    Swot,
    SituationComplication,
    Agenda,
    Dashboard,
    #[default]
    Custom,
}

impl RequestedSlideType {
    /// Parse a wizard value such as `situation-complication`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "swot" => Some(Self::Swot),
            "situation-complication" => Some(Self::SituationComplication),
            "agenda" => Some(Self::Agenda),
            "dashboard" => Some(Self::Dashboard),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// One generated slide record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSlide {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Bullet points in display order.
    #[serde(default)]
    pub content: Vec<String>,

    pub slide_type: SlideKind,

    #[serde(default)]
    pub layout: SlideLayout,

    /// Speaker guidance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GeneratedSlide {
    /// Create a standard-layout content slide.
    pub fn content(title: impl Into<String>, content: Vec<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            content,
            slide_type: SlideKind::Content,
            layout: SlideLayout::Standard,
            notes: None,
        }
    }

    /// Set the slide kind.
    pub fn with_kind(mut self, kind: SlideKind) -> Self {
        self.slide_type = kind;
        self
    }

    /// Set the layout hint.
    pub fn with_layout(mut self, layout: SlideLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the subtitle.
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Set the speaker notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Kind of a generated slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlideKind {
    Title,
    Content,
    Swot,
    Agenda,
    Dashboard,
}

/// Presentation hint; carries no content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlideLayout {
    #[default]
    #[serde(rename = "standard", alias = "knowit-standard")]
    Standard,
    #[serde(rename = "title", alias = "knowit-title")]
    Title,
    #[serde(rename = "two-column", alias = "knowit-two-column")]
    TwoColumn,
}
