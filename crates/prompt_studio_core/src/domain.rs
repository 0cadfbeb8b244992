//! crates/prompt_studio_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or remote API format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monotonically increasing identifier for a chat turn.
///
/// Ids are assigned by the conversation in append order and are never reused,
/// so comparing two ids also compares their causal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(pub u64);

/// Who produced a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

/// One immutable entry in the visible conversation history.
///
/// Turns are append-only: once created they are never mutated. Edits to a
/// candidate prompt happen on the conversation's live candidate (or in
/// transient view state on the client), never on an appended turn.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub id: TurnId,
    pub speaker: Speaker,
    pub text: String,
    /// Present iff this turn carries a prompt awaiting user action.
    pub candidate: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    /// True iff this turn carries a prompt awaiting user action.
    pub fn is_candidate_prompt(&self) -> bool {
        self.candidate.is_some()
    }
}

/// The current working text intended for the image-generation call, subject
/// to user edit and regeneration before being confirmed.
///
/// Exactly one candidate is live at a time; confirming or regenerating
/// always acts on the live one.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidatePrompt {
    pub text: String,
    /// Style preset id in effect when the candidate was derived from a document.
    pub source_style_preset: Option<String>,
    /// Template string used for extraction-style analysis, if any.
    pub derived_from_template: Option<String>,
}

impl CandidatePrompt {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source_style_preset: None,
            derived_from_template: None,
        }
    }
}

/// The fixed set of supported output aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Standard,
    #[serde(rename = "3:4")]
    Portrait,
}

impl AspectRatio {
    /// The ratio as it appears in prompt directives, e.g. `16:9`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Standard => "4:3",
            AspectRatio::Portrait => "3:4",
        }
    }
}

/// The full set of generation parameters, always fully populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    pub aspect_ratio: AspectRatio,
    /// Id into the style catalog, or `"none"`.
    pub style_preset: String,
    /// Free text, may be empty.
    pub negative_prompt: String,
    /// Range [1, 20], step 0.5. Out-of-range values are a caller contract
    /// violation, not a recoverable error.
    pub guidance_scale: f32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: AspectRatio::Wide,
            style_preset: "photographic".to_string(),
            negative_prompt: String::new(),
            guidance_scale: 7.5,
        }
    }
}

/// A named, static text fragment appended to a prompt to bias the generated
/// image's aesthetic.
#[derive(Debug, Clone, Serialize)]
pub struct StylePreset {
    pub id: &'static str,
    pub label: &'static str,
    pub modifier: &'static str,
}

/// A ready-made prompt from the quick-prompt library, optionally paired with
/// a fill-in template and a style preset.
#[derive(Debug, Clone, Serialize)]
pub struct QuickPrompt {
    pub label: &'static str,
    pub prompt: &'static str,
    pub template: Option<&'static str>,
    pub style_preset: Option<&'static str>,
}

/// A document uploaded for analysis.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub file_name: String,
    pub media_type: String,
    pub data: Bytes,
}

/// The output of a successful generation call.
///
/// Owned by the conversation for as long as it is displayed; superseded, not
/// merged, by the next successful generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub data: Bytes,
    pub media_type: String,
}
