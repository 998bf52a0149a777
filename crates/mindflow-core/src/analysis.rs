//! Analysis gateway port.
//!
//! Maps raw captured input (audio bytes or typed text) to a structured
//! annotation: transcript, emotion label, category, and tags. The gateway is
//! an opaque external collaborator; callers must substitute
//! [`EntryAnnotation::fallback`] on any failure so a captured thought is
//! never lost because annotation failed.

use crate::entry::Emotion;
use crate::error::Result;
use async_trait::async_trait;

/// Category attached to entries the gateway could not process.
pub const FALLBACK_CATEGORY: &str = "Uncategorized";
/// Tag attached to entries the gateway could not process.
pub const FALLBACK_TAG: &str = "Unprocessed";
/// Placeholder transcript when audio could not be transcribed at all.
pub const FALLBACK_AUDIO_TEXT: &str = "Error processing audio. Please try again.";

/// Raw input handed to the analysis gateway.
#[derive(Debug, Clone)]
pub enum AnalysisInput {
    /// Base64-encoded audio snippet plus its MIME type.
    Audio { base64: String, mime_type: String },
    /// Typed text.
    Text { content: String },
}

/// Structured annotation returned by the gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryAnnotation {
    /// Transcription of the input (for text input, usually the input itself).
    pub transcript: String,
    /// Dominant emotion, already narrowed to the closed set.
    pub emotion: Emotion,
    /// High-level category.
    pub category: String,
    /// Up to a handful of content tags.
    pub tags: Vec<String>,
}

impl EntryAnnotation {
    /// The fixed substitute used when annotation fails.
    ///
    /// For text input the original content is preserved as the transcript;
    /// for audio there is nothing to preserve, so a placeholder is used (the
    /// audio payload itself is kept on the entry either way).
    pub fn fallback(source_text: Option<&str>) -> Self {
        Self {
            transcript: source_text.unwrap_or(FALLBACK_AUDIO_TEXT).to_string(),
            emotion: Emotion::Neutral,
            category: FALLBACK_CATEGORY.to_string(),
            tags: vec![FALLBACK_TAG.to_string()],
        }
    }
}

/// Service for annotating captured input and generating lazy reflections.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    /// Annotates raw input. `language` is a hint such as "en" or "zh".
    async fn annotate(&self, input: AnalysisInput, language: &str) -> Result<EntryAnnotation>;

    /// Generates a short reflection for an entry's text.
    async fn reflect(&self, entry_text: &str, language: &str) -> Result<String>;
}
