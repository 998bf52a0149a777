//! Entry domain model.
//!
//! An `Entry` is one journaled thought: the transcribed or typed text, a
//! creation timestamp that is the sole ordering key, an emotion label from a
//! closed set, tags, an optional category, and optional audio/reflection
//! payloads. The serialized form uses camelCase field names because the same
//! shape is stored verbatim in the cloud record blob.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// The closed set of emotion labels an entry can carry.
///
/// Labels serialize in UPPERCASE. Unknown or differently-cased labels coming
/// back from the analysis service must go through [`Emotion::parse_lenient`],
/// which falls back to `Neutral` instead of failing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    EnumIter,
    Display,
    Default,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Emotion {
    Joy,
    Sadness,
    Calm,
    Angry,
    Excited,
    Anxious,
    #[default]
    Neutral,
}

impl Emotion {
    /// Parses an emotion label case-insensitively, falling back to `Neutral`
    /// for anything outside the closed set.
    pub fn parse_lenient(label: &str) -> Self {
        Emotion::from_str(label.trim()).unwrap_or(Emotion::Neutral)
    }
}

/// One journaled thought.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Opaque unique identifier, assigned at creation, immutable.
    pub id: String,
    /// Transcribed or typed content.
    pub text: String,
    /// Creation instant in milliseconds since epoch. Immutable; the sole
    /// ordering key (descending = newest first).
    pub timestamp: i64,
    /// Emotion label; mutable post-creation via user override.
    pub emotion: Emotion,
    /// Tags in insertion order (order only matters for display).
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-form classification (e.g. Work, Philosophy, Life).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Embedded audio payload for voice-sourced entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_base64: Option<String>,
    /// Lazily generated reflection text; populated at most once.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
}

impl Entry {
    /// Creates a new entry with a fresh UUID and the current timestamp.
    pub fn new(
        text: impl Into<String>,
        emotion: Emotion,
        tags: Vec<String>,
        category: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            timestamp: Utc::now().timestamp_millis(),
            emotion,
            tags,
            category,
            audio_base64: None,
            ai_analysis: None,
        }
    }

    /// Attaches the source audio payload (voice-sourced entries).
    pub fn with_audio(mut self, audio_base64: impl Into<String>) -> Self {
        self.audio_base64 = Some(audio_base64.into());
        self
    }

    /// Populates the lazy reflection text at most once.
    ///
    /// Returns `true` if the reflection was written, `false` if one was
    /// already present (in which case the call is a no-op).
    pub fn attach_reflection(&mut self, text: impl Into<String>) -> bool {
        if self.ai_analysis.is_some() {
            return false;
        }
        self.ai_analysis = Some(text.into());
        true
    }

    /// Case-insensitive substring match across text, every tag, and the
    /// category. An empty query matches every entry.
    pub fn matches_query(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let query = query.to_lowercase();
        self.text.to_lowercase().contains(&query)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&query))
            || self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&query))
    }
}

/// Sorts a collection newest first.
///
/// The sort is stable: entries with equal timestamps keep their relative
/// order across repeated sorts.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by_key(|entry| Reverse(entry.timestamp));
}

/// Returns the entries matching a search query, preserving order.
pub fn filter_entries(entries: &[Entry], query: &str) -> Vec<Entry> {
    entries
        .iter()
        .filter(|entry| entry.matches_query(query))
        .cloned()
        .collect()
}
