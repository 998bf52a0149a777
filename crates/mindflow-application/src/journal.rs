//! Journal use cases.
//!
//! The layer the presentation calls. Captures run the analysis gateway and
//! absorb its failures with the fixed fallback annotation; every mutation
//! funnels into [`SyncCoordinator::mutate`] so the optimistic write
//! discipline applies uniformly.

use crate::sync::SyncCoordinator;
use chrono::Local;
use mindflow_core::{
    AnalysisInput, AnalysisService, Emotion, Entry, EntryAnnotation, MindflowError, Result,
    filter_entries,
    stats::{current_streak, daily_activity, emotion_distribution, tag_frequencies, top_emotion},
};
use std::sync::Arc;

/// Days shown in the activity line.
const ACTIVITY_WINDOW_DAYS: u32 = 7;

/// Aggregated read model for the stats view.
#[derive(Debug)]
pub struct JournalStats {
    pub total_entries: usize,
    pub streak: u32,
    pub emotion_distribution: Vec<(Emotion, usize)>,
    pub top_emotion: Option<(Emotion, usize)>,
    /// Entry counts for the trailing week, oldest day first.
    pub daily_activity: Vec<(chrono::NaiveDate, usize)>,
    pub tag_frequencies: Vec<(String, usize)>,
}

/// Journaling use cases on top of the sync coordinator.
pub struct JournalService {
    coordinator: Arc<SyncCoordinator>,
    analysis: Arc<dyn AnalysisService>,
}

impl JournalService {
    pub fn new(coordinator: Arc<SyncCoordinator>, analysis: Arc<dyn AnalysisService>) -> Self {
        Self {
            coordinator,
            analysis,
        }
    }

    pub fn coordinator(&self) -> &Arc<SyncCoordinator> {
        &self.coordinator
    }

    /// Captures a voice entry.
    ///
    /// The audio payload is kept on the entry whether or not annotation
    /// succeeds; an analysis failure degrades to the fallback annotation.
    pub async fn capture_voice(
        &self,
        audio_base64: String,
        mime_type: String,
        language: &str,
    ) -> Result<Entry> {
        let input = AnalysisInput::Audio {
            base64: audio_base64.clone(),
            mime_type,
        };
        let annotation = self.annotate_or_fallback(input, None, language).await;

        let entry = Entry::new(
            annotation.transcript,
            annotation.emotion,
            annotation.tags,
            Some(annotation.category),
        )
        .with_audio(audio_base64);

        self.prepend(entry).await
    }

    /// Captures a typed entry through the same annotation path.
    pub async fn capture_text(&self, text: String, language: &str) -> Result<Entry> {
        let input = AnalysisInput::Text {
            content: text.clone(),
        };
        let mut annotation = self.annotate_or_fallback(input, Some(&text), language).await;
        if annotation.transcript.trim().is_empty() {
            annotation.transcript = text;
        }

        let entry = Entry::new(
            annotation.transcript,
            annotation.emotion,
            annotation.tags,
            Some(annotation.category),
        );

        self.prepend(entry).await
    }

    async fn annotate_or_fallback(
        &self,
        input: AnalysisInput,
        source_text: Option<&str>,
        language: &str,
    ) -> EntryAnnotation {
        match self.analysis.annotate(input, language).await {
            Ok(annotation) => annotation,
            Err(e) => {
                tracing::warn!("Annotation failed, using fallback: {}", e);
                EntryAnnotation::fallback(source_text)
            }
        }
    }

    async fn prepend(&self, entry: Entry) -> Result<Entry> {
        let mut collection = self.coordinator.entries().await;
        collection.insert(0, entry.clone());
        self.coordinator.mutate(collection).await?;
        Ok(entry)
    }

    /// Applies an edit (e.g. an emotion override) to one entry.
    pub async fn update_entry<F>(&self, id: &str, f: F) -> Result<Entry>
    where
        F: FnOnce(&mut Entry),
    {
        let mut collection = self.coordinator.entries().await;
        let entry = collection
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| MindflowError::not_found("entry", id))?;
        f(entry);
        let updated = entry.clone();
        self.coordinator.mutate(collection).await?;
        Ok(updated)
    }

    /// Deletes a batch of entries by id.
    pub async fn delete_entries(&self, ids: &[String]) -> Result<()> {
        let mut collection = self.coordinator.entries().await;
        collection.retain(|entry| !ids.contains(&entry.id));
        self.coordinator.mutate(collection).await
    }

    /// Lazily generates the reflection for an entry, at most once.
    ///
    /// An already-populated entry returns its stored text without a gateway
    /// call. This is the one place an analysis failure surfaces to the
    /// caller, since there is nothing to fall back to.
    pub async fn generate_reflection(&self, id: &str, language: &str) -> Result<String> {
        let mut collection = self.coordinator.entries().await;
        let entry = collection
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or_else(|| MindflowError::not_found("entry", id))?;

        if let Some(existing) = &entry.ai_analysis {
            return Ok(existing.clone());
        }

        let reflection = self.analysis.reflect(&entry.text, language).await?;
        entry.attach_reflection(reflection.clone());
        self.coordinator.mutate(collection).await?;
        Ok(reflection)
    }

    /// Case-insensitive search over the active collection.
    pub async fn search(&self, query: &str) -> Vec<Entry> {
        filter_entries(&self.coordinator.entries().await, query)
    }

    /// The current journaling streak in days.
    pub async fn streak(&self) -> u32 {
        current_streak(&self.coordinator.entries().await)
    }

    /// The aggregated stats view.
    pub async fn stats(&self) -> JournalStats {
        let entries = self.coordinator.entries().await;
        let today = Local::now().date_naive();
        JournalStats {
            total_entries: entries.len(),
            streak: current_streak(&entries),
            emotion_distribution: emotion_distribution(&entries),
            top_emotion: top_emotion(&entries),
            daily_activity: daily_activity(&entries, today, ACTIVITY_WINDOW_DAYS),
            tag_frequencies: tag_frequencies(&entries),
        }
    }
}
