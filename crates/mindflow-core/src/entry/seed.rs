//! Starter entries for freshly registered local accounts.

use super::model::{Emotion, Entry};
use chrono::Utc;
use uuid::Uuid;

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Returns the starter collection a new local account is seeded with.
///
/// Timestamps are relative to now so the timeline and streak views have
/// something meaningful to show on first login.
pub fn starter_entries() -> Vec<Entry> {
    let now = Utc::now().timestamp_millis();
    let seed = |hours_ago: i64, text: &str, emotion: Emotion, tags: &[&str], category: &str| Entry {
        id: Uuid::new_v4().to_string(),
        text: text.to_string(),
        timestamp: now - hours_ago * HOUR_MS,
        emotion,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        category: Some(category.to_string()),
        audio_base64: None,
        ai_analysis: None,
    };

    vec![
        seed(
            2,
            "Had a breakthrough on the design project today! The colors finally clicked.",
            Emotion::Excited,
            &["Work", "Design", "Creativity"],
            "Work",
        ),
        seed(
            24,
            "Feeling a bit overwhelmed with the deadlines coming up next week. Need to breathe.",
            Emotion::Anxious,
            &["Work", "Stress"],
            "Work",
        ),
        seed(
            26,
            "Morning coffee in the park. The birds are singing. Total peace.",
            Emotion::Calm,
            &["Life", "Morning", "Nature"],
            "Life",
        ),
        seed(
            30,
            "Why do we always want what we cannot have? It is a strange paradox of human nature.",
            Emotion::Neutral,
            &["Philosophy", "Question"],
            "Philosophy",
        ),
        seed(
            48,
            "Traffic was terrible, made me late for the meeting. So frustrating!",
            Emotion::Angry,
            &["Commute", "Annoyance"],
            "Life",
        ),
        seed(
            52,
            "Family dinner was wonderful. Laughing with everyone made my week.",
            Emotion::Joy,
            &["Family", "Dinner"],
            "Social",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_entries_are_newest_first() {
        let entries = starter_entries();
        assert_eq!(entries.len(), 6);
        for pair in entries.windows(2) {
            assert!(pair[0].timestamp > pair[1].timestamp);
        }
    }

    #[test]
    fn test_starter_entries_have_unique_ids() {
        let entries = starter_entries();
        let mut ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
