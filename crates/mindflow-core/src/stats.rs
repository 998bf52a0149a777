//! Derived read-model computations over an entry collection.
//!
//! Everything here is a pure function over a slice of entries; nothing is
//! persisted. The streak and activity views bucket timestamps by local
//! calendar day, matching what the user sees.

use crate::entry::{Emotion, Entry};
use chrono::{DateTime, Days, Local, NaiveDate};
use std::collections::{HashMap, HashSet};
use strum::IntoEnumIterator;

fn local_day(timestamp_ms: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|utc| utc.with_timezone(&Local).date_naive())
}

/// Counts consecutive journaled days ending at `today` or `today - 1`.
///
/// A streak is alive if its most recent day is today or yesterday; a last
/// entry two or more days old yields zero. Multiple entries on one day count
/// once.
pub fn day_streak(entries: &[Entry], today: NaiveDate) -> u32 {
    let days: HashSet<NaiveDate> = entries
        .iter()
        .filter_map(|entry| local_day(entry.timestamp))
        .collect();

    let mut anchor = if days.contains(&today) {
        today
    } else if days.contains(&(today - Days::new(1))) {
        today - Days::new(1)
    } else {
        return 0;
    };

    let mut streak = 0;
    while days.contains(&anchor) {
        streak += 1;
        anchor = anchor - Days::new(1);
    }
    streak
}

/// [`day_streak`] anchored at the current local date.
pub fn current_streak(entries: &[Entry]) -> u32 {
    day_streak(entries, Local::now().date_naive())
}

/// Entry count per emotion, one slot per label in declaration order.
pub fn emotion_distribution(entries: &[Entry]) -> Vec<(Emotion, usize)> {
    let mut counts: HashMap<Emotion, usize> = HashMap::new();
    for entry in entries {
        *counts.entry(entry.emotion).or_insert(0) += 1;
    }
    Emotion::iter()
        .map(|emotion| (emotion, counts.get(&emotion).copied().unwrap_or(0)))
        .collect()
}

/// The most frequent emotion, if any entries exist.
///
/// Ties break toward the label declared first in the emotion set.
pub fn top_emotion(entries: &[Entry]) -> Option<(Emotion, usize)> {
    emotion_distribution(entries)
        .into_iter()
        .filter(|&(_, count)| count > 0)
        .rev()
        .max_by_key(|&(_, count)| count)
}

/// Entry counts for the trailing `days`-day window ending at `today`,
/// oldest day first. Days without entries are present with a zero count.
pub fn daily_activity(entries: &[Entry], today: NaiveDate, days: u32) -> Vec<(NaiveDate, usize)> {
    let mut counts: HashMap<NaiveDate, usize> = HashMap::new();
    for entry in entries {
        if let Some(day) = local_day(entry.timestamp) {
            *counts.entry(day).or_insert(0) += 1;
        }
    }
    (0..days)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset as u64)))
        .map(|day| (day, counts.get(&day).copied().unwrap_or(0)))
        .collect()
}

/// Lowercased tag usage counts, most used first; ties sort alphabetically.
pub fn tag_frequencies(entries: &[Entry]) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        for tag in &entry.tags {
            *counts.entry(tag.to_lowercase()).or_insert(0) += 1;
        }
    }
    let mut frequencies: Vec<(String, usize)> = counts.into_iter().collect();
    frequencies.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    frequencies
}
