//! Journal entry model.
//!
//! # Invariants
//! - `tags` are trimmed, lowercase and unique; first occurrence order is kept.
//! - `title` is never blank once persisted.

use super::garden::GardenId;
use super::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a journal entry.
pub type EntryId = Uuid;

/// Title used when the writer leaves it blank.
pub const UNTITLED_ENTRY: &str = "Untitled Entry";

/// Fixed set of moods an entry can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Peaceful,
    Reflective,
    Inspired,
    Centered,
    Grateful,
    Anxious,
    Calm,
    Energetic,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Peaceful,
        Mood::Reflective,
        Mood::Inspired,
        Mood::Centered,
        Mood::Grateful,
        Mood::Anxious,
        Mood::Calm,
        Mood::Energetic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Peaceful => "peaceful",
            Self::Reflective => "reflective",
            Self::Inspired => "inspired",
            Self::Centered => "centered",
            Self::Grateful => "grateful",
            Self::Anxious => "anxious",
            Self::Calm => "calm",
            Self::Energetic => "energetic",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(value.trim()))
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Peaceful => "Peaceful",
            Self::Reflective => "Reflective",
            Self::Inspired => "Inspired",
            Self::Centered => "Centered",
            Self::Grateful => "Grateful",
            Self::Anxious => "Anxious",
            Self::Calm => "Calm",
            Self::Energetic => "Energetic",
        }
    }
}

/// Persisted journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    pub id: EntryId,
    pub title: String,
    pub content: String,
    pub mood: Option<Mood>,
    pub tags: Vec<String>,
    /// Day the entry is about, epoch milliseconds.
    pub date: i64,
    /// Garden the writer had open, if any.
    pub garden_used: Option<GardenId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl JournalEntry {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankField("title"));
        }
        for tag in &self.tags {
            if tag.trim().is_empty() {
                return Err(ValidationError::BlankField("tags"));
            }
        }
        Ok(())
    }
}

/// Editor input for creating or replacing an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryDraft {
    pub title: String,
    pub content: String,
    pub mood: Option<Mood>,
    pub tags: Vec<String>,
    /// Defaults to "now" on create and to the stored date on update.
    pub date: Option<i64>,
    pub garden_used: Option<GardenId>,
}

/// Normalizes one tag value: trimmed and lowercase, `None` when blank.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes and deduplicates tags, keeping first-seen order.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if let Some(value) = normalize_tag(tag) {
            if !unique.contains(&value) {
                unique.push(value);
            }
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::{normalize_tags, Mood};

    #[test]
    fn tags_are_lowercased_and_deduplicated_in_order() {
        let tags = vec![
            "Morning".to_string(),
            " gratitude ".to_string(),
            "MORNING".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(
            normalize_tags(&tags),
            vec!["morning".to_string(), "gratitude".to_string()]
        );
    }

    #[test]
    fn mood_parses_case_insensitively() {
        assert_eq!(Mood::parse("Calm"), Some(Mood::Calm));
        assert_eq!(Mood::parse(" GRATEFUL "), Some(Mood::Grateful));
        assert_eq!(Mood::parse("sleepy"), None);
    }

    #[test]
    fn mood_serializes_as_lowercase() {
        assert_eq!(serde_json::to_string(&Mood::Peaceful).unwrap(), "\"peaceful\"");
    }
}
