//! Meditation catalog and progress records.
//!
//! # Invariants
//! - `duration_secs` is positive for every catalog session.
//! - Progress is never stored; it is derived from the completion log.

use serde::{Deserialize, Serialize};

/// Identifier of a catalog meditation session.
pub type SessionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

/// Guided session catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeditationSession {
    pub id: SessionId,
    pub title: String,
    pub description: String,
    /// Length in seconds.
    pub duration_secs: i64,
    pub category: String,
    pub difficulty: Difficulty,
    pub instructor: String,
    pub thumbnail: String,
    pub audio_url: Option<String>,
}

/// One finished playthrough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCompletion {
    pub session_id: SessionId,
    pub duration_secs: i64,
    pub completed_at: i64,
}

/// Per-session progress view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed_sessions: u32,
    pub total_time_secs: i64,
    pub last_completed: Option<i64>,
}

impl Progress {
    /// Folds one completion into this view.
    pub fn record(&mut self, completion: &SessionCompletion) {
        self.completed_sessions += 1;
        self.total_time_secs += completion.duration_secs;
        self.last_completed = Some(
            self.last_completed
                .map_or(completion.completed_at, |last| last.max(completion.completed_at)),
        );
    }
}

/// Aggregate view across all sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalStats {
    pub total_sessions: u32,
    pub total_minutes: i64,
    pub streak: u32,
}
