//! Meditation use-case service.
//!
//! # Responsibility
//! - Serve the session catalog and its categories.
//! - Record completions and derive progress, totals, streak and favorites
//!   from the completion log.
//!
//! # Invariants
//! - Progress is derived, never stored; every backend replays the same log.
//! - Streak walks each session's last completion, newest first, and counts
//!   consecutive calendar days ending today.

use crate::clock::{calendar_day, fixed_offset, Clock, SystemClock};
use crate::model::meditation::{
    MeditationSession, Progress, SessionCompletion, SessionId, TotalStats,
};
use crate::model::ValidationError;
use crate::repo::meditation_repo::MeditationRepository;
use crate::repo::RepoError;
use chrono::FixedOffset;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Default number of favorite sessions.
pub const DEFAULT_FAVORITES_LIMIT: usize = 3;

/// Service error for meditation use-cases.
#[derive(Debug)]
pub enum MeditationServiceError {
    SessionNotFound(SessionId),
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for MeditationServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SessionNotFound(id) => write!(f, "meditation session not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MeditationServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::SessionNotFound(_) => None,
        }
    }
}

impl From<RepoError> for MeditationServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Meditation service facade over repository implementations.
pub struct MeditationService<R: MeditationRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl<R: MeditationRepository> MeditationService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            offset: fixed_offset(0),
        }
    }

    /// Sets the UTC offset used to cut calendar days for the streak.
    pub fn with_utc_offset(mut self, utc_offset_minutes: i32) -> Self {
        self.offset = fixed_offset(utc_offset_minutes);
        self
    }

    pub fn get_all(&self) -> Result<Vec<MeditationSession>, MeditationServiceError> {
        Ok(self.repo.list_sessions()?)
    }

    pub fn get_by_id(&self, id: SessionId) -> Result<MeditationSession, MeditationServiceError> {
        self.repo
            .get_session(id)?
            .ok_or(MeditationServiceError::SessionNotFound(id))
    }

    /// Sessions whose category equals `category`, case-insensitively.
    pub fn get_by_category(
        &self,
        category: &str,
    ) -> Result<Vec<MeditationSession>, MeditationServiceError> {
        let mut sessions = self.repo.list_sessions()?;
        sessions.retain(|session| session.category.eq_ignore_ascii_case(category.trim()));
        Ok(sessions)
    }

    /// Distinct categories in catalog order.
    pub fn categories(&self) -> Result<Vec<String>, MeditationServiceError> {
        let mut categories: Vec<String> = Vec::new();
        for session in self.repo.list_sessions()? {
            if !categories.contains(&session.category) {
                categories.push(session.category);
            }
        }
        Ok(categories)
    }

    /// Progress for one session; zeroed when it was never completed.
    pub fn get_progress(&self, id: SessionId) -> Result<Progress, MeditationServiceError> {
        Ok(self.progress_by_session()?.remove(&id).unwrap_or_default())
    }

    /// Appends a completion of `duration_secs` stamped now.
    pub fn update_progress(
        &self,
        id: SessionId,
        duration_secs: i64,
    ) -> Result<Progress, MeditationServiceError> {
        let completion = SessionCompletion {
            session_id: id,
            duration_secs,
            completed_at: self.clock.now_ms(),
        };
        self.repo.record_completion(&completion).map_err(|err| {
            log::error!(
                "event=meditation_complete module=service status=error session_id={id} error={err}"
            );
            if err.is_not_found() {
                MeditationServiceError::SessionNotFound(id)
            } else {
                err.into()
            }
        })?;
        log::info!(
            "event=meditation_complete module=service status=ok session_id={id} duration_secs={duration_secs}"
        );
        self.get_progress(id)
    }

    pub fn get_total_stats(&self) -> Result<TotalStats, MeditationServiceError> {
        let progress = self.progress_by_session()?;
        let total_sessions = progress.values().map(|p| p.completed_sessions).sum();
        let total_minutes = progress
            .values()
            .map(|p| rounded_minutes(p.total_time_secs))
            .sum();
        Ok(TotalStats {
            total_sessions,
            total_minutes,
            streak: self.streak_from(&progress),
        })
    }

    pub fn calculate_streak(&self) -> Result<u32, MeditationServiceError> {
        let progress = self.progress_by_session()?;
        Ok(self.streak_from(&progress))
    }

    /// Most completed sessions, ties broken by id, at most `limit`.
    pub fn get_favorites(
        &self,
        limit: usize,
    ) -> Result<Vec<MeditationSession>, MeditationServiceError> {
        let mut ranked: Vec<(SessionId, u32)> = self
            .progress_by_session()?
            .into_iter()
            .filter(|(_, progress)| progress.completed_sessions > 0)
            .map(|(id, progress)| (id, progress.completed_sessions))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(limit);

        let mut favorites = Vec::with_capacity(ranked.len());
        for (id, _) in ranked {
            match self.repo.get_session(id)? {
                Some(session) => favorites.push(session),
                None => log::warn!(
                    "event=meditation_favorites module=service status=skip session_id={id}"
                ),
            }
        }
        Ok(favorites)
    }

    fn progress_by_session(&self) -> Result<BTreeMap<SessionId, Progress>, MeditationServiceError> {
        let mut progress: BTreeMap<SessionId, Progress> = BTreeMap::new();
        for completion in self.repo.list_completions()? {
            progress
                .entry(completion.session_id)
                .or_default()
                .record(&completion);
        }
        Ok(progress)
    }

    fn streak_from(&self, progress: &BTreeMap<SessionId, Progress>) -> u32 {
        let Some(today) = calendar_day(self.clock.now_ms(), self.offset) else {
            return 0;
        };
        let mut last_completions: Vec<i64> = progress
            .values()
            .filter_map(|p| p.last_completed)
            .collect();
        last_completions.sort_unstable_by(|a, b| b.cmp(a));

        let mut streak: u32 = 0;
        for completed_at in last_completions {
            let Some(day) = calendar_day(completed_at, self.offset) else {
                break;
            };
            if (today - day).num_days() == i64::from(streak) {
                streak += 1;
            } else {
                break;
            }
        }
        streak
    }
}

/// Seconds to whole minutes, halves rounded up.
fn rounded_minutes(total_secs: i64) -> i64 {
    (total_secs + 30).div_euclid(60)
}
