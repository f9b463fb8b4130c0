//! Meditation catalog and completion-log storage.
//!
//! # Invariants
//! - Sessions are listed by ascending id.
//! - Completions are append-only and listed in the order they were recorded.
//! - A completion can only reference a known session.

use super::{ensure_tables, RepoError, RepoResult};
use crate::catalog::builtin_sessions;
use crate::model::meditation::{Difficulty, MeditationSession, SessionCompletion, SessionId};
use crate::model::ValidationError;
use rusqlite::{params, Connection, Row};
use std::cell::RefCell;

/// Storage port for the session catalog and the completion log.
pub trait MeditationRepository {
    fn list_sessions(&self) -> RepoResult<Vec<MeditationSession>>;
    fn get_session(&self, id: SessionId) -> RepoResult<Option<MeditationSession>>;
    fn record_completion(&self, completion: &SessionCompletion) -> RepoResult<()>;
    fn list_completions(&self) -> RepoResult<Vec<SessionCompletion>>;
}

impl<T: MeditationRepository + ?Sized> MeditationRepository for &T {
    fn list_sessions(&self) -> RepoResult<Vec<MeditationSession>> {
        (**self).list_sessions()
    }

    fn get_session(&self, id: SessionId) -> RepoResult<Option<MeditationSession>> {
        (**self).get_session(id)
    }

    fn record_completion(&self, completion: &SessionCompletion) -> RepoResult<()> {
        (**self).record_completion(completion)
    }

    fn list_completions(&self) -> RepoResult<Vec<SessionCompletion>> {
        (**self).list_completions()
    }
}

fn validate_completion(completion: &SessionCompletion) -> Result<(), ValidationError> {
    if completion.duration_secs <= 0 {
        return Err(ValidationError::NonPositiveDuration(completion.duration_secs));
    }
    Ok(())
}

/// Process-lifetime catalog plus completion log. Progress is lost with the process.
pub struct InMemoryMeditationRepository {
    sessions: Vec<MeditationSession>,
    completions: RefCell<Vec<SessionCompletion>>,
}

impl InMemoryMeditationRepository {
    pub fn new() -> Self {
        Self::with_sessions(builtin_sessions())
    }

    pub fn with_sessions(mut sessions: Vec<MeditationSession>) -> Self {
        sessions.sort_by_key(|session| session.id);
        Self {
            sessions,
            completions: RefCell::new(Vec::new()),
        }
    }
}

impl Default for InMemoryMeditationRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MeditationRepository for InMemoryMeditationRepository {
    fn list_sessions(&self) -> RepoResult<Vec<MeditationSession>> {
        Ok(self.sessions.clone())
    }

    fn get_session(&self, id: SessionId) -> RepoResult<Option<MeditationSession>> {
        Ok(self.sessions.iter().find(|session| session.id == id).cloned())
    }

    fn record_completion(&self, completion: &SessionCompletion) -> RepoResult<()> {
        validate_completion(completion)?;
        if !self
            .sessions
            .iter()
            .any(|session| session.id == completion.session_id)
        {
            return Err(RepoError::not_found("meditation session", completion.session_id));
        }
        self.completions.borrow_mut().push(completion.clone());
        Ok(())
    }

    fn list_completions(&self) -> RepoResult<Vec<SessionCompletion>> {
        Ok(self.completions.borrow().clone())
    }
}

/// SQLite-backed catalog and completion log.
pub struct SqliteMeditationRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMeditationRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["meditation_sessions", "session_completions"])?;
        Ok(Self { conn })
    }
}

const SESSION_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    duration_secs,
    category,
    difficulty,
    instructor,
    thumbnail,
    audio_url
FROM meditation_sessions";

impl MeditationRepository for SqliteMeditationRepository<'_> {
    fn list_sessions(&self) -> RepoResult<Vec<MeditationSession>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SESSION_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(parse_session_row(row)?);
        }
        Ok(sessions)
    }

    fn get_session(&self, id: SessionId) -> RepoResult<Option<MeditationSession>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SESSION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_session_row(row)?));
        }
        Ok(None)
    }

    fn record_completion(&self, completion: &SessionCompletion) -> RepoResult<()> {
        validate_completion(completion)?;
        if self.get_session(completion.session_id)?.is_none() {
            return Err(RepoError::not_found("meditation session", completion.session_id));
        }
        self.conn.execute(
            "INSERT INTO session_completions (session_id, duration_secs, completed_at)
             VALUES (?1, ?2, ?3);",
            params![
                completion.session_id,
                completion.duration_secs,
                completion.completed_at,
            ],
        )?;
        Ok(())
    }

    fn list_completions(&self) -> RepoResult<Vec<SessionCompletion>> {
        let mut stmt = self.conn.prepare(
            "SELECT session_id, duration_secs, completed_at
             FROM session_completions
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut completions = Vec::new();
        while let Some(row) = rows.next()? {
            completions.push(SessionCompletion {
                session_id: row.get("session_id")?,
                duration_secs: row.get("duration_secs")?,
                completed_at: row.get("completed_at")?,
            });
        }
        Ok(completions)
    }
}

fn parse_session_row(row: &Row<'_>) -> RepoResult<MeditationSession> {
    let difficulty_text: String = row.get("difficulty")?;
    let difficulty = Difficulty::parse(&difficulty_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid difficulty `{difficulty_text}` in meditation_sessions.difficulty"
        ))
    })?;
    Ok(MeditationSession {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        duration_secs: row.get("duration_secs")?,
        category: row.get("category")?,
        difficulty,
        instructor: row.get("instructor")?,
        thumbnail: row.get("thumbnail")?,
        audio_url: row.get("audio_url")?,
    })
}
