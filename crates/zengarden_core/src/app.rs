//! Composition root wiring services to one storage backend.
//!
//! # Responsibility
//! - Build the four services over either in-memory or SQLite repositories.
//! - Apply configuration (clock, calendar offset, sound settings).
//!
//! # Invariants
//! - All services share one clock.
//! - A SQLite-backed app only starts on a migrated, catalog-seeded connection.

use crate::clock::{Clock, SystemClock};
use crate::config::CoreConfig;
use crate::db::seed_builtin_catalog;
use crate::repo::garden_repo::{GardenRepository, InMemoryGardenRepository, SqliteGardenRepository};
use crate::repo::journal_repo::{
    InMemoryJournalRepository, JournalRepository, SqliteJournalRepository,
};
use crate::repo::meditation_repo::{
    InMemoryMeditationRepository, MeditationRepository, SqliteMeditationRepository,
};
use crate::repo::sound_repo::{InMemorySoundRepository, SoundRepository, SqliteSoundRepository};
use crate::repo::RepoResult;
use crate::service::garden_service::GardenService;
use crate::service::journal_service::JournalService;
use crate::service::meditation_service::MeditationService;
use crate::service::sound_service::SoundService;
use crate::service::workspace::{GardenWorkspace, JournalWorkspace, MeditationWorkspace};
use rusqlite::Connection;
use std::sync::Arc;

/// Services of one running app instance.
pub struct WellnessApp<G, J, M, S>
where
    G: GardenRepository,
    J: JournalRepository,
    M: MeditationRepository,
    S: SoundRepository,
{
    pub gardens: GardenService<G>,
    pub journal: JournalService<J>,
    pub meditation: MeditationService<M>,
    pub sounds: SoundService<S>,
    config: CoreConfig,
}

pub type InMemoryApp = WellnessApp<
    InMemoryGardenRepository,
    InMemoryJournalRepository,
    InMemoryMeditationRepository,
    InMemorySoundRepository,
>;

pub type SqliteApp<'conn> = WellnessApp<
    SqliteGardenRepository<'conn>,
    SqliteJournalRepository<'conn>,
    SqliteMeditationRepository<'conn>,
    SqliteSoundRepository<'conn>,
>;

impl<G, J, M, S> WellnessApp<G, J, M, S>
where
    G: GardenRepository,
    J: JournalRepository,
    M: MeditationRepository,
    S: SoundRepository,
{
    /// Wires services over the given repositories.
    pub fn with_repositories(
        gardens: G,
        journal: J,
        meditation: M,
        sounds: S,
        config: CoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let offset = config.utc_offset_minutes;
        Self {
            gardens: GardenService::with_clock(gardens, clock.clone()),
            journal: JournalService::with_clock(journal, clock.clone()).with_utc_offset(offset),
            meditation: MeditationService::with_clock(meditation, clock.clone())
                .with_utc_offset(offset),
            sounds: SoundService::with_clock(sounds, clock)
                .with_settings(config.default_volume, config.favorite_sounds_limit),
            config,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn garden_workspace(&self) -> GardenWorkspace {
        GardenWorkspace::new(&self.config)
    }

    pub fn journal_workspace(&self) -> JournalWorkspace {
        JournalWorkspace::new(&self.config)
    }

    pub fn meditation_workspace(&self) -> MeditationWorkspace {
        MeditationWorkspace::new(&self.config)
    }
}

impl InMemoryApp {
    /// Process-lifetime app with builtin catalogs.
    pub fn in_memory(config: CoreConfig) -> Self {
        Self::in_memory_with_clock(config, Arc::new(SystemClock))
    }

    pub fn in_memory_with_clock(config: CoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_repositories(
            InMemoryGardenRepository::new(),
            InMemoryJournalRepository::new(),
            InMemoryMeditationRepository::new(),
            InMemorySoundRepository::new(),
            config,
            clock,
        )
    }
}

impl<'conn> SqliteApp<'conn> {
    /// App over a migrated connection. Seeds empty catalog tables first.
    pub fn sqlite(conn: &'conn Connection, config: CoreConfig) -> RepoResult<Self> {
        Self::sqlite_with_clock(conn, config, Arc::new(SystemClock))
    }

    pub fn sqlite_with_clock(
        conn: &'conn Connection,
        config: CoreConfig,
        clock: Arc<dyn Clock>,
    ) -> RepoResult<Self> {
        seed_builtin_catalog(conn)?;
        Ok(Self::with_repositories(
            SqliteGardenRepository::try_new(conn)?,
            SqliteJournalRepository::try_new(conn)?,
            SqliteMeditationRepository::try_new(conn)?,
            SqliteSoundRepository::try_new(conn)?,
            config,
            clock,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_db_in_memory;

    #[test]
    fn in_memory_app_applies_sound_settings() {
        let config = CoreConfig {
            default_volume: 0.25,
            favorite_sounds_limit: 2,
            ..CoreConfig::default()
        };
        let app = WellnessApp::in_memory(config);
        assert_eq!(app.sounds.volume(), 0.25);
        assert_eq!(app.sounds.get_favorites().unwrap().len(), 2);
    }

    #[test]
    fn sqlite_app_seeds_catalog_once() {
        let conn = open_db_in_memory().unwrap();
        {
            let app = WellnessApp::sqlite(&conn, CoreConfig::default()).unwrap();
            assert_eq!(app.meditation.get_all().unwrap().len(), 5);
        }
        let app = WellnessApp::sqlite(&conn, CoreConfig::default()).unwrap();
        assert_eq!(app.gardens.get_elements().unwrap().len(), 7);
        assert_eq!(app.sounds.get_all().unwrap().len(), 6);
    }
}
