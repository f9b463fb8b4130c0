//! Core domain logic for the zen garden wellness app.
//! Garden builder, meditation player and mood journal over storage ports.

pub mod app;
pub mod canvas;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod playback;
pub mod repo;
pub mod route;
pub mod service;

pub use app::{InMemoryApp, SqliteApp, WellnessApp};
pub use canvas::{Canvas, CanvasError, DragOutcome, Ripple};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use logging::{
    default_log_level, init_from_config, init_logging, logging_status, LoggingError, LoggingStatus,
};
pub use model::garden::{Garden, GardenDraft, GardenId, PlacedElement};
pub use model::journal::{EntryDraft, EntryId, JournalEntry, Mood};
pub use model::meditation::{MeditationSession, Progress, SessionId, TotalStats};
pub use model::sound::{AmbientSound, PlaybackState, SoundId, SoundMix};
pub use model::ValidationError;
pub use playback::{format_clock, PlayerEvent, SessionPlayer};
pub use repo::{RepoError, RepoResult};
pub use route::Route;
pub use service::garden_service::{
    GalleryCategory, GalleryQuery, GallerySort, GardenExport, GardenImport, GardenService,
    GardenServiceError, SortDirection, SortField,
};
pub use service::journal_service::{JournalFilter, JournalService, JournalServiceError, YearMonth};
pub use service::meditation_service::{MeditationService, MeditationServiceError};
pub use service::request_gate::{FilteredView, RequestGate, RequestToken};
pub use service::sound_service::{SoundService, SoundServiceError};
pub use service::workspace::{GardenWorkspace, JournalWorkspace, MeditationWorkspace};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
