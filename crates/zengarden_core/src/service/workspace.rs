//! Page-level state holders for the garden, journal and meditation screens.
//!
//! # Responsibility
//! - Keep what each screen shows (lists, selection, filters, stats).
//! - Route edits through services and fold the results back into state.
//!
//! # Invariants
//! - State changes only after every storage call of an operation succeeded.
//! - A write that reached storage reports success even when the follow-up
//!   gallery reload fails; the stale gallery is kept and the failure logged.
//! - Filtered views are refreshed through a `FilteredView`, so a stale
//!   result never replaces a newer one.

use super::garden_service::{GalleryQuery, GardenService, GardenServiceError};
use super::journal_service::{JournalFilter, JournalService, JournalServiceError};
use super::meditation_service::{MeditationService, MeditationServiceError};
use super::request_gate::FilteredView;
use crate::canvas::Canvas;
use crate::config::CoreConfig;
use crate::model::garden::{CatalogElement, Garden, GardenDraft, GardenId};
use crate::model::journal::{EntryDraft, EntryId, JournalEntry, Mood};
use crate::model::meditation::{
    Difficulty, MeditationSession, Progress, SessionId, TotalStats,
};
use crate::repo::garden_repo::GardenRepository;
use crate::repo::journal_repo::JournalRepository;
use crate::repo::meditation_repo::MeditationRepository;
use std::collections::BTreeMap;

/// Name shown when the first visit finds no saved gardens.
pub const FIRST_GARDEN_NAME: &str = "My Zen Garden";
/// Name shown after starting a fresh garden.
pub const NEW_GARDEN_NAME: &str = "My New Garden";
/// Category tab that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Garden page state.
pub struct GardenWorkspace {
    gardens: Vec<Garden>,
    palette: Vec<CatalogElement>,
    current: Option<Garden>,
    canvas: Canvas,
    garden_name: String,
    gallery_query: GalleryQuery,
    gallery: FilteredView<Garden>,
}

impl GardenWorkspace {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            gardens: Vec::new(),
            palette: Vec::new(),
            current: None,
            canvas: Canvas::new(config.canvas_width, config.canvas_height),
            garden_name: FIRST_GARDEN_NAME.to_string(),
            gallery_query: GalleryQuery::default(),
            gallery: FilteredView::new(),
        }
    }

    pub fn gardens(&self) -> &[Garden] {
        &self.gardens
    }

    pub fn palette(&self) -> &[CatalogElement] {
        &self.palette
    }

    pub fn current(&self) -> Option<&Garden> {
        self.current.as_ref()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn garden_name(&self) -> &str {
        &self.garden_name
    }

    pub fn set_garden_name(&mut self, name: impl Into<String>) {
        self.garden_name = name.into();
    }

    pub fn gallery(&self) -> &[Garden] {
        self.gallery.items()
    }

    pub fn gallery_query(&self) -> &GalleryQuery {
        &self.gallery_query
    }

    /// Loads gardens and palette, opening the most recent garden if any.
    pub fn load_initial<R: GardenRepository>(
        &mut self,
        service: &GardenService<R>,
    ) -> Result<(), GardenServiceError> {
        let gardens = service.get_all()?;
        let palette = service.get_elements()?;

        match gardens.first() {
            Some(first) => self.open(first.clone()),
            None => {
                self.current = None;
                self.canvas.clear();
                self.garden_name = FIRST_GARDEN_NAME.to_string();
            }
        }
        self.gardens = gardens;
        self.palette = palette;
        Ok(())
    }

    /// Starts an unsaved garden on an empty canvas.
    pub fn new_garden(&mut self) {
        self.current = None;
        self.canvas.clear();
        self.garden_name = NEW_GARDEN_NAME.to_string();
    }

    /// Opens a stored garden on the canvas.
    pub fn load_garden<R: GardenRepository>(
        &mut self,
        service: &GardenService<R>,
        id: GardenId,
    ) -> Result<(), GardenServiceError> {
        let garden = service.get_by_id(id)?;
        self.open(garden);
        Ok(())
    }

    /// Saves the canvas. An open personal garden is updated in place;
    /// anything else (nothing open, or a template) becomes a new garden.
    pub fn save<R: GardenRepository>(
        &mut self,
        service: &GardenService<R>,
    ) -> Result<Garden, GardenServiceError> {
        let elements = self.canvas.elements().to_vec();
        let mut draft = GardenDraft::new(self.garden_name.trim(), elements);
        draft.description = format!("A peaceful garden with {} elements", draft.elements.len());

        let editable = self
            .current
            .as_ref()
            .filter(|garden| !garden.is_template)
            .map(|garden| garden.id);
        let saved = match editable {
            Some(id) => {
                let saved = service.update(id, draft)?;
                if let Some(slot) = self.gardens.iter_mut().find(|garden| garden.id == id) {
                    *slot = saved.clone();
                }
                saved
            }
            None => {
                let saved = service.create(draft)?;
                self.gardens.insert(0, saved.clone());
                saved
            }
        };
        self.current = Some(saved.clone());
        Ok(saved)
    }

    pub fn duplicate<R: GardenRepository>(
        &mut self,
        service: &GardenService<R>,
        id: GardenId,
    ) -> Result<Garden, GardenServiceError> {
        let copy = service.duplicate(id)?;
        self.gardens.insert(0, copy.clone());
        self.reload_gallery_after_write(service, "duplicate");
        Ok(copy)
    }

    /// Deletes `id`. Deleting the open garden detaches the canvas, so the
    /// next save creates a new garden.
    pub fn delete<R: GardenRepository>(
        &mut self,
        service: &GardenService<R>,
        id: GardenId,
    ) -> Result<(), GardenServiceError> {
        service.delete(id)?;
        self.gardens.retain(|garden| garden.id != id);
        if self.current.as_ref().is_some_and(|garden| garden.id == id) {
            self.current = None;
        }
        self.reload_gallery_after_write(service, "delete");
        Ok(())
    }

    /// Changes gallery parameters and reloads the gallery.
    pub fn set_gallery_query<R: GardenRepository>(
        &mut self,
        service: &GardenService<R>,
        query: GalleryQuery,
    ) -> Result<(), GardenServiceError> {
        self.gallery_query = query;
        self.refresh_gallery(service)
    }

    pub fn refresh_gallery<R: GardenRepository>(
        &mut self,
        service: &GardenService<R>,
    ) -> Result<(), GardenServiceError> {
        let token = self.gallery.issue();
        let results = service.gallery(&self.gallery_query)?;
        self.gallery.resolve(token, results);
        Ok(())
    }

    fn reload_gallery_after_write<R: GardenRepository>(
        &mut self,
        service: &GardenService<R>,
        operation: &'static str,
    ) {
        if let Err(err) = self.refresh_gallery(service) {
            log::warn!(
                "event=gallery_refresh module=workspace status=error operation={operation} error={err}"
            );
        }
    }

    fn open(&mut self, garden: Garden) {
        self.canvas.replace_elements(garden.elements.clone());
        self.garden_name = garden.name.clone();
        self.current = Some(garden);
    }
}

/// Journal page state.
pub struct JournalWorkspace {
    entries: Vec<JournalEntry>,
    filter: JournalFilter,
    view: FilteredView<JournalEntry>,
    mood_stats: BTreeMap<Mood, usize>,
    stats_days: u32,
}

impl JournalWorkspace {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            entries: Vec::new(),
            filter: JournalFilter::default(),
            view: FilteredView::new(),
            mood_stats: BTreeMap::new(),
            stats_days: config.mood_stats_days,
        }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn filtered(&self) -> &[JournalEntry] {
        self.view.items()
    }

    pub fn filter(&self) -> &JournalFilter {
        &self.filter
    }

    pub fn mood_stats(&self) -> &BTreeMap<Mood, usize> {
        &self.mood_stats
    }

    pub fn total_words(&self) -> usize {
        super::journal_service::total_words(&self.entries)
    }

    pub fn load<R: JournalRepository>(
        &mut self,
        service: &JournalService<R>,
    ) -> Result<(), JournalServiceError> {
        let entries = service.get_all()?;
        let stats = service.get_mood_stats(self.stats_days)?;
        self.entries = entries;
        self.mood_stats = stats;
        self.refresh_view(service)
    }

    pub fn set_filter<R: JournalRepository>(
        &mut self,
        service: &JournalService<R>,
        filter: JournalFilter,
    ) -> Result<(), JournalServiceError> {
        self.filter = filter;
        self.refresh_view(service)
    }

    /// Creates an entry, or replaces `existing` when given.
    pub fn save_entry<R: JournalRepository>(
        &mut self,
        service: &JournalService<R>,
        existing: Option<EntryId>,
        draft: EntryDraft,
    ) -> Result<JournalEntry, JournalServiceError> {
        let saved = match existing {
            Some(id) => service.update(id, draft)?,
            None => service.create(draft)?,
        };
        let stats = service.get_mood_stats(self.stats_days)?;

        match self.entries.iter_mut().find(|entry| entry.id == saved.id) {
            Some(slot) => *slot = saved.clone(),
            None => self.entries.insert(0, saved.clone()),
        }
        self.mood_stats = stats;
        self.refresh_view(service)?;
        Ok(saved)
    }

    pub fn delete_entry<R: JournalRepository>(
        &mut self,
        service: &JournalService<R>,
        id: EntryId,
    ) -> Result<(), JournalServiceError> {
        service.delete(id)?;
        let stats = service.get_mood_stats(self.stats_days)?;
        self.entries.retain(|entry| entry.id != id);
        self.mood_stats = stats;
        self.refresh_view(service)
    }

    fn refresh_view<R: JournalRepository>(
        &mut self,
        service: &JournalService<R>,
    ) -> Result<(), JournalServiceError> {
        let token = self.view.issue();
        let filtered = if self.filter.is_empty() {
            self.entries.clone()
        } else {
            service.filter_entries(&self.entries, &self.filter)?
        };
        self.view.resolve(token, filtered);
        Ok(())
    }
}

/// Meditation page state.
pub struct MeditationWorkspace {
    sessions: Vec<MeditationSession>,
    active_category: String,
    difficulty: Option<Difficulty>,
    stats: TotalStats,
    favorites: Vec<MeditationSession>,
    favorites_limit: usize,
}

impl MeditationWorkspace {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            sessions: Vec::new(),
            active_category: ALL_CATEGORIES.to_string(),
            difficulty: None,
            stats: TotalStats::default(),
            favorites: Vec::new(),
            favorites_limit: config.favorites_limit,
        }
    }

    pub fn sessions(&self) -> &[MeditationSession] {
        &self.sessions
    }

    pub fn stats(&self) -> &TotalStats {
        &self.stats
    }

    pub fn favorites(&self) -> &[MeditationSession] {
        &self.favorites
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn load<R: MeditationRepository>(
        &mut self,
        service: &MeditationService<R>,
    ) -> Result<(), MeditationServiceError> {
        let sessions = service.get_all()?;
        let stats = service.get_total_stats()?;
        let favorites = service.get_favorites(self.favorites_limit)?;
        self.sessions = sessions;
        self.stats = stats;
        self.favorites = favorites;
        Ok(())
    }

    /// Selects a category tab; `"All"` shows every session.
    pub fn set_category(&mut self, category: impl Into<String>) {
        self.active_category = category.into();
    }

    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) {
        self.difficulty = difficulty;
    }

    /// Sessions matching the active category and difficulty.
    pub fn visible_sessions(&self) -> Vec<&MeditationSession> {
        self.sessions
            .iter()
            .filter(|session| {
                self.active_category == ALL_CATEGORIES || session.category == self.active_category
            })
            .filter(|session| self.difficulty.is_none() || self.difficulty == Some(session.difficulty))
            .collect()
    }

    /// Records a finished playthrough and refreshes the totals.
    pub fn complete_session<R: MeditationRepository>(
        &mut self,
        service: &MeditationService<R>,
        id: SessionId,
        duration_secs: i64,
    ) -> Result<Progress, MeditationServiceError> {
        let progress = service.update_progress(id, duration_secs)?;
        let stats = service.get_total_stats()?;
        self.stats = stats;
        Ok(progress)
    }

    /// Pins or unpins a session locally. Returns whether it is now pinned.
    pub fn toggle_favorite(&mut self, session: &MeditationSession) -> bool {
        if let Some(index) = self.favorites.iter().position(|fav| fav.id == session.id) {
            self.favorites.remove(index);
            false
        } else {
            self.favorites.push(session.clone());
            true
        }
    }
}
