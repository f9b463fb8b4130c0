//! Ambient sound use-case service.
//!
//! # Responsibility
//! - Serve the ambient sound catalog.
//! - Track the single playing sound and the global volume.
//! - Build ad-hoc mixes from catalog ids.
//!
//! # Invariants
//! - At most one sound is playing at a time.
//! - Volume always lies in `[0, 1]`.

use crate::clock::{Clock, SystemClock};
use crate::model::sound::{AmbientSound, PlaybackState, SoundId, SoundMix};
use crate::repo::sound_repo::SoundRepository;
use crate::repo::RepoError;
use std::cell::Cell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Volume used before the listener changes it.
pub const DEFAULT_VOLUME: f32 = 0.7;

/// Default number of popular sounds surfaced as favorites.
pub const DEFAULT_FAVORITE_SOUNDS: usize = 4;

/// Service error for ambient sound use-cases.
#[derive(Debug)]
pub enum SoundServiceError {
    SoundNotFound(SoundId),
    /// None of the requested ids exist in the catalog.
    EmptyMix,
    /// Volume is not a number.
    InvalidVolume(f32),
    Repo(RepoError),
}

impl Display for SoundServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SoundNotFound(id) => write!(f, "sound not found: {id}"),
            Self::EmptyMix => write!(f, "no valid sounds for mix"),
            Self::InvalidVolume(value) => write!(f, "invalid volume {value}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SoundServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SoundServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Sound service facade with process-lifetime playback state.
pub struct SoundService<R: SoundRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    playing: Cell<Option<SoundId>>,
    volume: Cell<f32>,
    favorites_limit: usize,
}

impl<R: SoundRepository> SoundService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            clock,
            playing: Cell::new(None),
            volume: Cell::new(DEFAULT_VOLUME),
            favorites_limit: DEFAULT_FAVORITE_SOUNDS,
        }
    }

    /// Overrides the initial volume (clamped) and the favorites size.
    pub fn with_settings(mut self, initial_volume: f32, favorites_limit: usize) -> Self {
        if !initial_volume.is_nan() {
            self.volume.set(initial_volume.clamp(0.0, 1.0));
        }
        self.favorites_limit = favorites_limit;
        self
    }

    pub fn get_all(&self) -> Result<Vec<AmbientSound>, SoundServiceError> {
        Ok(self.repo.list_sounds()?)
    }

    pub fn get_by_id(&self, id: SoundId) -> Result<AmbientSound, SoundServiceError> {
        self.repo
            .get_sound(id)?
            .ok_or(SoundServiceError::SoundNotFound(id))
    }

    pub fn get_by_category(&self, category: &str) -> Result<Vec<AmbientSound>, SoundServiceError> {
        let mut sounds = self.repo.list_sounds()?;
        sounds.retain(|sound| sound.category.eq_ignore_ascii_case(category.trim()));
        Ok(sounds)
    }

    /// Starts `id`, replacing whatever was playing.
    pub fn play(&self, id: SoundId) -> Result<PlaybackState, SoundServiceError> {
        self.get_by_id(id)?;
        self.playing.set(Some(id));
        log::debug!("event=sound_play module=service status=ok sound_id={id}");
        Ok(self.state())
    }

    /// Stops playback and reports what was playing.
    pub fn pause(&self) -> Option<SoundId> {
        let was_playing = self.playing.take();
        if let Some(id) = was_playing {
            log::debug!("event=sound_pause module=service status=ok sound_id={id}");
        }
        was_playing
    }

    /// Pauses `id` when it is playing, otherwise plays it.
    pub fn toggle(&self, id: SoundId) -> Result<PlaybackState, SoundServiceError> {
        if self.playing.get() == Some(id) {
            self.pause();
            Ok(self.state())
        } else {
            self.play(id)
        }
    }

    /// Sets the global volume, clamped to `[0, 1]`.
    pub fn set_volume(&self, level: f32) -> Result<f32, SoundServiceError> {
        if level.is_nan() {
            return Err(SoundServiceError::InvalidVolume(level));
        }
        let clamped = level.clamp(0.0, 1.0);
        self.volume.set(clamped);
        Ok(clamped)
    }

    pub fn volume(&self) -> f32 {
        self.volume.get()
    }

    /// Level `id` plays at: the global volume scaled by the sound's own level.
    pub fn output_level(&self, id: SoundId) -> Result<f32, SoundServiceError> {
        Ok(self.get_by_id(id)?.level_under(self.volume.get()))
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            currently_playing: self.playing.get(),
            volume: self.volume.get(),
        }
    }

    /// Catalog record of the playing sound, if any.
    pub fn currently_playing(&self) -> Result<Option<AmbientSound>, SoundServiceError> {
        match self.playing.get() {
            Some(id) => Ok(self.repo.get_sound(id)?),
            None => Ok(None),
        }
    }

    /// Builds a mix from `ids`, skipping unknown ones.
    pub fn create_mix(
        &self,
        ids: &[SoundId],
        name: Option<&str>,
    ) -> Result<SoundMix, SoundServiceError> {
        let mut sounds = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.repo.get_sound(id)? {
                Some(sound) => sounds.push(sound),
                None => log::warn!("event=sound_mix module=service status=skip sound_id={id}"),
            }
        }
        if sounds.is_empty() {
            return Err(SoundServiceError::EmptyMix);
        }

        let now = self.clock.now_ms();
        let name = name
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Custom Mix {now}"));
        Ok(SoundMix {
            id: Uuid::new_v4(),
            name,
            sounds,
            created_at: now,
        })
    }

    /// Popular sounds in catalog order, capped at the favorites size.
    pub fn get_favorites(&self) -> Result<Vec<AmbientSound>, SoundServiceError> {
        Ok(self
            .repo
            .list_sounds()?
            .into_iter()
            .filter(|sound| sound.popular)
            .take(self.favorites_limit)
            .collect())
    }
}
