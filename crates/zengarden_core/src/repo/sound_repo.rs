//! Ambient sound catalog storage.

use super::{ensure_tables, parse_flag, RepoResult};
use crate::catalog::builtin_sounds;
use crate::model::sound::{AmbientSound, SoundId};
use rusqlite::{Connection, Row};

/// Storage port for the ambient sound catalog. Sounds are listed by ascending id.
pub trait SoundRepository {
    fn list_sounds(&self) -> RepoResult<Vec<AmbientSound>>;
    fn get_sound(&self, id: SoundId) -> RepoResult<Option<AmbientSound>>;
}

impl<T: SoundRepository + ?Sized> SoundRepository for &T {
    fn list_sounds(&self) -> RepoResult<Vec<AmbientSound>> {
        (**self).list_sounds()
    }

    fn get_sound(&self, id: SoundId) -> RepoResult<Option<AmbientSound>> {
        (**self).get_sound(id)
    }
}

/// Static in-memory sound catalog.
pub struct InMemorySoundRepository {
    sounds: Vec<AmbientSound>,
}

impl InMemorySoundRepository {
    pub fn new() -> Self {
        Self::with_sounds(builtin_sounds())
    }

    pub fn with_sounds(mut sounds: Vec<AmbientSound>) -> Self {
        sounds.sort_by_key(|sound| sound.id);
        Self { sounds }
    }
}

impl Default for InMemorySoundRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SoundRepository for InMemorySoundRepository {
    fn list_sounds(&self) -> RepoResult<Vec<AmbientSound>> {
        Ok(self.sounds.clone())
    }

    fn get_sound(&self, id: SoundId) -> RepoResult<Option<AmbientSound>> {
        Ok(self.sounds.iter().find(|sound| sound.id == id).cloned())
    }
}

/// SQLite-backed sound catalog.
pub struct SqliteSoundRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSoundRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["ambient_sounds"])?;
        Ok(Self { conn })
    }
}

const SOUND_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    category,
    icon,
    color,
    popular,
    audio_url,
    duration_secs,
    volume
FROM ambient_sounds";

impl SoundRepository for SqliteSoundRepository<'_> {
    fn list_sounds(&self) -> RepoResult<Vec<AmbientSound>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SOUND_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut sounds = Vec::new();
        while let Some(row) = rows.next()? {
            sounds.push(parse_sound_row(row)?);
        }
        Ok(sounds)
    }

    fn get_sound(&self, id: SoundId) -> RepoResult<Option<AmbientSound>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SOUND_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_sound_row(row)?));
        }
        Ok(None)
    }
}

fn parse_sound_row(row: &Row<'_>) -> RepoResult<AmbientSound> {
    Ok(AmbientSound {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        category: row.get("category")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
        popular: parse_flag(row.get("popular")?, "ambient_sounds.popular")?,
        audio_url: row.get("audio_url")?,
        duration_secs: row.get("duration_secs")?,
        volume: row
            .get::<_, Option<f64>>("volume")?
            .map(|volume| volume as f32),
    })
}
