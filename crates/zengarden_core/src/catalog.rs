//! Builtin read-only catalogs.
//!
//! Seeded into empty SQLite catalogs and used as the default content of
//! in-memory repositories.

use crate::model::garden::{CatalogElement, ElementKind};
use crate::model::meditation::{Difficulty, MeditationSession};
use crate::model::sound::AmbientSound;

#[allow(clippy::too_many_arguments)]
fn element(
    id: i64,
    name: &str,
    kind: ElementKind,
    subtype: &str,
    category: &str,
    description: &str,
    icon: &str,
    color: &str,
) -> CatalogElement {
    CatalogElement {
        id,
        name: name.to_string(),
        kind,
        subtype: subtype.to_string(),
        category: category.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        width: 50,
        height: 50,
    }
}

/// Palette entries grouped under `Rocks`, `Plants` and `Water`.
pub fn builtin_elements() -> Vec<CatalogElement> {
    vec![
        element(1, "Smooth Stone", ElementKind::Rock, "smooth-stone", "Rocks", "A river-worn stone", "🪨", "#8b8d7a"),
        element(2, "Mountain Rock", ElementKind::Rock, "mountain-rock", "Rocks", "A tall, jagged rock", "⛰️", "#6b6d5c"),
        element(3, "Bamboo", ElementKind::Plant, "bamboo", "Plants", "Swaying bamboo stalks", "🎋", "#7a9b5c"),
        element(4, "Cherry Blossom", ElementKind::Plant, "cherry-blossom", "Plants", "A blossoming cherry tree", "🌸", "#f4b6c2"),
        element(5, "Lotus", ElementKind::Plant, "lotus", "Plants", "A floating lotus flower", "🪷", "#e8a0bf"),
        element(6, "Koi Pond", ElementKind::Water, "koi-pond", "Water", "A still pond with koi", "🐟", "#7fb3d5"),
        element(7, "Stream", ElementKind::Water, "stream", "Water", "A gently flowing stream", "🌊", "#5dade2"),
    ]
}

#[allow(clippy::too_many_arguments)]
fn session(
    id: i64,
    title: &str,
    description: &str,
    duration_secs: i64,
    category: &str,
    difficulty: Difficulty,
    instructor: &str,
    thumbnail: &str,
) -> MeditationSession {
    MeditationSession {
        id,
        title: title.to_string(),
        description: description.to_string(),
        duration_secs,
        category: category.to_string(),
        difficulty,
        instructor: instructor.to_string(),
        thumbnail: thumbnail.to_string(),
        audio_url: None,
    }
}

/// Guided sessions.
pub fn builtin_sessions() -> Vec<MeditationSession> {
    vec![
        session(1, "Morning Breath", "Wake gently with slow breathing", 300, "Breathing", Difficulty::Beginner, "Aiko", "🌅"),
        session(2, "Body Scan", "Release tension from head to toe", 600, "Mindfulness", Difficulty::Beginner, "Ren", "🧘"),
        session(3, "Deep Focus", "Anchor attention on a single point", 900, "Focus", Difficulty::Intermediate, "Mei", "🎯"),
        session(4, "Evening Wind-down", "Let the day settle before sleep", 1200, "Sleep", Difficulty::Beginner, "Aiko", "🌙"),
        session(5, "Open Awareness", "Rest in choiceless awareness", 1800, "Mindfulness", Difficulty::Advanced, "Ren", "🌌"),
    ]
}

fn sound(id: i64, name: &str, description: &str, category: &str, icon: &str, color: &str, popular: bool) -> AmbientSound {
    AmbientSound {
        id,
        name: name.to_string(),
        description: description.to_string(),
        category: category.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
        popular,
        audio_url: None,
        duration_secs: None,
        volume: None,
    }
}

fn clip(mut sound: AmbientSound, duration_secs: u32, volume: f32) -> AmbientSound {
    sound.duration_secs = Some(duration_secs);
    sound.volume = Some(volume);
    sound
}

/// Ambient sound loops.
pub fn builtin_sounds() -> Vec<AmbientSound> {
    vec![
        sound(1, "Rain", "Soft rain on leaves", "Nature", "🌧️", "#5d6d7e", true),
        sound(2, "Ocean Waves", "Slow waves on the shore", "Nature", "🌊", "#2e86c1", true),
        sound(3, "Forest Birds", "Morning birdsong", "Nature", "🐦", "#58d68d", true),
        clip(sound(4, "Singing Bowl", "Resonant bowl tones", "Instruments", "🔔", "#d4ac0d", true), 180, 0.6),
        clip(sound(5, "Wind Chimes", "Distant chimes in a breeze", "Instruments", "🎐", "#af7ac5", true), 240, 0.5),
        sound(6, "Crackling Fire", "A quiet hearth", "Ambience", "🔥", "#e67e22", false),
    ]
}
