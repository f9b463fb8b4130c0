//! Ambient sound catalog and playback records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a catalog ambient sound.
pub type SoundId = i64;

/// Ambient sound catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbientSound {
    pub id: SoundId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub icon: String,
    pub color: String,
    pub popular: bool,
    pub audio_url: Option<String>,
    /// Clip length; `None` for endless loops.
    #[serde(rename = "duration", default)]
    pub duration_secs: Option<u32>,
    /// Recommended mix level in `[0, 1]`; `None` plays at full level.
    #[serde(default)]
    pub volume: Option<f32>,
}

impl AmbientSound {
    /// Output level for this sound under the global `master` volume.
    pub fn level_under(&self, master: f32) -> f32 {
        (master * self.volume.unwrap_or(1.0)).clamp(0.0, 1.0)
    }
}

/// Snapshot returned by playback operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub currently_playing: Option<SoundId>,
    pub volume: f32,
}

/// Ad-hoc layered mix. Lives only as long as the caller keeps it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundMix {
    pub id: Uuid,
    pub name: String,
    pub sounds: Vec<AmbientSound>,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::AmbientSound;

    fn bowl(volume: Option<f32>) -> AmbientSound {
        AmbientSound {
            id: 4,
            name: "Singing Bowl".to_string(),
            description: String::new(),
            category: "Instruments".to_string(),
            icon: "🔔".to_string(),
            color: "#d4ac0d".to_string(),
            popular: true,
            audio_url: None,
            duration_secs: Some(180),
            volume,
        }
    }

    #[test]
    fn level_scales_master_by_sound_volume() {
        assert_eq!(bowl(Some(0.5)).level_under(0.8), 0.4);
        assert_eq!(bowl(None).level_under(0.7), 0.7);
        assert_eq!(bowl(Some(0.5)).level_under(0.0), 0.0);
    }

    #[test]
    fn details_use_catalog_field_names() {
        let json = serde_json::to_value(bowl(Some(0.5))).unwrap();
        assert_eq!(json["duration"], 180);
        assert_eq!(json["volume"], 0.5);
        assert_eq!(json["audioUrl"], serde_json::Value::Null);

        let legacy: AmbientSound = serde_json::from_str(
            r#"{"id":1,"name":"Rain","description":"","category":"Nature","icon":"","color":"","popular":true,"audioUrl":null}"#,
        )
        .unwrap();
        assert_eq!(legacy.duration_secs, None);
        assert_eq!(legacy.volume, None);
    }
}
