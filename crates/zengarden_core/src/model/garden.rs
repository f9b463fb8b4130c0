//! Garden domain model.
//!
//! # Responsibility
//! - Define saved gardens, placed elements and the read-only element catalog.
//! - Derive the thumbnail glyph from a garden's composition.
//!
//! # Invariants
//! - `elements` keeps canvas order; edits replace the whole array.
//! - A garden's `id` is never reused; duplicates and imports get fresh ids.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a saved garden.
pub type GardenId = Uuid;

/// Identifier of a catalog element.
pub type CatalogElementId = i64;

/// Glyph used when nothing more specific applies.
pub const DEFAULT_THUMBNAIL: &str = "🌱";

/// Broad element family used for drag effects and thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Rock,
    Plant,
    Water,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rock => "rock",
            Self::Plant => "plant",
            Self::Water => "water",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rock" => Some(Self::Rock),
            "plant" => Some(Self::Plant),
            "water" => Some(Self::Water),
            _ => None,
        }
    }
}

/// Canvas position in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Element instance placed on a garden canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub subtype: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub position: Position,
    /// Degrees. Accumulates without wrapping.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl PlacedElement {
    /// Instantiates a catalog entry at `position` with no rotation and unit scale.
    pub fn from_catalog(element: &CatalogElement, position: Position) -> Self {
        Self {
            kind: element.kind,
            subtype: element.subtype.clone(),
            name: element.name.clone(),
            icon: element.icon.clone(),
            position,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

/// Read-only palette entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogElement {
    pub id: CatalogElementId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub subtype: String,
    /// Palette tab, e.g. `Rocks`, `Plants`, `Water`.
    pub category: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub width: u32,
    pub height: u32,
}

/// Saved garden arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Garden {
    pub id: GardenId,
    pub name: String,
    pub description: String,
    pub elements: Vec<PlacedElement>,
    pub thumbnail: String,
    pub is_template: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Garden {
    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::BlankField("name"));
        }
        validate_elements(&self.elements)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}

/// Caller-supplied fields for creating or replacing a garden.
#[derive(Debug, Clone, PartialEq)]
pub struct GardenDraft {
    pub name: String,
    pub description: String,
    pub elements: Vec<PlacedElement>,
    /// Derived from `elements` when `None`.
    pub thumbnail: Option<String>,
    pub is_template: bool,
}

impl GardenDraft {
    pub fn new(name: impl Into<String>, elements: Vec<PlacedElement>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            elements,
            thumbnail: None,
            is_template: false,
        }
    }
}

pub(crate) fn validate_elements(elements: &[PlacedElement]) -> Result<(), ValidationError> {
    for (index, element) in elements.iter().enumerate() {
        if !element.position.x.is_finite() || !element.position.y.is_finite() {
            return Err(ValidationError::NonFinitePosition { index });
        }
        if !element.scale.is_finite() || element.scale <= 0.0 {
            return Err(ValidationError::InvalidScale {
                index,
                scale: element.scale,
            });
        }
    }
    Ok(())
}

/// Picks a thumbnail glyph from garden composition. First matching rule wins.
pub fn derive_thumbnail(elements: &[PlacedElement]) -> &'static str {
    let has_kind = |kind: ElementKind| elements.iter().any(|el| el.kind == kind);
    let has_plant = |subtype: &str| {
        elements
            .iter()
            .any(|el| el.kind == ElementKind::Plant && el.subtype == subtype)
    };

    let water = has_kind(ElementKind::Water);
    if water && has_plant("cherry-blossom") {
        "🌸"
    } else if water && has_kind(ElementKind::Rock) {
        "🏞️"
    } else if has_plant("bamboo") {
        "🎋"
    } else if has_plant("lotus") {
        "🪷"
    } else if water {
        "🌊"
    } else if has_plant("cherry-blossom") {
        "🌸"
    } else if has_kind(ElementKind::Plant) {
        "🌿"
    } else if has_kind(ElementKind::Rock) {
        "🪨"
    } else {
        DEFAULT_THUMBNAIL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(kind: ElementKind, subtype: &str) -> PlacedElement {
        PlacedElement {
            kind,
            subtype: subtype.to_string(),
            name: subtype.to_string(),
            icon: String::new(),
            position: Position::new(10.0, 10.0),
            rotation: 0.0,
            scale: 1.0,
        }
    }

    #[test]
    fn thumbnail_follows_rule_priority() {
        assert_eq!(derive_thumbnail(&[]), DEFAULT_THUMBNAIL);
        assert_eq!(
            derive_thumbnail(&[placed(ElementKind::Rock, "boulder")]),
            "🪨"
        );
        assert_eq!(
            derive_thumbnail(&[
                placed(ElementKind::Water, "pond"),
                placed(ElementKind::Rock, "boulder"),
            ]),
            "🏞️"
        );
        assert_eq!(
            derive_thumbnail(&[
                placed(ElementKind::Rock, "boulder"),
                placed(ElementKind::Water, "stream"),
                placed(ElementKind::Plant, "cherry-blossom"),
            ]),
            "🌸"
        );
        assert_eq!(
            derive_thumbnail(&[
                placed(ElementKind::Plant, "lotus"),
                placed(ElementKind::Plant, "bamboo"),
            ]),
            "🎋"
        );
        assert_eq!(derive_thumbnail(&[placed(ElementKind::Plant, "moss")]), "🌿");
    }

    #[test]
    fn placed_element_json_uses_type_key_and_defaults() {
        let json = r#"{"type":"water","subtype":"pond","position":{"x":1.5,"y":2}}"#;
        let element: PlacedElement = serde_json::from_str(json).unwrap();
        assert_eq!(element.kind, ElementKind::Water);
        assert_eq!(element.scale, 1.0);
        assert_eq!(element.rotation, 0.0);

        let value = serde_json::to_value(&element).unwrap();
        assert_eq!(value["type"], "water");
    }

    #[test]
    fn validate_rejects_blank_name_and_bad_scale() {
        let mut garden = Garden {
            id: Uuid::new_v4(),
            name: "  ".to_string(),
            description: String::new(),
            elements: vec![placed(ElementKind::Rock, "boulder")],
            thumbnail: DEFAULT_THUMBNAIL.to_string(),
            is_template: false,
            created_at: 0,
            updated_at: 0,
        };
        assert_eq!(garden.validate(), Err(ValidationError::BlankField("name")));

        garden.name = "Dusk".to_string();
        garden.elements[0].scale = 0.0;
        assert!(matches!(
            garden.validate(),
            Err(ValidationError::InvalidScale { index: 0, .. })
        ));
    }
}
