//! Garden use-case service and gallery queries.
//!
//! # Responsibility
//! - Create, update, duplicate and delete gardens through `GardenRepository`.
//! - Answer gallery queries (category, search, sort).
//! - Export gardens to a JSON document and import them back.
//!
//! # Invariants
//! - Duplicates and imports are never templates and always get fresh ids.
//! - With a sort active, the gallery sorts first and filters after; without
//!   one, a search term takes precedence over the category.

use crate::clock::{to_iso8601, Clock, SystemClock};
use crate::model::garden::{
    derive_thumbnail, CatalogElement, Garden, GardenDraft, GardenId, PlacedElement,
    DEFAULT_THUMBNAIL,
};
use crate::model::ValidationError;
use crate::repo::garden_repo::GardenRepository;
use crate::repo::RepoError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Version tag written into every export document.
pub const EXPORT_VERSION: &str = "1.0";

const COPY_SUFFIX: &str = " (Copy)";

/// Service error for garden use-cases.
#[derive(Debug)]
pub enum GardenServiceError {
    GardenNotFound(GardenId),
    Validation(ValidationError),
    Repo(RepoError),
    /// Export/import document could not be encoded or decoded.
    Json(serde_json::Error),
    /// Clock value cannot be rendered as a calendar timestamp.
    InvalidTimestamp(i64),
}

impl Display for GardenServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GardenNotFound(id) => write!(f, "garden not found: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "invalid garden document: {err}"),
            Self::InvalidTimestamp(value) => write!(f, "timestamp out of range: {value}"),
        }
    }
}

impl Error for GardenServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GardenServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for GardenServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<serde_json::Error> for GardenServiceError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Gallery tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GalleryCategory {
    #[default]
    All,
    /// User gardens (`is_template == false`).
    Personal,
    Templates,
}

impl GalleryCategory {
    fn matches(self, garden: &Garden) -> bool {
        match self {
            Self::All => true,
            Self::Personal => !garden.is_template,
            Self::Templates => garden.is_template,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    CreatedAt,
    UpdatedAt,
    ElementCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GallerySort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl GallerySort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    fn compare(&self, a: &Garden, b: &Garden) -> Ordering {
        let ordering = match self.field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::ElementCount => a.element_count().cmp(&b.element_count()),
        };
        match self.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Gallery view parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GalleryQuery {
    pub search: String,
    pub category: GalleryCategory,
    pub sort: Option<GallerySort>,
}

/// Export document: the garden record plus export metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenExport {
    #[serde(flatten)]
    pub garden: Garden,
    pub exported_at: String,
    pub version: String,
}

/// Import document. Unknown keys (ids, export metadata) are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GardenImport {
    #[serde(default)]
    pub name: Option<String>,
    /// Legacy capitalized key.
    #[serde(default, rename = "Name")]
    pub legacy_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub elements: Vec<PlacedElement>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl GardenImport {
    fn resolved_name(&self) -> Option<&str> {
        [self.name.as_deref(), self.legacy_name.as_deref()]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
    }
}

/// Garden service facade over repository implementations.
pub struct GardenService<R: GardenRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
}

impl<R: GardenRepository> GardenService<R> {
    /// Creates a service reading the wall clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, Arc::new(SystemClock))
    }

    pub fn with_clock(repo: R, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    /// Gardens, most recently created first.
    pub fn get_all(&self) -> Result<Vec<Garden>, GardenServiceError> {
        Ok(self.repo.get_all()?)
    }

    pub fn get_by_id(&self, id: GardenId) -> Result<Garden, GardenServiceError> {
        self.repo
            .get_by_id(id)?
            .ok_or(GardenServiceError::GardenNotFound(id))
    }

    /// Palette entries in catalog order.
    pub fn get_elements(&self) -> Result<Vec<CatalogElement>, GardenServiceError> {
        Ok(self.repo.list_catalog_elements()?)
    }

    /// Distinct palette categories in first-seen catalog order.
    pub fn palette_categories(&self) -> Result<Vec<String>, GardenServiceError> {
        let mut categories: Vec<String> = Vec::new();
        for element in self.repo.list_catalog_elements()? {
            if !categories.contains(&element.category) {
                categories.push(element.category);
            }
        }
        Ok(categories)
    }

    pub fn get_templates(&self) -> Result<Vec<Garden>, GardenServiceError> {
        self.get_by_category(GalleryCategory::Templates)
    }

    pub fn get_by_category(
        &self,
        category: GalleryCategory,
    ) -> Result<Vec<Garden>, GardenServiceError> {
        let mut gardens = self.repo.get_all()?;
        gardens.retain(|garden| category.matches(garden));
        Ok(gardens)
    }

    /// Case-insensitive substring match on name or description.
    pub fn search(&self, query: &str) -> Result<Vec<Garden>, GardenServiceError> {
        let mut gardens = self.repo.get_all()?;
        retain_search(&mut gardens, query);
        Ok(gardens)
    }

    /// All gardens sorted by `sort`. Ties keep repository order.
    pub fn sort_by(&self, sort: GallerySort) -> Result<Vec<Garden>, GardenServiceError> {
        let mut gardens = self.repo.get_all()?;
        gardens.sort_by(|a, b| sort.compare(a, b));
        Ok(gardens)
    }

    /// Gallery contents for the given view parameters.
    pub fn gallery(&self, query: &GalleryQuery) -> Result<Vec<Garden>, GardenServiceError> {
        let search = query.search.trim();
        if let Some(sort) = query.sort {
            let mut gardens = self.sort_by(sort)?;
            gardens.retain(|garden| query.category.matches(garden));
            if !search.is_empty() {
                retain_search(&mut gardens, search);
            }
            return Ok(gardens);
        }

        if !search.is_empty() {
            self.search(search)
        } else {
            self.get_by_category(query.category)
        }
    }

    pub fn create(&self, draft: GardenDraft) -> Result<Garden, GardenServiceError> {
        let now = self.clock.now_ms();
        let thumbnail = draft
            .thumbnail
            .unwrap_or_else(|| derive_thumbnail(&draft.elements).to_string());
        let garden = Garden {
            id: Uuid::new_v4(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            elements: draft.elements,
            thumbnail,
            is_template: draft.is_template,
            created_at: now,
            updated_at: now,
        };
        self.insert(garden)
    }

    /// Replaces name, description, elements and thumbnail of `id`.
    pub fn update(&self, id: GardenId, draft: GardenDraft) -> Result<Garden, GardenServiceError> {
        let existing = self.get_by_id(id)?;
        let thumbnail = draft
            .thumbnail
            .unwrap_or_else(|| derive_thumbnail(&draft.elements).to_string());
        let garden = Garden {
            name: draft.name.trim().to_string(),
            description: draft.description,
            elements: draft.elements,
            thumbnail,
            is_template: draft.is_template,
            updated_at: self.clock.now_ms(),
            ..existing
        };
        self.repo.update(&garden).map_err(|err| {
            log::error!("event=garden_update module=service status=error garden_id={id} error={err}");
            not_found_or(err, id)
        })?;
        log::info!("event=garden_update module=service status=ok garden_id={id}");
        Ok(garden)
    }

    pub fn delete(&self, id: GardenId) -> Result<(), GardenServiceError> {
        self.repo.delete(id).map_err(|err| not_found_or(err, id))?;
        log::info!("event=garden_delete module=service status=ok garden_id={id}");
        Ok(())
    }

    /// Copies `id` as a new personal garden named `<name> (Copy)`.
    pub fn duplicate(&self, id: GardenId) -> Result<Garden, GardenServiceError> {
        let source = self.get_by_id(id)?;
        let now = self.clock.now_ms();
        let copy = Garden {
            id: Uuid::new_v4(),
            name: format!("{}{COPY_SUFFIX}", source.name),
            is_template: false,
            created_at: now,
            updated_at: now,
            ..source
        };
        self.insert(copy)
    }

    pub fn export_garden(&self, id: GardenId) -> Result<GardenExport, GardenServiceError> {
        let garden = self.get_by_id(id)?;
        let now = self.clock.now_ms();
        let exported_at = to_iso8601(now).ok_or(GardenServiceError::InvalidTimestamp(now))?;
        Ok(GardenExport {
            garden,
            exported_at,
            version: EXPORT_VERSION.to_string(),
        })
    }

    /// Pretty-printed export document.
    pub fn export_garden_json(&self, id: GardenId) -> Result<String, GardenServiceError> {
        let export = self.export_garden(id)?;
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Creates a new personal garden from an import document.
    pub fn import_garden(&self, data: GardenImport) -> Result<Garden, GardenServiceError> {
        let name = data
            .resolved_name()
            .ok_or(GardenServiceError::Validation(ValidationError::BlankField(
                "name",
            )))?
            .to_string();
        let draft = GardenDraft {
            name,
            description: data.description,
            elements: data.elements,
            thumbnail: Some(
                data.thumbnail
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_THUMBNAIL.to_string()),
            ),
            is_template: false,
        };
        self.create(draft)
    }

    pub fn import_garden_json(&self, json: &str) -> Result<Garden, GardenServiceError> {
        let data: GardenImport = serde_json::from_str(json).map_err(|err| {
            log::warn!("event=garden_import module=service status=error error={err}");
            GardenServiceError::Json(err)
        })?;
        self.import_garden(data)
    }

    fn insert(&self, garden: Garden) -> Result<Garden, GardenServiceError> {
        match self.repo.create(&garden) {
            Ok(id) => {
                log::info!(
                    "event=garden_create module=service status=ok garden_id={id} elements={}",
                    garden.element_count()
                );
                Ok(garden)
            }
            Err(err) => {
                log::error!("event=garden_create module=service status=error error={err}");
                Err(err.into())
            }
        }
    }
}

fn retain_search(gardens: &mut Vec<Garden>, query: &str) {
    let needle = query.trim().to_lowercase();
    gardens.retain(|garden| {
        garden.name.to_lowercase().contains(&needle)
            || garden.description.to_lowercase().contains(&needle)
    });
}

fn not_found_or(err: RepoError, id: GardenId) -> GardenServiceError {
    if err.is_not_found() {
        GardenServiceError::GardenNotFound(id)
    } else {
        err.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::model::garden::{ElementKind, Position};
    use crate::repo::garden_repo::InMemoryGardenRepository;

    fn rock(x: f64) -> PlacedElement {
        PlacedElement {
            kind: ElementKind::Rock,
            subtype: "smooth-stone".to_string(),
            name: "Smooth Stone".to_string(),
            icon: "🪨".to_string(),
            position: Position::new(x, 40.0),
            rotation: 0.0,
            scale: 1.0,
        }
    }

    fn service() -> (GardenService<InMemoryGardenRepository>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let service = GardenService::with_clock(InMemoryGardenRepository::new(), clock.clone());
        (service, clock)
    }

    #[test]
    fn create_derives_thumbnail_and_timestamps() {
        let (service, _) = service();
        let garden = service
            .create(GardenDraft::new("  Dawn ", vec![rock(1.0), rock(2.0)]))
            .unwrap();
        assert_eq!(garden.name, "Dawn");
        assert_eq!(garden.thumbnail, "🪨");
        assert_eq!(garden.created_at, 1_000);
        assert_eq!(garden.updated_at, 1_000);
        assert!(!garden.is_template);
    }

    #[test]
    fn create_rejects_blank_name() {
        let (service, _) = service();
        let err = service.create(GardenDraft::new("  ", Vec::new())).unwrap_err();
        assert!(matches!(
            err,
            GardenServiceError::Validation(ValidationError::BlankField("name"))
        ));
        assert!(service.get_all().unwrap().is_empty());
    }

    #[test]
    fn update_keeps_created_at() {
        let (service, clock) = service();
        let garden = service.create(GardenDraft::new("Dawn", Vec::new())).unwrap();
        clock.advance(500);
        let updated = service
            .update(garden.id, GardenDraft::new("Dusk", vec![rock(5.0)]))
            .unwrap();
        assert_eq!(updated.created_at, 1_000);
        assert_eq!(updated.updated_at, 1_500);
        assert_eq!(service.get_by_id(garden.id).unwrap().name, "Dusk");
    }

    #[test]
    fn missing_garden_reports_not_found() {
        let (service, _) = service();
        let id = Uuid::new_v4();
        assert!(matches!(
            service.get_by_id(id),
            Err(GardenServiceError::GardenNotFound(found)) if found == id
        ));
        assert!(matches!(
            service.delete(id),
            Err(GardenServiceError::GardenNotFound(_))
        ));
        assert!(matches!(
            service.update(id, GardenDraft::new("x", Vec::new())),
            Err(GardenServiceError::GardenNotFound(_))
        ));
    }

    #[test]
    fn duplicate_of_template_is_personal_copy() {
        let (service, _) = service();
        let mut draft = GardenDraft::new("Classic", vec![rock(3.0)]);
        draft.is_template = true;
        let template = service.create(draft).unwrap();

        let copy = service.duplicate(template.id).unwrap();
        assert_ne!(copy.id, template.id);
        assert_eq!(copy.name, "Classic (Copy)");
        assert_eq!(copy.elements, template.elements);
        assert!(!copy.is_template);
        assert_eq!(service.get_templates().unwrap().len(), 1);
    }

    #[test]
    fn gallery_without_sort_prefers_search_over_category() {
        let (service, _) = service();
        let mut template = GardenDraft::new("Moss Template", Vec::new());
        template.is_template = true;
        service.create(template).unwrap();
        service.create(GardenDraft::new("Moss Corner", Vec::new())).unwrap();

        let query = GalleryQuery {
            search: "moss".to_string(),
            category: GalleryCategory::Templates,
            sort: None,
        };
        assert_eq!(service.gallery(&query).unwrap().len(), 2);

        let sorted = GalleryQuery {
            sort: Some(GallerySort::new(SortField::Name, SortDirection::Ascending)),
            ..query
        };
        let names: Vec<String> = service
            .gallery(&sorted)
            .unwrap()
            .into_iter()
            .map(|garden| garden.name)
            .collect();
        assert_eq!(names, vec!["Moss Template".to_string()]);
    }

    #[test]
    fn import_accepts_legacy_name_and_defaults_thumbnail() {
        let (service, _) = service();
        let garden = service
            .import_garden_json(r#"{"Name":"Legacy","elements":[]}"#)
            .unwrap();
        assert_eq!(garden.name, "Legacy");
        assert_eq!(garden.thumbnail, DEFAULT_THUMBNAIL);

        let err = service.import_garden_json(r#"{"elements":[]}"#).unwrap_err();
        assert!(matches!(err, GardenServiceError::Validation(_)));
        assert!(matches!(
            service.import_garden_json("not json"),
            Err(GardenServiceError::Json(_))
        ));
    }

    #[test]
    fn palette_categories_follow_catalog_order() {
        let (service, _) = service();
        assert_eq!(
            service.palette_categories().unwrap(),
            vec!["Rocks".to_string(), "Plants".to_string(), "Water".to_string()]
        );
    }
}
