//! Garden repository contract with in-memory and SQLite implementations.
//!
//! # Responsibility
//! - Persist whole garden records; elements are stored as one JSON array.
//! - Serve the read-only element catalog for the palette.
//!
//! # Invariants
//! - `get_all` returns most recently created gardens first.
//! - `update` replaces the whole record, including the elements array.

use super::{ensure_tables, parse_flag, parse_uuid, RepoError, RepoResult};
use crate::catalog::builtin_elements;
use crate::model::garden::{CatalogElement, ElementKind, Garden, GardenId, PlacedElement};
use rusqlite::{params, Connection, Row};
use std::cell::RefCell;

const GARDEN_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    elements_json,
    thumbnail,
    is_template,
    created_at,
    updated_at
FROM gardens";

/// Storage port for gardens and the element catalog.
pub trait GardenRepository {
    fn get_all(&self) -> RepoResult<Vec<Garden>>;
    fn get_by_id(&self, id: GardenId) -> RepoResult<Option<Garden>>;
    fn create(&self, garden: &Garden) -> RepoResult<GardenId>;
    fn update(&self, garden: &Garden) -> RepoResult<()>;
    fn delete(&self, id: GardenId) -> RepoResult<()>;
    fn list_catalog_elements(&self) -> RepoResult<Vec<CatalogElement>>;
}

impl<T: GardenRepository + ?Sized> GardenRepository for &T {
    fn get_all(&self) -> RepoResult<Vec<Garden>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: GardenId) -> RepoResult<Option<Garden>> {
        (**self).get_by_id(id)
    }

    fn create(&self, garden: &Garden) -> RepoResult<GardenId> {
        (**self).create(garden)
    }

    fn update(&self, garden: &Garden) -> RepoResult<()> {
        (**self).update(garden)
    }

    fn delete(&self, id: GardenId) -> RepoResult<()> {
        (**self).delete(id)
    }

    fn list_catalog_elements(&self) -> RepoResult<Vec<CatalogElement>> {
        (**self).list_catalog_elements()
    }
}

/// Process-lifetime garden storage.
pub struct InMemoryGardenRepository {
    gardens: RefCell<Vec<Garden>>,
    catalog: Vec<CatalogElement>,
}

impl InMemoryGardenRepository {
    /// Empty garden list with the builtin element catalog.
    pub fn new() -> Self {
        Self::with_catalog(builtin_elements())
    }

    pub fn with_catalog(catalog: Vec<CatalogElement>) -> Self {
        Self {
            gardens: RefCell::new(Vec::new()),
            catalog,
        }
    }
}

impl Default for InMemoryGardenRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl GardenRepository for InMemoryGardenRepository {
    fn get_all(&self) -> RepoResult<Vec<Garden>> {
        let mut gardens = self.gardens.borrow().clone();
        gardens.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(gardens)
    }

    fn get_by_id(&self, id: GardenId) -> RepoResult<Option<Garden>> {
        Ok(self
            .gardens
            .borrow()
            .iter()
            .find(|garden| garden.id == id)
            .cloned())
    }

    fn create(&self, garden: &Garden) -> RepoResult<GardenId> {
        garden.validate()?;
        let mut gardens = self.gardens.borrow_mut();
        if gardens.iter().any(|existing| existing.id == garden.id) {
            return Err(RepoError::duplicate("garden", garden.id));
        }
        gardens.insert(0, garden.clone());
        Ok(garden.id)
    }

    fn update(&self, garden: &Garden) -> RepoResult<()> {
        garden.validate()?;
        let mut gardens = self.gardens.borrow_mut();
        let slot = gardens
            .iter_mut()
            .find(|existing| existing.id == garden.id)
            .ok_or_else(|| RepoError::not_found("garden", garden.id))?;
        *slot = garden.clone();
        Ok(())
    }

    fn delete(&self, id: GardenId) -> RepoResult<()> {
        let mut gardens = self.gardens.borrow_mut();
        let before = gardens.len();
        gardens.retain(|garden| garden.id != id);
        if gardens.len() == before {
            return Err(RepoError::not_found("garden", id));
        }
        Ok(())
    }

    fn list_catalog_elements(&self) -> RepoResult<Vec<CatalogElement>> {
        Ok(self.catalog.clone())
    }
}

/// SQLite-backed garden repository.
pub struct SqliteGardenRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGardenRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["gardens", "catalog_elements"])?;
        Ok(Self { conn })
    }
}

impl GardenRepository for SqliteGardenRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<Garden>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GARDEN_SELECT_SQL} ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut gardens = Vec::new();
        while let Some(row) = rows.next()? {
            gardens.push(parse_garden_row(row)?);
        }
        Ok(gardens)
    }

    fn get_by_id(&self, id: GardenId) -> RepoResult<Option<Garden>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GARDEN_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_garden_row(row)?));
        }
        Ok(None)
    }

    fn create(&self, garden: &Garden) -> RepoResult<GardenId> {
        garden.validate()?;
        let elements_json = encode_elements(&garden.elements)?;
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM gardens WHERE uuid = ?1);",
            [garden.id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 1 {
            return Err(RepoError::duplicate("garden", garden.id));
        }

        self.conn.execute(
            "INSERT INTO gardens (
                uuid,
                name,
                description,
                elements_json,
                thumbnail,
                is_template,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                garden.id.to_string(),
                garden.name.as_str(),
                garden.description.as_str(),
                elements_json,
                garden.thumbnail.as_str(),
                garden.is_template,
                garden.created_at,
                garden.updated_at,
            ],
        )?;
        Ok(garden.id)
    }

    fn update(&self, garden: &Garden) -> RepoResult<()> {
        garden.validate()?;
        let elements_json = encode_elements(&garden.elements)?;
        let changed = self.conn.execute(
            "UPDATE gardens
             SET
                name = ?1,
                description = ?2,
                elements_json = ?3,
                thumbnail = ?4,
                is_template = ?5,
                created_at = ?6,
                updated_at = ?7
             WHERE uuid = ?8;",
            params![
                garden.name.as_str(),
                garden.description.as_str(),
                elements_json,
                garden.thumbnail.as_str(),
                garden.is_template,
                garden.created_at,
                garden.updated_at,
                garden.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("garden", garden.id));
        }
        Ok(())
    }

    fn delete(&self, id: GardenId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM gardens WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::not_found("garden", id));
        }
        Ok(())
    }

    fn list_catalog_elements(&self) -> RepoResult<Vec<CatalogElement>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, kind, subtype, category, description, icon, color, width, height
             FROM catalog_elements
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut elements = Vec::new();
        while let Some(row) = rows.next()? {
            let kind_text: String = row.get("kind")?;
            let kind = ElementKind::parse(&kind_text).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid element kind `{kind_text}` in catalog_elements.kind"
                ))
            })?;
            elements.push(CatalogElement {
                id: row.get("id")?,
                name: row.get("name")?,
                kind,
                subtype: row.get("subtype")?,
                category: row.get("category")?,
                description: row.get("description")?,
                icon: row.get("icon")?,
                color: row.get("color")?,
                width: row.get("width")?,
                height: row.get("height")?,
            });
        }
        Ok(elements)
    }
}

fn encode_elements(elements: &[PlacedElement]) -> RepoResult<String> {
    serde_json::to_string(elements)
        .map_err(|err| RepoError::InvalidData(format!("cannot encode garden elements: {err}")))
}

fn parse_garden_row(row: &Row<'_>) -> RepoResult<Garden> {
    let uuid_text: String = row.get("uuid")?;
    let elements_json: String = row.get("elements_json")?;
    let elements: Vec<PlacedElement> = serde_json::from_str(&elements_json).map_err(|err| {
        RepoError::InvalidData(format!(
            "invalid elements json for garden `{uuid_text}`: {err}"
        ))
    })?;

    let garden = Garden {
        id: parse_uuid(&uuid_text, "gardens.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        elements,
        thumbnail: row.get("thumbnail")?,
        is_template: parse_flag(row.get("is_template")?, "gardens.is_template")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    garden.validate()?;
    Ok(garden)
}
