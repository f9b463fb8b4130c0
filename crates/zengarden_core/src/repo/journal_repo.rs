//! Journal repository contract with in-memory and SQLite implementations.
//!
//! # Responsibility
//! - Persist journal entries and their tag links.
//! - Answer inclusive date-range queries used by the month filter.
//!
//! # Invariants
//! - Listings are ordered by `date DESC, created_at DESC, id ASC`.
//! - Entry row and tag links are written in one transaction.
//! - Stored tag order matches the order the writer entered them.

use super::{ensure_tables, parse_uuid, RepoError, RepoResult};
use crate::model::journal::{EntryId, JournalEntry, Mood};
use rusqlite::{params, Connection, Row, Transaction};
use std::cell::RefCell;
use std::cmp::Ordering;

const ENTRY_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    mood,
    entry_date,
    garden_used,
    created_at,
    updated_at
FROM journal_entries";

const ENTRY_ORDER_SQL: &str = "ORDER BY entry_date DESC, created_at DESC, uuid ASC";

/// Storage port for journal entries.
pub trait JournalRepository {
    fn get_all(&self) -> RepoResult<Vec<JournalEntry>>;
    fn get_by_id(&self, id: EntryId) -> RepoResult<Option<JournalEntry>>;
    /// Entries whose `date` lies in `[start_ms, end_ms]`.
    fn get_by_date_range(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<JournalEntry>>;
    fn create(&self, entry: &JournalEntry) -> RepoResult<EntryId>;
    fn update(&self, entry: &JournalEntry) -> RepoResult<()>;
    fn delete(&self, id: EntryId) -> RepoResult<()>;
}

impl<T: JournalRepository + ?Sized> JournalRepository for &T {
    fn get_all(&self) -> RepoResult<Vec<JournalEntry>> {
        (**self).get_all()
    }

    fn get_by_id(&self, id: EntryId) -> RepoResult<Option<JournalEntry>> {
        (**self).get_by_id(id)
    }

    fn get_by_date_range(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<JournalEntry>> {
        (**self).get_by_date_range(start_ms, end_ms)
    }

    fn create(&self, entry: &JournalEntry) -> RepoResult<EntryId> {
        (**self).create(entry)
    }

    fn update(&self, entry: &JournalEntry) -> RepoResult<()> {
        (**self).update(entry)
    }

    fn delete(&self, id: EntryId) -> RepoResult<()> {
        (**self).delete(id)
    }
}

fn listing_order(a: &JournalEntry, b: &JournalEntry) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.to_string().cmp(&b.id.to_string()))
}

/// Process-lifetime journal storage.
#[derive(Default)]
pub struct InMemoryJournalRepository {
    entries: RefCell<Vec<JournalEntry>>,
}

impl InMemoryJournalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JournalRepository for InMemoryJournalRepository {
    fn get_all(&self) -> RepoResult<Vec<JournalEntry>> {
        let mut entries = self.entries.borrow().clone();
        entries.sort_by(listing_order);
        Ok(entries)
    }

    fn get_by_id(&self, id: EntryId) -> RepoResult<Option<JournalEntry>> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .find(|entry| entry.id == id)
            .cloned())
    }

    fn get_by_date_range(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<JournalEntry>> {
        let mut entries: Vec<JournalEntry> = self
            .entries
            .borrow()
            .iter()
            .filter(|entry| entry.date >= start_ms && entry.date <= end_ms)
            .cloned()
            .collect();
        entries.sort_by(listing_order);
        Ok(entries)
    }

    fn create(&self, entry: &JournalEntry) -> RepoResult<EntryId> {
        entry.validate()?;
        let mut entries = self.entries.borrow_mut();
        if entries.iter().any(|existing| existing.id == entry.id) {
            return Err(RepoError::duplicate("journal entry", entry.id));
        }
        entries.push(entry.clone());
        Ok(entry.id)
    }

    fn update(&self, entry: &JournalEntry) -> RepoResult<()> {
        entry.validate()?;
        let mut entries = self.entries.borrow_mut();
        let slot = entries
            .iter_mut()
            .find(|existing| existing.id == entry.id)
            .ok_or_else(|| RepoError::not_found("journal entry", entry.id))?;
        *slot = entry.clone();
        Ok(())
    }

    fn delete(&self, id: EntryId) -> RepoResult<()> {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        if entries.len() == before {
            return Err(RepoError::not_found("journal entry", id));
        }
        Ok(())
    }
}

/// SQLite-backed journal repository.
pub struct SqliteJournalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJournalRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["journal_entries", "tags", "entry_tags"])?;
        Ok(Self { conn })
    }

    fn query_entries(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<JournalEntry>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(self.parse_entry_row(row)?);
        }
        Ok(entries)
    }

    fn parse_entry_row(&self, row: &Row<'_>) -> RepoResult<JournalEntry> {
        let uuid_text: String = row.get("uuid")?;
        let mood = match row.get::<_, Option<String>>("mood")? {
            Some(value) => Some(Mood::parse(&value).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid mood `{value}` in journal_entries.mood"))
            })?),
            None => None,
        };
        let garden_used = match row.get::<_, Option<String>>("garden_used")? {
            Some(value) => Some(parse_uuid(&value, "journal_entries.garden_used")?),
            None => None,
        };

        let entry = JournalEntry {
            id: parse_uuid(&uuid_text, "journal_entries.uuid")?,
            title: row.get("title")?,
            content: row.get("content")?,
            mood,
            tags: load_tags_for_entry(self.conn, &uuid_text)?,
            date: row.get("entry_date")?,
            garden_used,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        };
        entry.validate()?;
        Ok(entry)
    }
}

impl JournalRepository for SqliteJournalRepository<'_> {
    fn get_all(&self) -> RepoResult<Vec<JournalEntry>> {
        self.query_entries(&format!("{ENTRY_SELECT_SQL} {ENTRY_ORDER_SQL};"), [])
    }

    fn get_by_id(&self, id: EntryId) -> RepoResult<Option<JournalEntry>> {
        let mut entries =
            self.query_entries(&format!("{ENTRY_SELECT_SQL} WHERE uuid = ?1;"), [id.to_string()])?;
        Ok(entries.pop())
    }

    fn get_by_date_range(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<JournalEntry>> {
        self.query_entries(
            &format!(
                "{ENTRY_SELECT_SQL}
                 WHERE entry_date >= ?1 AND entry_date <= ?2
                 {ENTRY_ORDER_SQL};"
            ),
            params![start_ms, end_ms],
        )
    }

    fn create(&self, entry: &JournalEntry) -> RepoResult<EntryId> {
        entry.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        let exists: i64 = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM journal_entries WHERE uuid = ?1);",
            [entry.id.to_string()],
            |row| row.get(0),
        )?;
        if exists == 1 {
            return Err(RepoError::duplicate("journal entry", entry.id));
        }

        tx.execute(
            "INSERT INTO journal_entries (
                uuid,
                title,
                content,
                mood,
                entry_date,
                garden_used,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                entry.id.to_string(),
                entry.title.as_str(),
                entry.content.as_str(),
                entry.mood.map(Mood::as_str),
                entry.date,
                entry.garden_used.map(|id| id.to_string()),
                entry.created_at,
                entry.updated_at,
            ],
        )?;
        replace_tags_in_tx(&tx, &entry.id.to_string(), &entry.tags)?;
        tx.commit()?;
        Ok(entry.id)
    }

    fn update(&self, entry: &JournalEntry) -> RepoResult<()> {
        entry.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE journal_entries
             SET
                title = ?1,
                content = ?2,
                mood = ?3,
                entry_date = ?4,
                garden_used = ?5,
                created_at = ?6,
                updated_at = ?7
             WHERE uuid = ?8;",
            params![
                entry.title.as_str(),
                entry.content.as_str(),
                entry.mood.map(Mood::as_str),
                entry.date,
                entry.garden_used.map(|id| id.to_string()),
                entry.created_at,
                entry.updated_at,
                entry.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("journal entry", entry.id));
        }
        replace_tags_in_tx(&tx, &entry.id.to_string(), &entry.tags)?;
        tx.commit()?;
        Ok(())
    }

    fn delete(&self, id: EntryId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM journal_entries WHERE uuid = ?1;",
            [id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("journal entry", id));
        }
        Ok(())
    }
}

fn replace_tags_in_tx(tx: &Transaction<'_>, entry_uuid: &str, tags: &[String]) -> RepoResult<()> {
    tx.execute("DELETE FROM entry_tags WHERE entry_uuid = ?1;", [entry_uuid])?;
    for (position, tag) in tags.iter().enumerate() {
        tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [tag.as_str()])?;
        tx.execute(
            "INSERT OR IGNORE INTO entry_tags (entry_uuid, tag_id, position)
             SELECT ?1, id, ?2
             FROM tags
             WHERE name = ?3 COLLATE NOCASE;",
            params![entry_uuid, position as i64, tag.as_str()],
        )?;
    }
    Ok(())
}

fn load_tags_for_entry(conn: &Connection, entry_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM entry_tags et
         INNER JOIN tags t ON t.id = et.tag_id
         WHERE et.entry_uuid = ?1
         ORDER BY et.position ASC;",
    )?;
    let mut rows = stmt.query([entry_uuid])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        tags.push(value.to_lowercase());
    }
    Ok(tags)
}
