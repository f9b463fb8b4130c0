//! Builtin catalog seeding.
//!
//! # Invariants
//! - A catalog table is only seeded while empty; curated rows are never overwritten.
//! - Seeding runs in one transaction.

use super::DbResult;
use crate::catalog::{builtin_elements, builtin_sessions, builtin_sounds};
use log::info;
use rusqlite::{params, Connection, Transaction};

/// Inserts builtin elements, sessions and sounds into empty catalog tables.
pub fn seed_builtin_catalog(conn: &Connection) -> DbResult<()> {
    let tx = conn.unchecked_transaction()?;
    let mut seeded = Vec::new();

    if table_is_empty(&tx, "catalog_elements")? {
        for element in builtin_elements() {
            tx.execute(
                "INSERT INTO catalog_elements (
                    id, name, kind, subtype, category, description, icon, color, width, height
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
                params![
                    element.id,
                    element.name,
                    element.kind.as_str(),
                    element.subtype,
                    element.category,
                    element.description,
                    element.icon,
                    element.color,
                    element.width,
                    element.height,
                ],
            )?;
        }
        seeded.push("catalog_elements");
    }

    if table_is_empty(&tx, "meditation_sessions")? {
        for session in builtin_sessions() {
            tx.execute(
                "INSERT INTO meditation_sessions (
                    id, title, description, duration_secs, category, difficulty,
                    instructor, thumbnail, audio_url
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    session.id,
                    session.title,
                    session.description,
                    session.duration_secs,
                    session.category,
                    session.difficulty.as_str(),
                    session.instructor,
                    session.thumbnail,
                    session.audio_url,
                ],
            )?;
        }
        seeded.push("meditation_sessions");
    }

    if table_is_empty(&tx, "ambient_sounds")? {
        for sound in builtin_sounds() {
            tx.execute(
                "INSERT INTO ambient_sounds (
                    id, name, description, category, icon, color, popular, audio_url,
                    duration_secs, volume
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
                params![
                    sound.id,
                    sound.name,
                    sound.description,
                    sound.category,
                    sound.icon,
                    sound.color,
                    sound.popular,
                    sound.audio_url,
                    sound.duration_secs,
                    sound.volume.map(f64::from),
                ],
            )?;
        }
        seeded.push("ambient_sounds");
    }

    tx.commit()?;
    if !seeded.is_empty() {
        info!(
            "event=catalog_seed module=db status=ok tables={}",
            seeded.join(",")
        );
    }
    Ok(())
}

fn table_is_empty(tx: &Transaction<'_>, table: &str) -> DbResult<bool> {
    let exists: i64 = tx.query_row(
        &format!("SELECT EXISTS(SELECT 1 FROM {table});"),
        [],
        |row| row.get(0),
    )?;
    Ok(exists == 0)
}
