//! Ordered schema steps for the wellness database.
//!
//! # Invariants
//! - Step versions start at 1 and increase by one.
//! - Each step commits together with its `PRAGMA user_version` bump, so a
//!   failed step leaves the database at the previous version.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    SchemaStep {
        version: 2,
        name: "journal_tags",
        sql: include_str!("0002_journal_tags.sql"),
    },
    SchemaStep {
        version: 3,
        name: "session_completions",
        sql: include_str!("0003_session_completions.sql"),
    },
    SchemaStep {
        version: 4,
        name: "sound_details",
        sql: include_str!("0004_sound_details.sql"),
    },
];

/// Newest schema version this build can open.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?)
}

/// Brings the schema up to [`latest_version`], one step per transaction.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: latest,
        });
    }

    for step in SCHEMA_STEPS.iter().filter(|step| step.version > found) {
        apply_step(conn, step)?;
    }
    Ok(())
}

fn apply_step(conn: &mut Connection, step: &SchemaStep) -> DbResult<()> {
    let run = |conn: &mut Connection| -> rusqlite::Result<()> {
        let tx = conn.transaction()?;
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        tx.commit()
    };

    match run(conn) {
        Ok(()) => {
            info!(
                "event=db_migrate module=db status=ok version={} step={}",
                step.version, step.name
            );
            Ok(())
        }
        Err(source) => {
            error!(
                "event=db_migrate module=db status=error version={} step={} error={source}",
                step.version, step.name
            );
            Err(DbError::Migration {
                version: step.version,
                step: step.name,
                source,
            })
        }
    }
}
