use rusqlite::Connection;
use zengarden_core::db::migrations::{latest_version, schema_version};
use zengarden_core::db::{open_db, open_db_in_memory, seed_builtin_catalog, DbError};
use zengarden_core::repo::sound_repo::{SoundRepository, SqliteSoundRepository};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(version_of(&conn), latest_version());
    for table in [
        "gardens",
        "catalog_elements",
        "journal_entries",
        "tags",
        "entry_tags",
        "meditation_sessions",
        "ambient_sounds",
        "session_completions",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zengarden.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(version_of(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(version_of(&conn_second), latest_version());
    assert_table_exists(&conn_second, "gardens");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failed_schema_step_keeps_previous_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.db");

    // Claims version 3 but lacks the table step 4 alters.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 3;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::Migration { version, step, .. } => {
            assert_eq!(version, 4);
            assert_eq!(step, "sound_details");
        }
        other => panic!("unexpected error: {other}"),
    }
    let conn = Connection::open(&path).unwrap();
    assert_eq!(version_of(&conn), 3);
}

#[test]
fn upgrading_keeps_existing_sounds_without_details() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("v3.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0001_init.sql"))
        .unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0002_journal_tags.sql"))
        .unwrap();
    conn.execute_batch(include_str!("../src/db/migrations/0003_session_completions.sql"))
        .unwrap();
    conn.execute_batch(
        "INSERT INTO ambient_sounds (id, name, category, popular) VALUES (1, 'Rain', 'Nature', 1);
         PRAGMA user_version = 3;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(version_of(&conn), latest_version());
    let sounds = SqliteSoundRepository::try_new(&conn)
        .unwrap()
        .list_sounds()
        .unwrap();
    assert_eq!(sounds.len(), 1);
    assert_eq!(sounds[0].name, "Rain");
    assert_eq!(sounds[0].duration_secs, None);
    assert_eq!(sounds[0].volume, None);
}

#[test]
fn seeding_fills_empty_catalogs_once() {
    let conn = open_db_in_memory().unwrap();
    seed_builtin_catalog(&conn).unwrap();
    seed_builtin_catalog(&conn).unwrap();

    assert_eq!(row_count(&conn, "catalog_elements"), 7);
    assert_eq!(row_count(&conn, "meditation_sessions"), 5);
    assert_eq!(row_count(&conn, "ambient_sounds"), 6);
}

fn version_of(conn: &Connection) -> u32 {
    schema_version(conn).unwrap()
}

fn row_count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
