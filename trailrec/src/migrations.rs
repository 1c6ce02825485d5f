//! Schema migrations for the trail store.
//!
//! The schema version lives in SQLite's `user_version`, the same counter the
//! first release of the app used, so a database written by that release
//! (version 1, no `trail_id` column, rows keyed on `_id`) is upgraded in
//! place. The key column is left as it is; the store reads rowids.

use log::info;
use rusqlite::Connection;
use rusqlite_migration::{M, Migrations};

use crate::error::{RecordError, Result};

/// Version the schema is at after all migrations ran.
pub const SCHEMA_VERSION: i64 = 3;

/// Version that introduced the `trail_id` column.
const TRAIL_ID_VERSION: i64 = 2;

/// All schema migrations, oldest first. Only ever append to this list.
pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![
        // v1: first release, one trail per database
        M::up(
            "CREATE TABLE IF NOT EXISTS trails (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                timestamp INTEGER NOT NULL
            );",
        ),
        // v2: group fixes by trail; pre-existing rows land in trail ''
        M::up("ALTER TABLE trails ADD COLUMN trail_id TEXT NOT NULL DEFAULT '';"),
        // v3: reads are always by trail, ordered by time
        M::up(
            "CREATE INDEX IF NOT EXISTS idx_trails_trail_id_timestamp
             ON trails(trail_id, timestamp);",
        ),
    ])
}

/// Bring the database up to [`SCHEMA_VERSION`].
pub fn migrate(conn: &mut Connection) -> Result<()> {
    reconcile_legacy_version(conn)?;

    let before = user_version(conn)?;
    migrations().to_latest(conn)?;

    if before < SCHEMA_VERSION {
        info!(
            "trailrec: [Migrations] Schema migrated from v{} to v{}",
            before, SCHEMA_VERSION
        );
    }
    Ok(())
}

/// Check if the `trails` table already carries a `trail_id` column.
pub fn has_trail_id_column(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .prepare("SELECT COUNT(*) FROM pragma_table_info('trails') WHERE name = 'trail_id'")
        .and_then(|mut stmt| stmt.query_row([], |row| row.get(0)))
        .map_err(RecordError::StoreUnavailable)?;

    Ok(count > 0)
}

pub fn user_version(conn: &Connection) -> Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(RecordError::StoreUnavailable)
}

/// A database can carry the `trail_id` column without a matching version
/// (created by hand or by a build that never set `user_version`). Re-running
/// the `ALTER TABLE` would fail, so mark it as already applied.
fn reconcile_legacy_version(conn: &Connection) -> Result<()> {
    let version = user_version(conn)?;
    if version >= TRAIL_ID_VERSION || !has_trail_id_column(conn)? {
        return Ok(());
    }

    info!(
        "trailrec: [Migrations] trail_id already present at v{}, marking v{} applied",
        version, TRAIL_ID_VERSION
    );
    conn.pragma_update(None, "user_version", TRAIL_ID_VERSION)
        .map_err(RecordError::StoreUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    #[test]
    fn test_migrations_are_valid() {
        assert!(migrations().validate().is_ok());
    }

    #[test]
    fn test_fresh_database() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        assert_eq!(user_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(has_trail_id_column(&conn).unwrap());
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();
        assert_eq!(user_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_legacy_v1_rows_get_empty_trail_id() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE trails (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                timestamp INTEGER NOT NULL
            );
            INSERT INTO trails (latitude, longitude, timestamp) VALUES (1.0, 2.0, 100);
            PRAGMA user_version = 1;",
        )
        .unwrap();

        migrate(&mut conn).unwrap();

        let trail_id: String = conn
            .query_row("SELECT trail_id FROM trails WHERE timestamp = 100", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(trail_id, "");
    }

    #[test]
    fn test_unversioned_database_with_trail_id() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE trails (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                trail_id TEXT NOT NULL,
                latitude REAL NOT NULL,
                longitude REAL NOT NULL,
                timestamp INTEGER NOT NULL
            );",
        )
        .unwrap();
        conn.execute(
            "INSERT INTO trails (trail_id, latitude, longitude, timestamp) VALUES (?1, 0, 0, 0)",
            params!["kept"],
        )
        .unwrap();

        migrate(&mut conn).unwrap();

        assert_eq!(user_version(&conn).unwrap(), SCHEMA_VERSION);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM trails WHERE trail_id = 'kept'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(count, 1);
    }
}
