//! # Trail Store
//!
//! Append-only storage of location fixes, grouped by trail id.
//!
//! ## Guarantees
//!
//! - Fixes are never updated or deleted once written.
//! - `read_trail` returns fixes by ascending timestamp; equal timestamps keep
//!   insertion order. Unknown trails read back as an empty list.
//! - One connection per handle behind a mutex, so writes from a handle are
//!   serialized. Several handles may share a database file: WAL journaling
//!   lets readers proceed while another handle writes, and the busy timeout
//!   bounds how long a write waits for the file lock.
//! - Dropping the handle closes its connection.
//! - Fix ids are SQLite rowids, so tables keyed on `id` or on the first
//!   release's `_id` read the same way.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, info};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::config::TrailConfig;
use crate::error::{RecordError, Result, StoreAccess};
use crate::migrations;
use trailcore::{FixId, LocationFix};

/// Storage boundary used by ingestion and aggregation.
pub trait TrailStore: Send + Sync {
    /// Persist one fix and return the id assigned to it.
    fn append(&self, fix: &LocationFix) -> Result<FixId>;

    /// All fixes of a trail in chronological order.
    fn read_trail(&self, trail_id: &str) -> Result<Vec<LocationFix>>;

    /// One entry per stored trail, most recently recorded first.
    fn list_trails(&self) -> Result<Vec<TrailListing>>;
}

/// Lightweight trail metadata for list views (no fixes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailListing {
    pub trail_id: String,
    pub fix_count: u64,
    pub first_timestamp_millis: i64,
    pub last_timestamp_millis: i64,
}

/// SQLite-backed trail store.
pub struct SqliteTrailStore {
    /// Database connection
    db: Mutex<Connection>,
}

impl SqliteTrailStore {
    /// Open (or create) the store at `db_path` and migrate it to the current schema.
    pub fn open(db_path: &str, config: &TrailConfig) -> Result<Self> {
        let mut conn = Connection::open(db_path).map_err(RecordError::StoreUnavailable)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(RecordError::StoreUnavailable)?;

        // In-memory databases report "memory" and stay that way
        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(RecordError::StoreUnavailable)?;

        migrations::migrate(&mut conn)?;

        info!(
            "trailrec: [TrailStore] Opened {} (journal_mode={})",
            db_path, journal_mode
        );

        Ok(Self {
            db: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:", &TrailConfig::default())
    }

    /// Number of fixes stored for one trail.
    pub fn fix_count(&self, trail_id: &str) -> Result<u64> {
        let db = self.lock(StoreAccess::Read)?;
        db.query_row(
            "SELECT COUNT(*) FROM trails WHERE trail_id = ?",
            params![trail_id],
            |row| row.get::<_, i64>(0),
        )
        .map(|count| count as u64)
        .map_err(|source| RecordError::StorageRead {
            trail_id: trail_id.to_string(),
            source,
        })
    }

    fn lock(&self, access: StoreAccess) -> Result<MutexGuard<'_, Connection>> {
        self.db
            .lock()
            .map_err(|_| RecordError::StorePoisoned(access))
    }
}

impl TrailStore for SqliteTrailStore {
    fn append(&self, fix: &LocationFix) -> Result<FixId> {
        fix.validate()?;

        let db = self.lock(StoreAccess::Write)?;
        db.execute(
            "INSERT INTO trails (trail_id, latitude, longitude, timestamp) VALUES (?, ?, ?, ?)",
            params![
                fix.trail_id,
                fix.latitude,
                fix.longitude,
                fix.timestamp_millis
            ],
        )
        .map_err(|source| RecordError::StorageWrite {
            trail_id: fix.trail_id.clone(),
            source,
        })?;

        let id = FixId(db.last_insert_rowid());
        debug!(
            "trailrec: [TrailStore] Appended fix {} to trail {}",
            id.0, fix.trail_id
        );
        Ok(id)
    }

    fn read_trail(&self, trail_id: &str) -> Result<Vec<LocationFix>> {
        let read_error = |source| RecordError::StorageRead {
            trail_id: trail_id.to_string(),
            source,
        };

        let db = self.lock(StoreAccess::Read)?;
        let mut stmt = db
            .prepare(
                "SELECT rowid, trail_id, latitude, longitude, timestamp
                 FROM trails
                 WHERE trail_id = ?
                 ORDER BY timestamp ASC, rowid ASC",
            )
            .map_err(read_error)?;

        let fixes = stmt
            .query_map(params![trail_id], |row| {
                Ok(LocationFix {
                    id: Some(FixId(row.get(0)?)),
                    trail_id: row.get(1)?,
                    latitude: row.get(2)?,
                    longitude: row.get(3)?,
                    timestamp_millis: row.get(4)?,
                })
            })
            .map_err(read_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(read_error)?;

        Ok(fixes)
    }

    fn list_trails(&self) -> Result<Vec<TrailListing>> {
        let read_error = |source| RecordError::StorageRead {
            trail_id: "*".to_string(),
            source,
        };

        let db = self.lock(StoreAccess::Read)?;
        let mut stmt = db
            .prepare(
                "SELECT trail_id, COUNT(*), MIN(timestamp), MAX(timestamp)
                 FROM trails
                 GROUP BY trail_id
                 ORDER BY MAX(timestamp) DESC, trail_id ASC",
            )
            .map_err(read_error)?;

        let listings = stmt
            .query_map([], |row| {
                Ok(TrailListing {
                    trail_id: row.get(0)?,
                    fix_count: row.get::<_, i64>(1)? as u64,
                    first_timestamp_millis: row.get(2)?,
                    last_timestamp_millis: row.get(3)?,
                })
            })
            .map_err(read_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(read_error)?;

        Ok(listings)
    }
}

// ============================================================================
// Tests
// ============================================================================
