use chrono::{DateTime, Utc};
use roadwatch_core::{LocationKey, LocationMemory, MemoryRecord, RecordMetadata, StoreError};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable LocationMemory on a single SQLite file.
///
/// Rows are only ever inserted. `(location, timestamp_us)` is indexed so the
/// recency check and history never scan the whole table.
pub struct SqliteMemory {
    conn: Mutex<Connection>,
}

impl SqliteMemory {
    pub fn open(db_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path).map_err(backend)?;
        // WAL lets a second process read while this one appends
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            warn!("failed to enable WAL mode: {err}");
        }
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory().map_err(backend)?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT).map_err(backend)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS memory_records (
                record_id TEXT PRIMARY KEY,
                location TEXT NOT NULL,
                timestamp_us INTEGER NOT NULL,
                summary_text TEXT NOT NULL,
                metadata TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_location_time ON memory_records(location, timestamp_us);
            CREATE INDEX IF NOT EXISTS idx_time ON memory_records(timestamp_us);
            ",
        )
        .map_err(backend)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("connection lock poisoned".to_string()))
    }

    fn query_records(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let mut stmt = conn.prepare(sql).map_err(backend)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(RawRow {
                    record_id: row.get(0)?,
                    location: row.get(1)?,
                    timestamp_us: row.get(2)?,
                    summary_text: row.get(3)?,
                    metadata: row.get(4)?,
                })
            })
            .map_err(backend)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row.map_err(backend)?.into_record()?);
        }
        Ok(records)
    }
}

impl LocationMemory for SqliteMemory {
    fn append(&self, record: &MemoryRecord) -> Result<(), StoreError> {
        let metadata = serde_json::to_string(&record.metadata)?;
        let conn = self.lock()?;
        let result = conn.execute(
            "INSERT INTO memory_records (record_id, location, timestamp_us, summary_text, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.record_id,
                record.location.as_str(),
                record.timestamp.timestamp_micros(),
                record.summary_text,
                metadata,
            ],
        );

        match result {
            Ok(_) => {
                debug!(record_id = %record.record_id, "record appended");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateId(record.record_id.clone()))
            }
            Err(err) => Err(backend(err)),
        }
    }

    fn last_reported_after(
        &self,
        location: &LocationKey,
        after: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let conn = self.lock()?;
        let latest: Option<i64> = conn
            .query_row(
                "SELECT MAX(timestamp_us) FROM memory_records
                 WHERE location = ?1 AND timestamp_us > ?2",
                params![location.as_str(), after.timestamp_micros()],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?
            .flatten();

        latest
            .map(|us| {
                DateTime::from_timestamp_micros(us).ok_or_else(|| StoreError::Corrupt {
                    record_id: format!("{}@{}", location, us),
                    reason: "timestamp out of range".to_string(),
                })
            })
            .transpose()
    }

    fn history(
        &self,
        location: &LocationKey,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let conn = self.lock()?;
        Self::query_records(
            &conn,
            "SELECT record_id, location, timestamp_us, summary_text, metadata
             FROM memory_records WHERE location = ?1
             ORDER BY timestamp_us DESC, rowid DESC LIMIT ?2",
            params![location.as_str(), clamp_limit(limit)],
        )
    }

    fn recent(&self, limit: usize) -> Result<Vec<MemoryRecord>, StoreError> {
        let conn = self.lock()?;
        Self::query_records(
            &conn,
            "SELECT record_id, location, timestamp_us, summary_text, metadata
             FROM memory_records ORDER BY timestamp_us DESC, rowid DESC LIMIT ?1",
            params![clamp_limit(limit)],
        )
    }

    fn len(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM memory_records", [], |row| row.get(0))
            .map_err(backend)?;
        Ok(count.max(0) as usize)
    }
}

struct RawRow {
    record_id: String,
    location: String,
    timestamp_us: i64,
    summary_text: String,
    metadata: String,
}

impl RawRow {
    fn into_record(self) -> Result<MemoryRecord, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            record_id: self.record_id.clone(),
            reason,
        };
        let timestamp = DateTime::from_timestamp_micros(self.timestamp_us)
            .ok_or_else(|| corrupt("timestamp out of range".to_string()))?;
        let metadata: RecordMetadata =
            serde_json::from_str(&self.metadata).map_err(|e| corrupt(e.to_string()))?;

        Ok(MemoryRecord {
            record_id: self.record_id,
            location: LocationKey::from_stored(self.location),
            timestamp,
            summary_text: self.summary_text,
            metadata,
        })
    }
}

fn clamp_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn backend(err: rusqlite::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}
