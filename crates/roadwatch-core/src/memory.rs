//! Location memory: append-only record log with recency lookup by exact key

use crate::error::StoreError;
use crate::types::{LocationKey, MemoryRecord};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::warn;

/// Durable store of reported observations.
///
/// Records are never updated or deleted. Lookups match the location key
/// exactly; similar-looking keys are different locations.
pub trait LocationMemory: Send + Sync {
    /// Persist a new record. Repeat locations are expected; a repeated
    /// `record_id` is a `DuplicateId` error.
    fn append(&self, record: &MemoryRecord) -> Result<(), StoreError>;

    /// Newest timestamp recorded for `location` strictly after `after`
    fn last_reported_after(
        &self,
        location: &LocationKey,
        after: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Records for `location`, most recent first, at most `limit`
    fn history(&self, location: &LocationKey, limit: usize)
        -> Result<Vec<MemoryRecord>, StoreError>;

    /// Records across all locations, most recent first, at most `limit`
    fn recent(&self, limit: usize) -> Result<Vec<MemoryRecord>, StoreError>;

    fn len(&self) -> Result<usize, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Strict form of the recency check: true iff some record for `location`
    /// has `timestamp > now - window`
    fn reported_within(
        &self,
        location: &LocationKey,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        Ok(self.last_reported_after(location, now - window)?.is_some())
    }

    /// Recency check that fails open: a store error reads as "not reported"
    fn was_reported_within(&self, location: &LocationKey, window: Duration, now: DateTime<Utc>) -> bool {
        match self.reported_within(location, window, now) {
            Ok(reported) => reported,
            Err(e) => {
                warn!(location = %location, error = %e, "recency check failed, treating as not reported");
                false
            }
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, MemoryRecord>,
    /// location -> (timestamp, record_id), ascending by timestamp
    by_location: HashMap<LocationKey, Vec<(DateTime<Utc>, String)>>,
}

/// Process-local LocationMemory, used by tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryMemory {
    inner: RwLock<Inner>,
}

impl InMemoryMemory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl LocationMemory for InMemoryMemory {
    fn append(&self, record: &MemoryRecord) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.records.contains_key(&record.record_id) {
            return Err(StoreError::DuplicateId(record.record_id.clone()));
        }

        let entries = inner.by_location.entry(record.location.clone()).or_default();
        let at = entries.partition_point(|(ts, _)| *ts <= record.timestamp);
        entries.insert(at, (record.timestamp, record.record_id.clone()));
        inner
            .records
            .insert(record.record_id.clone(), record.clone());
        Ok(())
    }

    fn last_reported_after(
        &self,
        location: &LocationKey,
        after: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        let inner = self.read();
        Ok(inner
            .by_location
            .get(location)
            .and_then(|entries| entries.last())
            .map(|(ts, _)| *ts)
            .filter(|ts| *ts > after))
    }

    fn history(
        &self,
        location: &LocationKey,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let inner = self.read();
        let Some(entries) = inner.by_location.get(location) else {
            return Ok(Vec::new());
        };
        Ok(entries
            .iter()
            .rev()
            .take(limit)
            .filter_map(|(_, id)| inner.records.get(id).cloned())
            .collect())
    }

    fn recent(&self, limit: usize) -> Result<Vec<MemoryRecord>, StoreError> {
        let inner = self.read();
        let mut all: Vec<&MemoryRecord> = inner.records.values().collect();
        all.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.record_id.cmp(&a.record_id))
        });
        Ok(all.into_iter().take(limit).cloned().collect())
    }

    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read().records.len())
    }
}
