//! In-Memory Reading Repository
//!
//! Thread-safe store for [`BpReading`]s backed by a `RwLock<Vec<_>>`.
//!
//! # Limitations
//!
//! - Data is lost on application restart
//! - Limited by available RAM
//!
//! For persistence across runs, export with `infrastructure::persistence`
//! or implement `ReadingRepository` over a database.

use crate::domain::ports::ReadingRepository;
use crate::domain::reading::BpReading;
use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory implementation of ReadingRepository.
/// Readings are kept sorted by timestamp.
#[derive(Clone, Default)]
pub struct InMemoryReadingRepository {
    readings: Arc<RwLock<Vec<BpReading>>>,
}

impl InMemoryReadingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<BpReading>>> {
        self.readings
            .read()
            .map_err(|_| anyhow!("reading store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<BpReading>>> {
        self.readings
            .write()
            .map_err(|_| anyhow!("reading store lock poisoned"))
    }
}

fn insert_sorted(readings: &mut Vec<BpReading>, reading: BpReading) {
    // Equal timestamps keep insertion order.
    let at = readings.partition_point(|r| r.timestamp <= reading.timestamp);
    readings.insert(at, reading);
}

impl ReadingRepository for InMemoryReadingRepository {
    fn save(&self, reading: &BpReading) -> Result<()> {
        insert_sorted(&mut *self.write()?, reading.clone());
        Ok(())
    }

    fn save_all(&self, readings: &[BpReading]) -> Result<()> {
        let mut store = self.write()?;
        for reading in readings {
            insert_sorted(&mut store, reading.clone());
        }
        Ok(())
    }

    fn latest(&self) -> Result<Option<BpReading>> {
        Ok(self.read()?.last().cloned())
    }

    fn in_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<BpReading>> {
        Ok(self
            .read()?
            .iter()
            .filter(|r| r.timestamp >= start && r.timestamp <= end)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<BpReading>> {
        Ok(self.read()?.clone())
    }

    fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }
}
