use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use geostore_types::Identifier;
use tracing::debug;

use crate::backend::RecordStore;
use crate::error::{DriverError, DriverResult};
use crate::record::FeatureRecord;

type RecordMap = HashMap<Identifier, FeatureRecord>;

/// In-memory, HashMap-based feature driver.
///
/// Intended for tests and embedding. The handle is cheap to clone; clones
/// share the same records. Every operation runs under one `RwLock`, so each
/// driver call is atomic with respect to the others.
#[derive(Clone, Default)]
pub struct InMemoryDriver {
    records: Arc<RwLock<RecordMap>>,
}

impl InMemoryDriver {
    /// Create a new empty driver.
    pub fn new() -> Self {
        Self::default()
    }

    fn read_lock(&self) -> DriverResult<RwLockReadGuard<'_, RecordMap>> {
        self.records
            .read()
            .map_err(|e| DriverError::Backend(format!("lock poisoned: {e}")))
    }

    fn write_lock(&self) -> DriverResult<RwLockWriteGuard<'_, RecordMap>> {
        self.records
            .write()
            .map_err(|e| DriverError::Backend(format!("lock poisoned: {e}")))
    }

    /// Number of features currently stored.
    pub fn len(&self) -> DriverResult<usize> {
        Ok(self.read_lock()?.len())
    }

    /// Returns `true` if no feature is stored.
    pub fn is_empty(&self) -> DriverResult<bool> {
        Ok(self.read_lock()?.is_empty())
    }

    pub fn contains(&self, id: &Identifier) -> DriverResult<bool> {
        Ok(self.read_lock()?.contains_key(id))
    }

    /// Sorted list of all stored identifiers.
    pub fn identifiers(&self) -> DriverResult<Vec<Identifier>> {
        let map = self.read_lock()?;
        let mut ids: Vec<Identifier> = map.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    /// Remove all features.
    pub fn clear(&self) -> DriverResult<()> {
        self.write_lock()?.clear();
        Ok(())
    }
}

impl RecordStore for InMemoryDriver {
    fn create_record(&self) -> DriverResult<Identifier> {
        let id = Identifier::generate();
        self.write_lock()?.insert(id.clone(), FeatureRecord::new());
        debug!(identifier = %id, "created feature record");
        Ok(id)
    }

    fn read_record<R>(
        &self,
        id: &Identifier,
        f: impl FnOnce(&FeatureRecord) -> DriverResult<R>,
    ) -> DriverResult<R> {
        let map = self.read_lock()?;
        let record = map.get(id).ok_or_else(|| DriverError::NotFound(id.clone()))?;
        f(record)
    }

    fn modify_record<R>(
        &self,
        id: &Identifier,
        f: impl FnOnce(&mut FeatureRecord) -> DriverResult<R>,
    ) -> DriverResult<R> {
        let mut map = self.write_lock()?;
        let created = !map.contains_key(id);
        let result = f(map.entry(id.clone()).or_default());
        if created {
            if result.is_err() {
                map.remove(id);
            } else {
                debug!(identifier = %id, "bound feature record on first write");
            }
        }
        result
    }

    fn remove_record(&self, id: &Identifier) -> DriverResult<bool> {
        let removed = self.write_lock()?.remove(id).is_some();
        if removed {
            debug!(identifier = %id, "removed feature record");
        }
        Ok(removed)
    }
}

impl std::fmt::Debug for InMemoryDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.records.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("InMemoryDriver")
            .field("feature_count", &count)
            .finish()
    }
}
