use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::collection::CollectionKind;
use crate::domain::entities::record::{FieldMap, Record, RecordId};
use crate::usecase::ports::repo::{
    delete_batches, CollectionRepository, ErrorHandler, RepoError, SnapshotHandler, Subscribers,
    Subscription,
};

type Store = HashMap<CollectionKind, Vec<Record>>;

/// In-memory adapter with the same contract as the SQLite store. Used by
/// tests and available for offline demos.
pub struct MemoryRepo {
    store: Mutex<Store>,
    subscribers: Subscribers,
}

impl MemoryRepo {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            subscribers: Subscribers::new(),
        }
    }

    fn lock_store(&self) -> MutexGuard<'_, Store> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn push_snapshot(&self, collection: CollectionKind) {
        let snapshot: Vec<Record> = self
            .lock_store()
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| !record.is_deleted())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        self.subscribers.notify(collection, &snapshot);
    }
}

impl Default for MemoryRepo {
    fn default() -> Self {
        MemoryRepo::new()
    }
}

impl CollectionRepository for MemoryRepo {
    fn init(&self) -> Result<(), RepoError> {
        Ok(())
    }

    fn get_all(
        &self,
        collection: CollectionKind,
        include_deleted: bool,
    ) -> Result<Vec<Record>, RepoError> {
        Ok(self
            .lock_store()
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| include_deleted || !record.is_deleted())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get_by_id(&self, collection: CollectionKind, id: &RecordId) -> Result<Record, RepoError> {
        self.lock_store()
            .get(&collection)
            .and_then(|records| records.iter().find(|record| &record.id == id))
            .cloned()
            .ok_or_else(|| RepoError::not_found(collection, id))
    }

    fn create(&self, collection: CollectionKind, fields: FieldMap) -> Result<Record, RepoError> {
        let now = Utc::now().to_rfc3339();
        let record = Record {
            id: RecordId(Uuid::new_v4().to_string()),
            fields,
            created_at: Some(now.clone()),
            updated_at: Some(now),
            deleted_at: None,
        };
        self.lock_store()
            .entry(collection)
            .or_default()
            .push(record.clone());
        self.push_snapshot(collection);
        Ok(record)
    }

    fn update(
        &self,
        collection: CollectionKind,
        id: &RecordId,
        partial: FieldMap,
    ) -> Result<Record, RepoError> {
        let updated = {
            let mut store = self.lock_store();
            let record = store
                .get_mut(&collection)
                .and_then(|records| records.iter_mut().find(|record| &record.id == id))
                .ok_or_else(|| RepoError::not_found(collection, id))?;
            for (name, value) in partial {
                record.fields.insert(name, value);
            }
            record.updated_at = Some(Utc::now().to_rfc3339());
            record.clone()
        };
        self.push_snapshot(collection);
        Ok(updated)
    }

    fn delete(&self, collection: CollectionKind, id: &RecordId) -> Result<(), RepoError> {
        {
            let mut store = self.lock_store();
            let record = store
                .get_mut(&collection)
                .and_then(|records| {
                    records
                        .iter_mut()
                        .find(|record| &record.id == id && !record.is_deleted())
                })
                .ok_or_else(|| RepoError::not_found(collection, id))?;
            record.deleted_at = Some(Utc::now().to_rfc3339());
        }
        self.push_snapshot(collection);
        Ok(())
    }

    fn purge(&self, collection: CollectionKind, id: &RecordId) -> Result<(), RepoError> {
        {
            let mut store = self.lock_store();
            let records = store
                .get_mut(&collection)
                .ok_or_else(|| RepoError::not_found(collection, id))?;
            let before = records.len();
            records.retain(|record| &record.id != id);
            if records.len() == before {
                return Err(RepoError::not_found(collection, id));
            }
        }
        self.push_snapshot(collection);
        Ok(())
    }

    fn delete_many(
        &self,
        collection: CollectionKind,
        ids: &[RecordId],
    ) -> Result<usize, RepoError> {
        let mut deleted = 0;
        for batch in delete_batches(ids) {
            let mut store = self.lock_store();
            if let Some(records) = store.get_mut(&collection) {
                let now = Utc::now().to_rfc3339();
                for record in records.iter_mut() {
                    if batch.contains(&record.id) && !record.is_deleted() {
                        record.deleted_at = Some(now.clone());
                        deleted += 1;
                    }
                }
            }
        }
        if deleted > 0 {
            self.push_snapshot(collection);
        }
        Ok(deleted)
    }

    fn subscribe(
        &self,
        collection: CollectionKind,
        on_data: SnapshotHandler,
        on_error: ErrorHandler,
    ) -> Subscription {
        self.subscribers.add(collection, on_data, on_error)
    }
}
