use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::domain::entities::collection::CollectionKind;
use crate::domain::entities::record::{FieldMap, Record, RecordId};

/// Backend batch ceiling for bulk writes. Deletes beyond this run as a
/// sequence of independently committed batches.
pub const DELETE_BATCH_LIMIT: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    NotFound { collection: String, id: String },
    OperationFailed { operation: String, message: String },
    ValidationFailed(String),
}

impl RepoError {
    pub fn operation_failed(operation: &str, message: impl std::fmt::Display) -> RepoError {
        RepoError::OperationFailed {
            operation: operation.to_string(),
            message: message.to_string(),
        }
    }

    pub fn not_found(collection: CollectionKind, id: &RecordId) -> RepoError {
        RepoError::NotFound {
            collection: collection.storage_name().to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for RepoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoError::NotFound { collection, id } => {
                write!(f, "no record '{id}' in collection '{collection}'")
            }
            RepoError::OperationFailed { operation, message } => {
                write!(f, "{operation} failed: {message}")
            }
            RepoError::ValidationFailed(message) => write!(f, "validation failed: {message}"),
        }
    }
}

impl std::error::Error for RepoError {}

pub type SnapshotHandler = Arc<dyn Fn(Vec<Record>) + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(RepoError) + Send + Sync>;

/// The minimal contract the console consumes. Domain and usecase code only
/// ever see this trait; adapters live under `infra`.
pub trait CollectionRepository: Send + Sync {
    fn init(&self) -> Result<(), RepoError>;

    fn get_all(
        &self,
        collection: CollectionKind,
        include_deleted: bool,
    ) -> Result<Vec<Record>, RepoError>;
    fn get_by_id(&self, collection: CollectionKind, id: &RecordId) -> Result<Record, RepoError>;

    /// Assigns an id plus creation/update timestamps.
    fn create(&self, collection: CollectionKind, fields: FieldMap) -> Result<Record, RepoError>;
    /// Merges the partial field map into the stored record. `NotFound` when
    /// the id is absent.
    fn update(
        &self,
        collection: CollectionKind,
        id: &RecordId,
        partial: FieldMap,
    ) -> Result<Record, RepoError>;

    /// Soft delete: marks `deleted_at`, keeps the record recoverable.
    fn delete(&self, collection: CollectionKind, id: &RecordId) -> Result<(), RepoError>;
    /// Permanent removal.
    fn purge(&self, collection: CollectionKind, id: &RecordId) -> Result<(), RepoError>;
    /// Chunked bulk soft-delete. Earlier batches stay committed when a later
    /// batch fails; there is no cross-batch atomicity.
    fn delete_many(
        &self,
        collection: CollectionKind,
        ids: &[RecordId],
    ) -> Result<usize, RepoError>;

    /// Live feed of full replacement snapshots. Dropping the returned guard
    /// unsubscribes.
    fn subscribe(
        &self,
        collection: CollectionKind,
        on_data: SnapshotHandler,
        on_error: ErrorHandler,
    ) -> Subscription;
}

/// Splits a bulk-delete id list into backend-sized batches.
pub fn delete_batches(ids: &[RecordId]) -> Vec<&[RecordId]> {
    if ids.is_empty() {
        return Vec::new();
    }
    ids.chunks(DELETE_BATCH_LIMIT).collect()
}

struct SubscriberEntry {
    collection: CollectionKind,
    on_data: SnapshotHandler,
    on_error: ErrorHandler,
}

type SubscriberMap = Mutex<HashMap<u64, SubscriberEntry>>;

fn lock_entries(entries: &SubscriberMap) -> MutexGuard<'_, HashMap<u64, SubscriberEntry>> {
    match entries.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Per-repository registry of live-update subscribers. Adapters call
/// `notify`/`notify_error` after every committed mutation.
pub struct Subscribers {
    entries: Arc<SubscriberMap>,
    next_id: AtomicU64,
}

impl Subscribers {
    pub fn new() -> Self {
        Subscribers {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn add(
        &self,
        collection: CollectionKind,
        on_data: SnapshotHandler,
        on_error: ErrorHandler,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock_entries(&self.entries).insert(
            id,
            SubscriberEntry {
                collection,
                on_data,
                on_error,
            },
        );
        Subscription {
            id,
            entries: Arc::downgrade(&self.entries),
        }
    }

    pub fn notify(&self, collection: CollectionKind, snapshot: &[Record]) {
        let handlers: Vec<SnapshotHandler> = lock_entries(&self.entries)
            .values()
            .filter(|entry| entry.collection == collection)
            .map(|entry| entry.on_data.clone())
            .collect();
        for handler in handlers {
            handler(snapshot.to_vec());
        }
    }

    pub fn notify_error(&self, collection: CollectionKind, error: &RepoError) {
        let handlers: Vec<ErrorHandler> = lock_entries(&self.entries)
            .values()
            .filter(|entry| entry.collection == collection)
            .map(|entry| entry.on_error.clone())
            .collect();
        for handler in handlers {
            handler(error.clone());
        }
    }
}

impl Default for Subscribers {
    fn default() -> Self {
        Subscribers::new()
    }
}

/// Active live-update registration. Dropping it (a view unmounting, or a
/// collection switch) removes the listener so a discarded view never gets
/// another push.
pub struct Subscription {
    id: u64,
    entries: Weak<SubscriberMap>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(entries) = self.entries.upgrade() {
            lock_entries(&entries).remove(&self.id);
        }
    }
}
