use std::path::PathBuf;

use tracing::warn;

use crate::domain::entities::collection::CollectionKind;
use crate::domain::entities::record::{FieldMap, Record, RecordId};
use crate::infra::sqlite::queries::{
    insert_record, load_record, load_records, mark_deleted, mark_deleted_batch, purge_record,
    update_record,
};
use crate::infra::sqlite::schema::init_db;
use crate::usecase::ports::repo::{
    delete_batches, CollectionRepository, ErrorHandler, RepoError, SnapshotHandler, Subscribers,
    Subscription,
};

/// SQLite-backed document store. Every committed mutation pushes a fresh full
/// snapshot to that collection's subscribers.
pub struct SqliteRepo {
    db_path: PathBuf,
    subscribers: Subscribers,
}

impl SqliteRepo {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            subscribers: Subscribers::new(),
        }
    }

    fn push_snapshot(&self, collection: CollectionKind) {
        match load_records(&self.db_path, collection, false) {
            Ok(snapshot) => self.subscribers.notify(collection, &snapshot),
            Err(err) => {
                let error = RepoError::operation_failed("snapshot reload", err);
                warn!(collection = collection.storage_name(), %error, "snapshot push failed");
                self.subscribers.notify_error(collection, &error);
            }
        }
    }
}

impl CollectionRepository for SqliteRepo {
    fn init(&self) -> Result<(), RepoError> {
        init_db(&self.db_path).map_err(|err| RepoError::operation_failed("init", err))
    }

    fn get_all(
        &self,
        collection: CollectionKind,
        include_deleted: bool,
    ) -> Result<Vec<Record>, RepoError> {
        load_records(&self.db_path, collection, include_deleted)
            .map_err(|err| RepoError::operation_failed("get_all", err))
    }

    fn get_by_id(&self, collection: CollectionKind, id: &RecordId) -> Result<Record, RepoError> {
        load_record(&self.db_path, collection, id)
            .map_err(|err| RepoError::operation_failed("get_by_id", err))?
            .ok_or_else(|| RepoError::not_found(collection, id))
    }

    fn create(&self, collection: CollectionKind, fields: FieldMap) -> Result<Record, RepoError> {
        let record = insert_record(&self.db_path, collection, fields)
            .map_err(|err| RepoError::operation_failed("create", err))?;
        self.push_snapshot(collection);
        Ok(record)
    }

    fn update(
        &self,
        collection: CollectionKind,
        id: &RecordId,
        partial: FieldMap,
    ) -> Result<Record, RepoError> {
        let updated = update_record(&self.db_path, collection, id, &partial)
            .map_err(|err| RepoError::operation_failed("update", err))?
            .ok_or_else(|| RepoError::not_found(collection, id))?;
        self.push_snapshot(collection);
        Ok(updated)
    }

    fn delete(&self, collection: CollectionKind, id: &RecordId) -> Result<(), RepoError> {
        let deleted = mark_deleted(&self.db_path, collection, id)
            .map_err(|err| RepoError::operation_failed("delete", err))?;
        if !deleted {
            return Err(RepoError::not_found(collection, id));
        }
        self.push_snapshot(collection);
        Ok(())
    }

    fn purge(&self, collection: CollectionKind, id: &RecordId) -> Result<(), RepoError> {
        let purged = purge_record(&self.db_path, collection, id)
            .map_err(|err| RepoError::operation_failed("purge", err))?;
        if !purged {
            return Err(RepoError::not_found(collection, id));
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
            deleted += mark_deleted_batch(&self.db_path, collection, batch)
                .map_err(|err| RepoError::operation_failed("delete_many", err))?;
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
