use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::entities::collection::{field_config, CollectionKind};
use crate::domain::entities::record::{FieldMap, Record, RecordId};
use crate::usecase::ports::repo::{
    CollectionRepository, ErrorHandler, RepoError, SnapshotHandler, Subscription,
};

/// CRUD over one collection at a time. Thin by design; every call is a single
/// repository operation plus local validation.
pub struct ContentService {
    repo: Arc<dyn CollectionRepository>,
}

impl ContentService {
    pub fn new(repo: Arc<dyn CollectionRepository>) -> Self {
        Self { repo }
    }

    pub fn list(
        &self,
        collection: CollectionKind,
        include_deleted: bool,
    ) -> Result<Vec<Record>, RepoError> {
        self.repo.get_all(collection, include_deleted)
    }

    pub fn get(&self, collection: CollectionKind, id: &RecordId) -> Result<Record, RepoError> {
        self.repo.get_by_id(collection, id)
    }

    /// Required-field emptiness is rejected locally before any store call.
    pub fn create(
        &self,
        collection: CollectionKind,
        fields: FieldMap,
    ) -> Result<Record, RepoError> {
        validate_required_fields(collection, &fields)?;
        let record = self.repo.create(collection, fields)?;
        info!(
            collection = collection.storage_name(),
            id = %record.id,
            "created record"
        );
        Ok(record)
    }

    pub fn update(
        &self,
        collection: CollectionKind,
        id: &RecordId,
        partial: FieldMap,
    ) -> Result<Record, RepoError> {
        self.repo.update(collection, id, partial)
    }

    /// Soft delete. A double delete is a cosmetic race between two admin
    /// actions: logged and ignored.
    pub fn delete(&self, collection: CollectionKind, id: &RecordId) -> Result<(), RepoError> {
        match self.repo.delete(collection, id) {
            Ok(()) => {
                info!(collection = collection.storage_name(), id = %id, "deleted record");
                Ok(())
            }
            Err(RepoError::NotFound { .. }) => {
                warn!(
                    collection = collection.storage_name(),
                    id = %id,
                    "delete of missing record ignored"
                );
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub fn purge(&self, collection: CollectionKind, id: &RecordId) -> Result<(), RepoError> {
        self.repo.purge(collection, id)
    }

    pub fn delete_selected(
        &self,
        collection: CollectionKind,
        ids: &[RecordId],
    ) -> Result<usize, RepoError> {
        let deleted = self.repo.delete_many(collection, ids)?;
        info!(
            collection = collection.storage_name(),
            deleted, "bulk delete finished"
        );
        Ok(deleted)
    }

    pub fn subscribe(
        &self,
        collection: CollectionKind,
        on_data: SnapshotHandler,
        on_error: ErrorHandler,
    ) -> Subscription {
        self.repo.subscribe(collection, on_data, on_error)
    }

    /// Moderator application review. Approve/reject is a plain status update.
    pub fn review_application(
        &self,
        id: &RecordId,
        approved: bool,
    ) -> Result<Record, RepoError> {
        let status = if approved { "approved" } else { "rejected" };
        let mut partial = FieldMap::new();
        partial.insert("status".to_string(), status.into());
        self.repo
            .update(CollectionKind::ModeratorApplications, id, partial)
    }
}

/// Every required field must be present and non-empty after trimming.
pub fn validate_required_fields(
    collection: CollectionKind,
    fields: &FieldMap,
) -> Result<(), RepoError> {
    for required in field_config(collection).required_fields {
        let filled = fields
            .get(*required)
            .map(|value| !value.query_string().trim().is_empty())
            .unwrap_or(false);
        if !filled {
            return Err(RepoError::ValidationFailed(format!(
                "field '{required}' is required"
            )));
        }
    }
    Ok(())
}
