use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::domain::entities::collection::CollectionKind;
use crate::domain::entities::flag::{can_toggle, FeatureFlag, FLAG_DEFAULTS};
use crate::domain::entities::record::{FieldMap, FieldValue, Record};
use crate::usecase::ports::repo::{CollectionRepository, RepoError};

/// Feature-flag reads and the one write path the UI is allowed to use. The
/// lock check lives here, not in the store, so this service is the
/// enforcement point every caller must go through.
pub struct FlagService {
    repo: Arc<dyn CollectionRepository>,
}

impl FlagService {
    pub fn new(repo: Arc<dyn CollectionRepository>) -> Self {
        Self { repo }
    }

    pub fn list_flags(&self) -> Result<Vec<FeatureFlag>, RepoError> {
        let records = self.repo.get_all(CollectionKind::FeatureFlags, false)?;
        Ok(records.iter().map(FeatureFlag::from_record).collect())
    }

    /// Flips a flag and stamps the audit fields. A locked flag is rejected
    /// with the store untouched.
    pub fn toggle(&self, key: &str, actor: &str) -> Result<FeatureFlag, RepoError> {
        let (record, flag) = self.find_flag(key)?;
        if !can_toggle(&flag) {
            return Err(RepoError::ValidationFailed(format!(
                "feature flag '{key}' is locked"
            )));
        }

        let mut partial = FieldMap::new();
        partial.insert("enabled".to_string(), FieldValue::Bool(!flag.enabled));
        partial.insert("last_modified_by".to_string(), actor.into());
        partial.insert(
            "last_modified_at".to_string(),
            FieldValue::Text(Utc::now().to_rfc3339()),
        );

        let updated = self
            .repo
            .update(CollectionKind::FeatureFlags, &record.id, partial)?;
        info!(key, enabled = !flag.enabled, actor, "toggled feature flag");
        Ok(FeatureFlag::from_record(&updated))
    }

    /// Writes any missing compile-time default into the store, locked flags
    /// included. Seeding is the only path that may set a locked flag.
    pub fn seed_defaults(&self) -> Result<usize, RepoError> {
        let existing = self.list_flags()?;
        let mut seeded = 0;
        for default in FLAG_DEFAULTS {
            if existing.iter().any(|flag| flag.key == default.key) {
                continue;
            }
            let flag = FeatureFlag::from(*default);
            self.repo
                .create(CollectionKind::FeatureFlags, flag.to_fields())?;
            seeded += 1;
        }
        if seeded > 0 {
            info!(seeded, "seeded default feature flags");
        }
        Ok(seeded)
    }

    fn find_flag(&self, key: &str) -> Result<(Record, FeatureFlag), RepoError> {
        let records = self.repo.get_all(CollectionKind::FeatureFlags, false)?;
        records
            .into_iter()
            .find(|record| record.field_string("key") == key)
            .map(|record| {
                let flag = FeatureFlag::from_record(&record);
                (record, flag)
            })
            .ok_or_else(|| RepoError::NotFound {
                collection: CollectionKind::FeatureFlags.storage_name().to_string(),
                id: key.to_string(),
            })
    }
}
