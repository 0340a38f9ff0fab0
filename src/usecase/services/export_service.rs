use std::path::Path;

use anyhow::Result;

use crate::domain::entities::collection::CollectionKind;
use crate::domain::entities::record::Record;
use crate::infra::export::csv::export_visible_csv;

/// Writes the current (already searched/filtered/sorted) view to disk with
/// only the visible columns.
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    pub fn export_csv(
        &self,
        path: &Path,
        collection: CollectionKind,
        records: &[Record],
    ) -> Result<usize> {
        export_visible_csv(path, collection, records)
    }
}

impl Default for ExportService {
    fn default() -> Self {
        ExportService::new()
    }
}
