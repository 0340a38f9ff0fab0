use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::collection::{field_config, filter_item, CollectionKind};
use crate::domain::entities::record::Record;

/// Writes the given records as CSV, one column per visible field, in the
/// configured field order. Hidden fields never reach the file.
pub fn export_visible_csv(
    path: &Path,
    collection: CollectionKind,
    records: &[Record],
) -> Result<usize> {
    let visible = field_config(collection).visible_fields;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create csv: {}", path.display()))?;

    let mut header: Vec<&str> = vec!["id"];
    header.extend(visible.iter().copied());
    writer
        .write_record(&header)
        .context("failed to write csv header")?;

    for record in records {
        let stripped = filter_item(record, collection);
        let mut row: Vec<String> = vec![stripped.id.to_string()];
        for field in visible {
            row.push(stripped.field_string(field));
        }
        writer.write_record(&row).context("failed to write csv row")?;
    }

    writer.flush().context("failed to flush csv")?;
    Ok(records.len())
}
