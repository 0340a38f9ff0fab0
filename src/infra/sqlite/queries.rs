use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Transaction};
use uuid::Uuid;

use crate::domain::entities::collection::CollectionKind;
use crate::domain::entities::record::{FieldMap, FieldValue, Record, RecordId};
use crate::infra::sqlite::schema::open_connection;

fn encode_value(value: &FieldValue) -> Result<String> {
    serde_json::to_string(value).context("failed to encode field value")
}

fn decode_value(raw: &str) -> Result<FieldValue> {
    serde_json::from_str(raw).context("failed to decode field value")
}

fn upsert_fields(
    tx: &Transaction<'_>,
    collection: CollectionKind,
    record_id: &RecordId,
    fields: &FieldMap,
) -> Result<()> {
    let mut upsert = tx
        .prepare(
            "INSERT INTO field(collection, record_id, name, value)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(collection, record_id, name) DO UPDATE SET value = excluded.value",
        )
        .context("failed to prepare field upsert")?;

    for (name, value) in fields {
        upsert
            .execute(params![
                collection.storage_name(),
                record_id.as_str(),
                name,
                encode_value(value)?
            ])
            .context("failed to upsert field")?;
    }

    Ok(())
}

/// Inserts a new record, assigning its id and both timestamps.
pub fn insert_record(
    db_path: &Path,
    collection: CollectionKind,
    fields: FieldMap,
) -> Result<Record> {
    let id = RecordId(Uuid::new_v4().to_string());
    let now = Utc::now().to_rfc3339();

    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start insert transaction")?;

    tx.execute(
        "INSERT INTO record(collection, id, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
        params![collection.storage_name(), id.as_str(), now],
    )
    .context("failed to insert record")?;

    upsert_fields(&tx, collection, &id, &fields)?;
    tx.commit().context("failed to commit insert")?;

    Ok(Record {
        id,
        fields,
        created_at: Some(now.clone()),
        updated_at: Some(now),
        deleted_at: None,
    })
}

/// Loads every record of a collection, hydrating fields in one pass.
pub fn load_records(
    db_path: &Path,
    collection: CollectionKind,
    include_deleted: bool,
) -> Result<Vec<Record>> {
    let conn = open_connection(db_path)?;
    let filter = if include_deleted {
        ""
    } else {
        "AND deleted_at IS NULL"
    };

    let mut record_stmt = conn
        .prepare(&format!(
            "SELECT id, created_at, updated_at, deleted_at
             FROM record
             WHERE collection = ?1 {filter}
             ORDER BY created_at ASC, id ASC"
        ))
        .context("failed to prepare records query")?;

    let mut records = record_stmt
        .query_map([collection.storage_name()], |row| {
            Ok(Record {
                id: RecordId(row.get(0)?),
                fields: FieldMap::new(),
                created_at: row.get(1)?,
                updated_at: row.get(2)?,
                deleted_at: row.get(3)?,
            })
        })
        .context("failed to query records")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .context("failed to collect records")?;
    drop(record_stmt);

    if records.is_empty() {
        return Ok(records);
    }

    let positions: HashMap<String, usize> = records
        .iter()
        .enumerate()
        .map(|(idx, record)| (record.id.0.clone(), idx))
        .collect();

    let mut field_stmt = conn
        .prepare(
            "SELECT record_id, name, value
             FROM field
             WHERE collection = ?1
             ORDER BY record_id ASC, name ASC",
        )
        .context("failed to prepare fields query")?;
    let mut rows = field_stmt
        .query([collection.storage_name()])
        .context("failed to run fields query")?;

    while let Some(row) = rows.next().context("failed to read field row")? {
        let record_id: String = row.get(0).context("failed to read record_id")?;
        let name: String = row.get(1).context("failed to read field name")?;
        let raw: String = row.get(2).context("failed to read field value")?;

        if let Some(&idx) = positions.get(&record_id) {
            records[idx].fields.insert(name, decode_value(&raw)?);
        }
    }

    Ok(records)
}

pub fn load_record(
    db_path: &Path,
    collection: CollectionKind,
    id: &RecordId,
) -> Result<Option<Record>> {
    let conn = open_connection(db_path)?;

    let header = conn
        .query_row(
            "SELECT created_at, updated_at, deleted_at
             FROM record
             WHERE collection = ?1 AND id = ?2",
            params![collection.storage_name(), id.as_str()],
            |row| {
                Ok((
                    row.get::<_, Option<String>>(0)?,
                    row.get::<_, Option<String>>(1)?,
                    row.get::<_, Option<String>>(2)?,
                ))
            },
        )
        .optional()
        .context("failed to query record header")?;

    let Some((created_at, updated_at, deleted_at)) = header else {
        return Ok(None);
    };

    let mut field_stmt = conn
        .prepare(
            "SELECT name, value
             FROM field
             WHERE collection = ?1 AND record_id = ?2
             ORDER BY name ASC",
        )
        .context("failed to prepare record fields query")?;
    let mut rows = field_stmt
        .query(params![collection.storage_name(), id.as_str()])
        .context("failed to run record fields query")?;

    let mut fields = FieldMap::new();
    while let Some(row) = rows.next().context("failed to read field row")? {
        let name: String = row.get(0).context("failed to read field name")?;
        let raw: String = row.get(1).context("failed to read field value")?;
        fields.insert(name, decode_value(&raw)?);
    }

    Ok(Some(Record {
        id: id.clone(),
        fields,
        created_at,
        updated_at,
        deleted_at,
    }))
}

/// Merges a partial field map into a stored record and bumps `updated_at`.
/// Returns `None` when the id is absent.
pub fn update_record(
    db_path: &Path,
    collection: CollectionKind,
    id: &RecordId,
    partial: &FieldMap,
) -> Result<Option<Record>> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start update transaction")?;

    let touched = tx
        .execute(
            "UPDATE record SET updated_at = ?1 WHERE collection = ?2 AND id = ?3",
            params![
                Utc::now().to_rfc3339(),
                collection.storage_name(),
                id.as_str()
            ],
        )
        .context("failed to touch record")?;
    if touched == 0 {
        return Ok(None);
    }

    upsert_fields(&tx, collection, id, partial)?;
    tx.commit().context("failed to commit update")?;

    load_record(db_path, collection, id)
}

/// Soft delete. Returns false when the record does not exist or was already
/// deleted.
pub fn mark_deleted(db_path: &Path, collection: CollectionKind, id: &RecordId) -> Result<bool> {
    let conn = open_connection(db_path)?;
    let affected = conn
        .execute(
            "UPDATE record SET deleted_at = ?1
             WHERE collection = ?2 AND id = ?3 AND deleted_at IS NULL",
            params![
                Utc::now().to_rfc3339(),
                collection.storage_name(),
                id.as_str()
            ],
        )
        .with_context(|| format!("failed to soft-delete record {id}"))?;
    Ok(affected > 0)
}

/// Soft-deletes one batch inside a single committed transaction.
pub fn mark_deleted_batch(
    db_path: &Path,
    collection: CollectionKind,
    ids: &[RecordId],
) -> Result<usize> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start batch delete transaction")?;

    let now = Utc::now().to_rfc3339();
    let mut affected = 0;
    {
        let mut stmt = tx
            .prepare(
                "UPDATE record SET deleted_at = ?1
                 WHERE collection = ?2 AND id = ?3 AND deleted_at IS NULL",
            )
            .context("failed to prepare batch delete")?;
        for id in ids {
            affected += stmt
                .execute(params![now, collection.storage_name(), id.as_str()])
                .context("failed to batch-delete record")?;
        }
    }

    tx.commit().context("failed to commit batch delete")?;
    Ok(affected)
}

/// Permanent removal of a record and its fields.
pub fn purge_record(db_path: &Path, collection: CollectionKind, id: &RecordId) -> Result<bool> {
    let mut conn = open_connection(db_path)?;
    let tx = conn
        .transaction()
        .context("failed to start purge transaction")?;

    tx.execute(
        "DELETE FROM field WHERE collection = ?1 AND record_id = ?2",
        params![collection.storage_name(), id.as_str()],
    )
    .with_context(|| format!("failed to delete fields for record {id}"))?;
    let affected = tx
        .execute(
            "DELETE FROM record WHERE collection = ?1 AND id = ?2",
            params![collection.storage_name(), id.as_str()],
        )
        .with_context(|| format!("failed to delete record {id}"))?;

    tx.commit().context("failed to commit purge")?;
    Ok(affected > 0)
}
