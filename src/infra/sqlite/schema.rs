use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("failed to open db: {}", db_path.display()))?;
    conn.execute("PRAGMA foreign_keys = ON", [])
        .context("failed to enable foreign key enforcement")?;
    Ok(conn)
}

pub fn init_db(db_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create parent dir: {}", parent.display()))?;
    }

    let conn = open_connection(db_path)?;

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS record (
            collection  TEXT NOT NULL,
            id          TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            updated_at  TEXT NOT NULL,
            deleted_at  TEXT,
            PRIMARY KEY (collection, id)
        );

        CREATE TABLE IF NOT EXISTS field (
            collection  TEXT NOT NULL,
            record_id   TEXT NOT NULL,
            name        TEXT NOT NULL,
            value       TEXT NOT NULL,
            PRIMARY KEY (collection, record_id, name),
            FOREIGN KEY (collection, record_id) REFERENCES record(collection, id)
        );

        CREATE INDEX IF NOT EXISTS idx_field_record
            ON field(collection, record_id);

        CREATE INDEX IF NOT EXISTS idx_record_collection
            ON record(collection, deleted_at);
        ",
    )
    .context("failed to initialize schema")?;

    Ok(())
}
