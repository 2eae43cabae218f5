//! Storage directory and per-entity database initialization

use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use super::{Entity, StoreError};

/// Create the storage directory if it does not exist yet.
pub fn ensure_storage_dir(dir: &Path) -> Result<(), StoreError> {
    std::fs::create_dir_all(dir).map_err(|source| StoreError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Bring an open connection up to the entity's schema.
///
/// Every statement is `IF NOT EXISTS`, so this is safe on every startup.
pub fn init_entity(conn: &Connection, entity: Entity) -> Result<(), StoreError> {
    for statement in entity.schema() {
        conn.execute(statement, [])
            .map_err(StoreError::sqlite(entity))?;
    }
    Ok(())
}

/// Open or create the database file for `entity` inside `dir`
pub fn open_entity(dir: &Path, entity: Entity) -> Result<Connection, StoreError> {
    let path = dir.join(entity.file_name());
    let conn = Connection::open(&path).map_err(StoreError::sqlite(entity))?;

    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;",
    )
    .map_err(StoreError::sqlite(entity))?;

    init_entity(&conn, entity)?;
    debug!("opened {} at {}", entity, path.display());

    Ok(conn)
}
