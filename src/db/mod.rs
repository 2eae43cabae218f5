//! Database module for SQLite persistence
//!
//! Every entity lives in its own database file inside the storage
//! directory. [`RecordStore`] owns one connection per file and exposes the
//! generic fetch/upsert operations; the entity modules build typed records
//! and queries on top of it.

pub mod clients;
pub mod init;
pub mod keys;
pub mod orders;
pub mod store;

use std::collections::BTreeMap;
use std::path::PathBuf;

use rusqlite::types::Value;
use thiserror::Error;

pub use clients::*;
pub use init::*;
pub use keys::*;
pub use orders::*;
pub use store::*;

/// Column name to value, as passed to [`RecordStore::upsert`].
pub type Record = BTreeMap<String, Value>;

/// One result row, columns in query order.
pub type Row = Vec<Value>;

/// Logical record types, each backed by its own database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entity {
    Clients,
    Orders,
}

impl Entity {
    pub const ALL: [Entity; 2] = [Entity::Clients, Entity::Orders];

    pub fn file_name(&self) -> &'static str {
        match self {
            Entity::Clients => "Clients.db",
            Entity::Orders => "Orders.db",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.file_name() == name)
    }

    /// Idempotent statements that bring a fresh file up to schema.
    pub fn schema(&self) -> &'static [&'static str] {
        match self {
            Entity::Clients => clients::CLIENTS_SCHEMA,
            Entity::Orders => orders::ORDERS_SCHEMA,
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{entity}: {source}")]
    Sqlite {
        entity: Entity,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database {0} not found.")]
    UnknownEntity(Entity),

    #[error("invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("record has no value for key field {0:?}")]
    MissingKey(String),

    #[error("key field {0:?} is NULL")]
    NullKey(String),

    #[error("no free key found in {table}.{key_field} after {attempts} attempts")]
    KeySpaceExhausted {
        table: String,
        key_field: String,
        attempts: usize,
    },
}

impl StoreError {
    pub(crate) fn sqlite(entity: Entity) -> impl FnOnce(rusqlite::Error) -> Self {
        move |source| StoreError::Sqlite { entity, source }
    }
}
