//! Generic record store over the per-entity connections

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::LazyLock;

use regex::Regex;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Transaction};
use tracing::{debug, error, info, warn};

use super::init::{ensure_storage_dir, open_entity};
use super::{Entity, Record, Row, StoreError};
use crate::notify::{Notice, Notifier};

/// Database files opened by [`RecordStore::open`]: every [`Entity`].
pub fn database_files() -> Vec<&'static str> {
    Entity::ALL.iter().map(Entity::file_name).collect()
}

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));

/// What an upsert ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The key exists and the record carried no other fields.
    Unchanged,
}

/// Owns one open connection per entity file for the whole session.
///
/// Reads take `&self`, writes take `&mut self`: the store is meant to be
/// driven from a single thread.
pub struct RecordStore {
    dir: PathBuf,
    connections: BTreeMap<Entity, Connection>,
    notifier: Rc<dyn Notifier>,
}

impl RecordStore {
    /// Open the database of every [`Entity`] under `dir`.
    pub fn open(dir: impl AsRef<Path>, notifier: Rc<dyn Notifier>) -> Result<Self, StoreError> {
        Self::open_with(dir, &database_files(), notifier)
    }

    /// Open the named database files under `dir`, creating the directory
    /// and any missing file. Names with no known schema are skipped.
    pub fn open_with(
        dir: impl AsRef<Path>,
        file_names: &[&str],
        notifier: Rc<dyn Notifier>,
    ) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        ensure_storage_dir(&dir)?;

        let mut connections = BTreeMap::new();
        for name in file_names {
            let Some(entity) = Entity::from_file_name(name) else {
                warn!("No initialization defined for {name}, skipping");
                continue;
            };
            connections.insert(entity, open_entity(&dir, entity)?);
        }

        info!(
            "record store ready at {} ({} databases)",
            dir.display(),
            connections.len()
        );

        Ok(Self {
            dir,
            connections,
            notifier,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.dir
    }

    pub fn is_open(&self, entity: Entity) -> bool {
        self.connections.contains_key(&entity)
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    fn connection(&self, entity: Entity) -> Result<&Connection, StoreError> {
        self.connections
            .get(&entity)
            .ok_or(StoreError::UnknownEntity(entity))
    }

    /// Run a parameterized query and collect every row.
    pub fn try_fetch(
        &self,
        entity: Entity,
        query: &str,
        params: &[Value],
    ) -> Result<Vec<Row>, StoreError> {
        let conn = self.connection(entity)?;
        debug!("{entity}: {}", query.trim());

        let mut stmt = conn.prepare(query).map_err(StoreError::sqlite(entity))?;
        let columns = stmt.column_count();
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| {
                (0..columns)
                    .map(|i| row.get::<_, Value>(i))
                    .collect::<rusqlite::Result<Row>>()
            })
            .map_err(StoreError::sqlite(entity))?
            .collect::<Result<Vec<Row>, _>>()
            .map_err(StoreError::sqlite(entity))?;

        Ok(rows)
    }

    /// Like [`try_fetch`](Self::try_fetch), but failures are reported to the
    /// notifier and come back as an empty result.
    pub fn fetch(&self, entity: Entity, query: &str, params: &[Value]) -> Vec<Row> {
        match self.try_fetch(entity, query, params) {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error fetching data from {entity}: {e}");
                self.notifier.notify(Notice::error(
                    "Database Error",
                    format!("Error fetching data from {entity}: {e}"),
                ));
                Vec::new()
            }
        }
    }

    /// Whether `table` has a row whose `key_field` equals `key`.
    pub fn key_exists(
        &self,
        entity: Entity,
        table: &str,
        key_field: &str,
        key: &Value,
    ) -> Result<bool, StoreError> {
        check_identifier(table)?;
        check_identifier(key_field)?;
        let conn = self.connection(entity)?;
        row_exists(conn, table, key_field, key).map_err(StoreError::sqlite(entity))
    }

    pub fn count_rows(&self, entity: Entity, table: &str) -> Result<i64, StoreError> {
        check_identifier(table)?;
        let conn = self.connection(entity)?;
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .map_err(StoreError::sqlite(entity))
    }

    /// Insert `record` into `table`, or overwrite every non-key field of the
    /// row that already carries `record[key_field]`.
    ///
    /// The existence check and the write share one transaction, which is
    /// rolled back on any failure.
    pub fn try_upsert(
        &mut self,
        entity: Entity,
        table: &str,
        key_field: &str,
        record: &Record,
    ) -> Result<UpsertOutcome, StoreError> {
        check_identifier(table)?;
        check_identifier(key_field)?;
        for column in record.keys() {
            check_identifier(column)?;
        }
        match record.get(key_field) {
            None => return Err(StoreError::MissingKey(key_field.to_string())),
            // `= NULL` never matches, so a NULL key would insert every time.
            Some(Value::Null) => return Err(StoreError::NullKey(key_field.to_string())),
            Some(_) => {}
        }

        let conn = self
            .connections
            .get_mut(&entity)
            .ok_or(StoreError::UnknownEntity(entity))?;
        let tx = conn.transaction().map_err(StoreError::sqlite(entity))?;

        match write_record(&tx, table, key_field, record) {
            Ok(outcome) => {
                tx.commit().map_err(StoreError::sqlite(entity))?;
                debug!("{entity}: {table} {outcome:?}");
                Ok(outcome)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback() {
                    warn!("{entity}: rollback failed: {rollback}");
                }
                Err(StoreError::Sqlite { entity, source: e })
            }
        }
    }

    /// Like [`try_upsert`](Self::try_upsert), but failures are reported to
    /// the notifier and yield `None`.
    pub fn upsert(
        &mut self,
        entity: Entity,
        table: &str,
        key_field: &str,
        record: &Record,
    ) -> Option<UpsertOutcome> {
        match self.try_upsert(entity, table, key_field, record) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("Error writing data to {entity}: {e}");
                self.notifier.notify(Notice::error(
                    "Database Error",
                    format!("Error writing data to {entity}: {e}"),
                ));
                None
            }
        }
    }
}

fn check_identifier(name: &str) -> Result<(), StoreError> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

fn row_exists(
    conn: &Connection,
    table: &str,
    key_field: &str,
    key: &Value,
) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!("SELECT 1 FROM {table} WHERE {key_field} = ?1 LIMIT 1"),
        [key],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
}

fn write_record(
    tx: &Transaction<'_>,
    table: &str,
    key_field: &str,
    record: &Record,
) -> rusqlite::Result<UpsertOutcome> {
    let key = &record[key_field];

    if row_exists(tx, table, key_field, key)? {
        let fields: Vec<(&String, &Value)> =
            record.iter().filter(|(k, _)| *k != key_field).collect();
        if fields.is_empty() {
            return Ok(UpsertOutcome::Unchanged);
        }

        let assignments = fields
            .iter()
            .enumerate()
            .map(|(i, (k, _))| format!("{k} = ?{}", i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {table} SET {assignments} WHERE {key_field} = ?{}",
            fields.len() + 1
        );
        let values = fields.iter().map(|(_, v)| *v).chain(std::iter::once(key));
        tx.execute(&sql, params_from_iter(values))?;
        Ok(UpsertOutcome::Updated)
    } else {
        let columns = record.keys().cloned().collect::<Vec<_>>().join(", ");
        let placeholders = (1..=record.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})");
        tx.execute(&sql, params_from_iter(record.values()))?;
        Ok(UpsertOutcome::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NoticeLevel, QueuedNotifier};
    use tempfile::TempDir;

    fn open_store() -> (TempDir, Rc<QueuedNotifier>, RecordStore) {
        let dir = TempDir::new().unwrap();
        let notices = Rc::new(QueuedNotifier::new());
        let store = RecordStore::open(dir.path(), notices.clone()).unwrap();
        (dir, notices, store)
    }

    fn client(id: i64, name: &str) -> Record {
        let mut record = Record::new();
        record.insert("client_id".into(), Value::Integer(id));
        record.insert("name".into(), Value::Text(name.into()));
        record
    }

    #[test]
    fn identifiers_are_validated() {
        assert!(check_identifier("clients").is_ok());
        assert!(check_identifier("address_line_1").is_ok());
        assert!(check_identifier("1clients").is_err());
        assert!(check_identifier("clients; DROP TABLE clients").is_err());
        assert!(check_identifier("").is_err());
    }

    #[test]
    fn upsert_rejects_injected_table_name() {
        let (_dir, _notices, mut store) = open_store();
        let result = store.try_upsert(
            Entity::Clients,
            "clients WHERE 1=1; --",
            "client_id",
            &client(1, "Alice"),
        );
        assert!(matches!(result, Err(StoreError::InvalidIdentifier(_))));
    }

    #[test]
    fn upsert_requires_key_field() {
        let (_dir, _notices, mut store) = open_store();
        let mut record = Record::new();
        record.insert("name".into(), Value::Text("Nobody".into()));

        let result = store.try_upsert(Entity::Clients, "clients", "client_id", &record);
        assert!(matches!(result, Err(StoreError::MissingKey(_))));
    }

    #[test]
    fn null_key_is_rejected_instead_of_inserting_again() {
        let (_dir, notices, mut store) = open_store();
        let mut record = Record::new();
        record.insert("client_id".into(), Value::Null);
        record.insert("name".into(), Value::Text("x".into()));

        assert!(matches!(
            store.try_upsert(Entity::Clients, "clients", "client_id", &record),
            Err(StoreError::NullKey(_))
        ));
        assert_eq!(
            store.upsert(Entity::Clients, "clients", "client_id", &record),
            None
        );
        assert_eq!(store.count_rows(Entity::Clients, "clients").unwrap(), 0);
        assert_eq!(notices.drain().len(), 1);
    }

    #[test]
    fn open_covers_every_entity() {
        let (_dir, _notices, store) = open_store();
        assert_eq!(database_files(), vec!["Clients.db", "Orders.db"]);
        for entity in Entity::ALL {
            assert!(store.is_open(entity));
        }
    }

    #[test]
    fn key_only_record_leaves_existing_row_alone() {
        let (_dir, _notices, mut store) = open_store();
        store
            .try_upsert(Entity::Clients, "clients", "client_id", &client(7, "Gina"))
            .unwrap();

        let mut key_only = Record::new();
        key_only.insert("client_id".into(), Value::Integer(7));
        let outcome = store
            .try_upsert(Entity::Clients, "clients", "client_id", &key_only)
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Unchanged);
        let rows = store.fetch(
            Entity::Clients,
            "SELECT name FROM clients WHERE client_id = ?1",
            &[Value::Integer(7)],
        );
        assert_eq!(rows, vec![vec![Value::Text("Gina".into())]]);
    }

    #[test]
    fn failed_upsert_rolls_back_and_notifies() {
        let (_dir, notices, mut store) = open_store();
        let mut record = client(3, "Carol");
        record.insert("no_such_column".into(), Value::Text("x".into()));

        assert_eq!(
            store.upsert(Entity::Clients, "clients", "client_id", &record),
            None
        );
        assert_eq!(store.count_rows(Entity::Clients, "clients").unwrap(), 0);

        let drained = notices.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].level, NoticeLevel::Error);
        assert!(drained[0].message.contains("Clients.db"));
    }

    #[test]
    fn bad_query_returns_empty_and_notifies() {
        let (_dir, notices, store) = open_store();
        let rows = store.fetch(Entity::Clients, "SELEC nonsense", &[]);
        assert!(rows.is_empty());
        assert_eq!(notices.drain().len(), 1);
    }

    #[test]
    fn unopened_entity_is_reported() {
        let dir = TempDir::new().unwrap();
        let notices = Rc::new(QueuedNotifier::new());
        let store = RecordStore::open_with(dir.path(), &["Clients.db"], notices.clone()).unwrap();

        assert!(!store.is_open(Entity::Orders));
        assert!(store.fetch(Entity::Orders, "SELECT * FROM orders", &[]).is_empty());

        let drained = notices.drain();
        assert_eq!(drained.len(), 1);
        assert!(drained[0].message.contains("Database Orders.db not found."));
    }
}
