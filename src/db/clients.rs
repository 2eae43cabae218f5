//! Client database operations

use rand::Rng;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::keys::{generate_unique_key, CLIENT_ID_RANGE};
use super::{Entity, Record, RecordStore, Row, StoreError, UpsertOutcome};

pub const CLIENTS_TABLE: &str = "clients";
pub const CLIENT_KEY: &str = "client_id";

/// `client_id` carries no uniqueness constraint; uniqueness is kept by
/// always writing through [`RecordStore::upsert`].
pub const CLIENTS_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS clients (
        id              INTEGER PRIMARY KEY,
        client_id       INTEGER,
        name            TEXT,
        address_line_1  TEXT,
        address_line_2  TEXT,
        phone           TEXT,
        email_or_fax    TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_clients_client_id ON clients(client_id)",
    "CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(name)",
];

const CLIENT_COLUMNS: &str =
    "client_id, name, address_line_1, address_line_2, phone, email_or_fax";

/// Database client record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub client_id: i64,
    pub name: String,
    pub address_line_1: String,
    pub address_line_2: String,
    pub phone: String,
    pub email_or_fax: String,
}

/// One line of the client search list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub client_id: i64,
    pub name: String,
    pub address_line_1: String,
    pub address_line_2: String,
}

impl std::fmt::Display for ClientSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}: {}: {}",
            self.client_id, self.name, self.address_line_1, self.address_line_2
        )
    }
}

impl Client {
    /// Every column, key included. Blank strings are written as blanks.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(CLIENT_KEY.into(), Value::Integer(self.client_id));
        record.insert("name".into(), Value::Text(self.name.clone()));
        record.insert("address_line_1".into(), Value::Text(self.address_line_1.clone()));
        record.insert("address_line_2".into(), Value::Text(self.address_line_2.clone()));
        record.insert("phone".into(), Value::Text(self.phone.clone()));
        record.insert("email_or_fax".into(), Value::Text(self.email_or_fax.clone()));
        record
    }

    /// Build from a row selected with the client columns in table order.
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(Client {
            client_id: integer(row.first()?)?,
            name: text(row.get(1)?),
            address_line_1: text(row.get(2)?),
            address_line_2: text(row.get(3)?),
            phone: text(row.get(4)?),
            email_or_fax: text(row.get(5)?),
        })
    }
}

impl ClientSummary {
    pub fn from_row(row: &Row) -> Option<Self> {
        Some(ClientSummary {
            client_id: integer(row.first()?)?,
            name: text(row.get(1)?),
            address_line_1: text(row.get(2)?),
            address_line_2: text(row.get(3)?),
        })
    }
}

pub(crate) fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(*i),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// NULL and non-text columns read as blank.
pub(crate) fn text(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        _ => String::new(),
    }
}

/// List clients for the search box. Blank text lists everyone; otherwise
/// the text is matched anywhere in the name or either address line.
pub fn search_clients(store: &RecordStore, query: &str) -> Vec<ClientSummary> {
    let needle = query.trim();
    let rows = if needle.is_empty() {
        store.fetch(
            Entity::Clients,
            "SELECT client_id, name, address_line_1, address_line_2
             FROM clients
             ORDER BY name",
            &[],
        )
    } else {
        let pattern = Value::Text(format!("%{needle}%"));
        store.fetch(
            Entity::Clients,
            "SELECT client_id, name, address_line_1, address_line_2
             FROM clients
             WHERE name LIKE ?1 OR address_line_1 LIKE ?1 OR address_line_2 LIKE ?1
             ORDER BY name",
            &[pattern],
        )
    };

    rows.iter().filter_map(ClientSummary::from_row).collect()
}

/// Get a single client by `client_id`
pub fn get_client(store: &RecordStore, client_id: i64) -> Option<Client> {
    let rows = store.fetch(
        Entity::Clients,
        &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE client_id = ?1"),
        &[Value::Integer(client_id)],
    );
    rows.first().and_then(Client::from_row)
}

pub fn client_exists(store: &RecordStore, client_id: i64) -> Result<bool, StoreError> {
    store.key_exists(
        Entity::Clients,
        CLIENTS_TABLE,
        CLIENT_KEY,
        &Value::Integer(client_id),
    )
}

/// Pick a six-digit `client_id` no stored client is using yet.
pub fn generate_client_id<R: Rng>(
    store: &RecordStore,
    rng: &mut R,
) -> Result<i64, StoreError> {
    generate_unique_key(
        store,
        Entity::Clients,
        CLIENTS_TABLE,
        CLIENT_KEY,
        CLIENT_ID_RANGE,
        rng,
    )
}

/// Insert or overwrite a client keyed by `client_id`
pub fn save_client(store: &mut RecordStore, client: &Client) -> Option<UpsertOutcome> {
    store.upsert(Entity::Clients, CLIENTS_TABLE, CLIENT_KEY, &client.to_record())
}

pub fn example_clients() -> Vec<Client> {
    vec![
        Client {
            client_id: 1,
            name: "Alice".into(),
            address_line_1: "123 Wonderland Lane".into(),
            address_line_2: "Suite 1".into(),
            phone: "555-0101".into(),
            email_or_fax: "alice@example.com".into(),
        },
        Client {
            client_id: 2,
            name: "Bob".into(),
            address_line_1: "456 Nowhere Street".into(),
            address_line_2: String::new(),
            phone: "555-0202".into(),
            email_or_fax: "bob@example.com".into(),
        },
    ]
}

/// Write the example clients. Keyed by id, so running it twice is harmless.
pub fn seed_example_clients(store: &mut RecordStore) -> Result<usize, StoreError> {
    let clients = example_clients();
    for client in &clients {
        store.try_upsert(Entity::Clients, CLIENTS_TABLE, CLIENT_KEY, &client.to_record())?;
    }
    info!("seeded {} example clients", clients.len());
    Ok(clients.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_renders_like_the_list_widget() {
        let summary = ClientSummary {
            client_id: 2,
            name: "Bob".into(),
            address_line_1: "456 Nowhere Street".into(),
            address_line_2: String::new(),
        };
        assert_eq!(summary.to_string(), "2: Bob: 456 Nowhere Street: ");
    }

    #[test]
    fn from_row_treats_null_as_blank() {
        let row = vec![
            Value::Integer(5),
            Value::Text("Eve".into()),
            Value::Null,
            Value::Null,
            Value::Text("555".into()),
            Value::Null,
        ];
        let client = Client::from_row(&row).unwrap();
        assert_eq!(client.client_id, 5);
        assert_eq!(client.address_line_1, "");
        assert_eq!(client.phone, "555");
    }

    #[test]
    fn from_row_needs_an_integer_key() {
        let row = vec![Value::Null, Value::Text("Eve".into())];
        assert_eq!(ClientSummary::from_row(&row), None);
    }

    #[test]
    fn record_contains_every_column() {
        let record = example_clients()[1].to_record();
        assert_eq!(record.len(), 6);
        assert_eq!(record["address_line_2"], Value::Text(String::new()));
        assert_eq!(record[CLIENT_KEY], Value::Integer(2));
    }
}
