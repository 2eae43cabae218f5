//! Order database operations

use chrono::NaiveDate;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::clients::{integer, text};
use super::{Entity, Record, RecordStore, Row, StoreError};

pub const ORDERS_TABLE: &str = "orders";
pub const ORDER_KEY: &str = "order_id";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `client_id` refers to a client row but is not enforced: the two tables
/// live in different database files.
pub const ORDERS_SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS orders (
        id              INTEGER PRIMARY KEY,
        order_id        INTEGER,
        client_id       INTEGER,
        order_date      TEXT,
        order_total     REAL
    )",
    "CREATE INDEX IF NOT EXISTS idx_orders_order_id ON orders(order_id)",
    "CREATE INDEX IF NOT EXISTS idx_orders_client_id ON orders(client_id)",
];

/// Database order record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: i64,
    pub client_id: i64,
    pub order_date: NaiveDate,
    pub order_total: f64,
}

impl Order {
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert(ORDER_KEY.into(), Value::Integer(self.order_id));
        record.insert("client_id".into(), Value::Integer(self.client_id));
        record.insert(
            "order_date".into(),
            Value::Text(self.order_date.format(DATE_FORMAT).to_string()),
        );
        record.insert("order_total".into(), Value::Real(self.order_total));
        record
    }

    pub fn from_row(row: &Row) -> Option<Self> {
        let order_date = NaiveDate::parse_from_str(&text(row.get(2)?), DATE_FORMAT).ok()?;
        let order_total = match row.get(3)? {
            Value::Real(r) => *r,
            Value::Integer(i) => *i as f64,
            _ => return None,
        };
        Some(Order {
            order_id: integer(row.first()?)?,
            client_id: integer(row.get(1)?)?,
            order_date,
            order_total,
        })
    }
}

/// Orders placed by one client, oldest first
pub fn get_orders_for_client(store: &RecordStore, client_id: i64) -> Vec<Order> {
    store
        .fetch(
            Entity::Orders,
            "SELECT order_id, client_id, order_date, order_total
             FROM orders
             WHERE client_id = ?1
             ORDER BY order_date, order_id",
            &[Value::Integer(client_id)],
        )
        .iter()
        .filter_map(Order::from_row)
        .collect()
}

pub fn example_orders() -> Vec<Order> {
    [(1, 1, (2024, 1, 10), 150.00), (2, 2, (2024, 1, 11), 200.00)]
        .into_iter()
        .filter_map(|(order_id, client_id, (y, m, d), order_total)| {
            Some(Order {
                order_id,
                client_id,
                order_date: NaiveDate::from_ymd_opt(y, m, d)?,
                order_total,
            })
        })
        .collect()
}

/// Write the example orders, keyed by `order_id`.
pub fn seed_example_orders(store: &mut RecordStore) -> Result<usize, StoreError> {
    let orders = example_orders();
    for order in &orders {
        store.try_upsert(Entity::Orders, ORDERS_TABLE, ORDER_KEY, &order.to_record())?;
    }
    info!("seeded {} example orders", orders.len());
    Ok(orders.len())
}
