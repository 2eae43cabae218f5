//! Random key generation checked against the store

use std::ops::RangeInclusive;

use rand::Rng;
use rusqlite::types::Value;
use tracing::debug;

use super::{Entity, RecordStore, StoreError};

/// Six-digit client ids.
pub const CLIENT_ID_RANGE: RangeInclusive<i64> = 100_000..=999_999;

/// Draws before giving up on finding a free key.
pub const MAX_KEY_ATTEMPTS: usize = 1000;

/// Draw random keys from `range` until one is not present in
/// `table.key_field`.
///
/// Uniqueness only holds against rows that exist when the check runs; the
/// column has no constraint behind it.
pub fn generate_unique_key<R: Rng>(
    store: &RecordStore,
    entity: Entity,
    table: &str,
    key_field: &str,
    range: RangeInclusive<i64>,
    rng: &mut R,
) -> Result<i64, StoreError> {
    for attempt in 1..=MAX_KEY_ATTEMPTS {
        let candidate = rng.gen_range(range.clone());
        if !store.key_exists(entity, table, key_field, &Value::Integer(candidate))? {
            debug!("{table}.{key_field}: {candidate} is free after {attempt} draw(s)");
            return Ok(candidate);
        }
    }

    Err(StoreError::KeySpaceExhausted {
        table: table.to_string(),
        key_field: key_field.to_string(),
        attempts: MAX_KEY_ATTEMPTS,
    })
}
