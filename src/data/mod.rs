//! Upstream data access for the UEX API
//!
//! Rows come back as opaque JSON objects (`Record`); the crate only relies on
//! `id` and `name` for lookup and reads everything else by field name when
//! formatting. `Upstream` is the seam between the command layer and the
//! network so the cache tiers can be exercised without a server.

pub mod store;
pub mod uex;

pub use store::{CachedList, ListSpec, RowsRequest, SEED_MAX_AGE};
pub use uex::{RetryPolicy, UexClient, UexError, UEX_BASE_URL};

use async_trait::async_trait;
use serde_json::Value;

/// One upstream row, treated as read-only
pub type Record = Value;

/// Query parameters for a resource request
pub type Params = [(&'static str, String)];

/// A source of UEX payloads
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetch `resource` and return the whole JSON payload.
    async fn get(&self, resource: &str, params: &Params) -> Result<Value, UexError>;
}

/// Rows from a payload's `data` array; anything else yields no rows.
pub fn data_rows(payload: Value) -> Vec<Record> {
    match payload {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(rows)) => rows,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// String field of a record, if present and non-empty
pub fn str_field<'a>(record: &'a Record, key: &str) -> Option<&'a str> {
    record
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Numeric field of a record, accepting numbers and numeric strings
pub fn num_field(record: &Record, key: &str) -> Option<f64> {
    match record.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer id of a record
pub fn record_id(record: &Record) -> Option<i64> {
    match record.get("id")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Truthiness of a flag field stored as 0/1, bool, or string
pub fn flag_field(record: &Record, key: &str) -> bool {
    match record.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty() && s != "0",
        _ => false,
    }
}
