//! Schema-less record helpers.
//!
//! Facade collections hold plain `serde_json::Value` objects rather than typed
//! structs: the console treats every entity as an open record, and the real
//! backend historically served both `_id` and `id` as the identifier. All
//! dual-identity handling lives here so handlers never poke at raw key
//! presence themselves.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

/// Canonical identifier key. Records are normalized to carry this at the
/// store boundary; see [`normalize_id`].
pub const ID_KEY: &str = "_id";

/// Look up a record's identifier, accepting `_id` or `id`.
pub fn record_id(record: &Value) -> Option<&str> {
    record
        .get("_id")
        .or_else(|| record.get("id"))
        .and_then(Value::as_str)
}

/// True if the record's identifier (under either key) equals `id`.
pub fn id_matches(record: &Value, id: &str) -> bool {
    record_id(record) == Some(id)
}

/// Ensure the canonical `_id` key is present, copying from `id` when a record
/// only carries the short form. Non-object values are left untouched.
pub fn normalize_id(record: &mut Value) {
    let Some(obj) = record.as_object_mut() else {
        return;
    };
    if obj.contains_key(ID_KEY) {
        return;
    }
    if let Some(id) = obj.get("id").cloned() {
        obj.insert(ID_KEY.to_string(), id);
    }
}

/// Normalize every record in a collection. Applied once on load.
pub fn normalize_ids(collection: &mut [Value]) {
    for record in collection.iter_mut() {
        normalize_id(record);
    }
}

/// String field accessor.
pub fn str_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

/// Numeric field with loose coercion: numbers pass through, numeric strings
/// parse, everything else counts as 0. Mirrors what the console's real
/// backend did with untyped amount columns.
pub fn num_field(record: &Value, key: &str) -> f64 {
    coerce_number(record.get(key))
}

pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Parse an ISO-8601 timestamp or bare date into UTC. Bare dates resolve to
/// midnight UTC, matching how the original parsed `start`/`end` params.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|ndt| Utc.from_utc_datetime(&ndt));
    }
    None
}

/// A record's timestamp field as epoch millis; missing or unparseable
/// timestamps coerce to epoch 0 so they sort last under descending order.
pub fn timestamp_millis(record: &Value, key: &str) -> i64 {
    str_field(record, key)
        .and_then(parse_datetime)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// Current time as the ISO-8601 string shape the console stores everywhere.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
