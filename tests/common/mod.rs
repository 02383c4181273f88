#![allow(dead_code)]

use std::collections::HashMap;

use axum::http::Method;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::Value;

use watchdesk_admin_api::error::ApiError;
use watchdesk_admin_api::facade::Facade;
use watchdesk_admin_api::store::{Db, MemoryBackend, StorageBackend};

pub const COLLECTIONS: &[&str] = &["users", "companies", "invoices", "payments", "tickets", "logs"];

/// Build an isolated facade whose store is preloaded with exactly the given
/// collections; everything not named starts empty (the embedded seeds never
/// leak into tests).
pub fn facade_with(collections: &[(&str, Vec<Value>)]) -> Facade {
    let mut backend = MemoryBackend::new();
    for name in COLLECTIONS {
        let payload = collections
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, records)| serde_json::to_string(records).expect("fixture serializes"))
            .unwrap_or_else(|| "[]".to_string());
        backend
            .write_raw(&format!("mockdb_{}", name), &payload)
            .expect("memory backend write");
    }
    Facade::new(Db::new(Box::new(backend), "mockdb_"))
}

pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn get(facade: &mut Facade, path: &str, pairs: &[(&str, &str)]) -> Result<Value, ApiError> {
    facade.dispatch(&Method::GET, path, &params(pairs), None)
}

pub fn post(facade: &mut Facade, path: &str, body: Value) -> Result<Value, ApiError> {
    facade.dispatch(&Method::POST, path, &params(&[]), Some(&body))
}

pub fn patch(facade: &mut Facade, path: &str, body: Value) -> Result<Value, ApiError> {
    facade.dispatch(&Method::PATCH, path, &params(&[]), Some(&body))
}

pub fn delete(facade: &mut Facade, path: &str) -> Result<Value, ApiError> {
    facade.dispatch(&Method::DELETE, path, &params(&[]), None)
}

/// ISO timestamp `days` days before now; used to place fixtures relative to
/// the metrics window.
pub fn iso_days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// ISO timestamp `days` days after now.
pub fn iso_days_ahead(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Unwrap the list envelope into (items, total).
pub fn list_page(envelope: &Value) -> (&Vec<Value>, u64) {
    let items = envelope["data"].as_array().expect("list envelope has data");
    let total = envelope["total"].as_u64().expect("list envelope has total");
    (items, total)
}

/// Ids (canonical key) of every item in a list envelope.
pub fn page_ids(envelope: &Value) -> Vec<String> {
    envelope["data"]
        .as_array()
        .expect("list envelope has data")
        .iter()
        .map(|rec| rec["_id"].as_str().unwrap_or_default().to_string())
        .collect()
}

/// Assert an error is the expected status with a message containing `needle`.
pub fn assert_api_error(err: ApiError, status: u16, needle: &str) {
    assert_eq!(err.status_code(), status, "unexpected status for: {}", err);
    assert!(
        err.message().contains(needle),
        "expected message containing '{}', got '{}'",
        needle,
        err.message()
    );
}
