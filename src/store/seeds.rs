//! Embedded seed collections.
//!
//! The fixtures ship inside the binary so the mock works with no setup; the
//! store only consults them on first load (or after corruption recovery).

use once_cell::sync::Lazy;
use serde_json::Value;

static USERS: Lazy<Vec<Value>> = Lazy::new(|| parse(include_str!("../../seeds/users.json"), "users"));
static COMPANIES: Lazy<Vec<Value>> =
    Lazy::new(|| parse(include_str!("../../seeds/companies.json"), "companies"));
static INVOICES: Lazy<Vec<Value>> =
    Lazy::new(|| parse(include_str!("../../seeds/invoices.json"), "invoices"));
static PAYMENTS: Lazy<Vec<Value>> =
    Lazy::new(|| parse(include_str!("../../seeds/payments.json"), "payments"));
static TICKETS: Lazy<Vec<Value>> =
    Lazy::new(|| parse(include_str!("../../seeds/tickets.json"), "tickets"));
static LOGS: Lazy<Vec<Value>> = Lazy::new(|| parse(include_str!("../../seeds/logs.json"), "logs"));

fn parse(raw: &str, name: &str) -> Vec<Value> {
    serde_json::from_str(raw).unwrap_or_else(|e| panic!("invalid embedded seed '{}': {}", name, e))
}

pub fn users() -> &'static [Value] {
    &USERS
}

pub fn companies() -> &'static [Value] {
    &COMPANIES
}

pub fn invoices() -> &'static [Value] {
    &INVOICES
}

pub fn payments() -> &'static [Value] {
    &PAYMENTS
}

pub fn tickets() -> &'static [Value] {
    &TICKETS
}

pub fn logs() -> &'static [Value] {
    &LOGS
}
