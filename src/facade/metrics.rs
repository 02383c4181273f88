//! Metrics Aggregator: dashboard KPIs, daily time series, and top tables over
//! a trailing window selected by a range token (`7d`/`30d`/`90d`).

use chrono::{DateTime, Datelike, Duration, Local, LocalResult, TimeZone};
use serde_json::{json, Value};

use crate::query::by_date_desc;
use crate::record::{coerce_number, num_field, parse_datetime, str_field, timestamp_millis};

use super::{Facade, FacadeResult, Params};

const MILLIS_PER_DAY: i64 = 86_400_000;

impl Facade {
    pub(crate) fn metrics(&self, params: &Params) -> FacadeResult {
        let range = params
            .get("range")
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        // unrecognized tokens fall back to the default dashboard window
        let days: i64 = match range.as_str() {
            "7d" => 7,
            "90d" => 90,
            _ => 30,
        };

        let now = Local::now();
        let start = window_start(now, days);
        let start_ms = start.timestamp_millis();
        let now_ms = now.timestamp_millis();

        // --- KPIs ---
        let companies_total = self.companies().len();
        let users_active = self.users().iter().filter(|u| counts_as_active(u)).count();

        let paid_in_window: Vec<&Value> = self
            .invoices()
            .iter()
            .filter(|i| str_field(i, "status") == Some("paid"))
            .filter(|i| {
                let ts = timestamp_millis(i, "createdAt");
                ts >= start_ms && ts <= now_ms
            })
            .collect();
        let mrr: f64 = paid_in_window.iter().map(|i| num_field(i, "amount")).sum();

        let invoices_past_due = self
            .invoices()
            .iter()
            .filter(|i| match str_field(i, "status") {
                Some("past_due") => true,
                Some("open") => {
                    let due = timestamp_millis(i, "dueDate");
                    due > 0 && due < now_ms
                }
                _ => false,
            })
            .count();

        // --- Period-over-period deltas ---
        // current window vs the immediately preceding equal-length window;
        // MRR/invoice deltas stay 0 until the dashboard grows sparklines for
        // them
        let prev_start_ms = start_ms - days * MILLIS_PER_DAY;
        let companies_delta =
            period_delta(self.companies(), "createdAt", prev_start_ms, start_ms, now_ms);
        let users_delta = period_delta(self.users(), "createdAt", prev_start_ms, start_ms, now_ms);

        // --- Time series ---
        let mut mrr_daily = zero_series(start, days);
        for invoice in &paid_in_window {
            add_to_series(&mut mrr_daily, invoice, "createdAt", num_field(invoice, "amount"));
        }

        let mut new_users_daily = zero_series(start, days);
        for user in self.users() {
            let ts = timestamp_millis(user, "createdAt");
            if ts >= start_ms && ts <= now_ms {
                add_to_series(&mut new_users_daily, user, "createdAt", 1.0);
            }
        }

        // --- Tables ---
        let mut recent_invoices = self.invoices().to_vec();
        recent_invoices.sort_by(|a, b| by_date_desc(a, b, "createdAt"));
        recent_invoices.truncate(5);
        for invoice in &mut recent_invoices {
            let has_name = invoice
                .get("companyName")
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty());
            if !has_name {
                let company_id = invoice
                    .get("companyId")
                    .or_else(|| invoice.get("company_id"))
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let name = company_id
                    .as_deref()
                    .and_then(|id| self.company_name(id))
                    .unwrap_or("—")
                    .to_string();
                invoice["companyName"] = Value::String(name);
            }
        }

        let mut top_companies = self.companies().to_vec();
        top_companies.sort_by(|a, b| seats_used(b).total_cmp(&seats_used(a)));
        top_companies.truncate(5);

        Ok(json!({
            "kpi": {
                "companies": companies_total,
                "usersActive": users_active,
                "mrr": mrr,
                "invoicesPastDue": invoices_past_due,
                "companiesDelta": companies_delta,
                "usersDelta": users_delta,
                "mrrDelta": 0,
                "invoicesDelta": 0,
            },
            "timeseries": {
                "mrrDaily": series_to_json(&mrr_daily),
                "newUsersDaily": series_to_json(&new_users_daily),
            },
            "tables": {
                "recentInvoices": recent_invoices,
                "topCompanies": top_companies,
            },
        }))
    }
}

/// Today at local midnight minus (days - 1): the window always includes
/// today as its last day.
fn window_start(now: DateTime<Local>, days: i64) -> DateTime<Local> {
    let start_date = now.date_naive() - Duration::days(days - 1);
    let midnight = start_date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match midnight.and_local_timezone(Local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        // midnight skipped by a DST jump; the exact boundary doesn't matter
        LocalResult::None => now - Duration::days(days - 1),
    }
}

/// Users without a status count as active (legacy rows predate the column);
/// `online` is the presence indicator some screens write back.
fn counts_as_active(user: &Value) -> bool {
    match str_field(user, "status") {
        None => true,
        Some(s) => s.is_empty() || s == "active" || s == "online",
    }
}

/// Percent change between creations in [start, now] and the preceding
/// equal-length window [prev_start, start).
fn period_delta(
    collection: &[Value],
    key: &str,
    prev_start_ms: i64,
    start_ms: i64,
    now_ms: i64,
) -> i64 {
    let current = collection
        .iter()
        .filter(|rec| {
            let ts = timestamp_millis(rec, key);
            ts >= start_ms && ts <= now_ms
        })
        .count() as i64;
    let previous = collection
        .iter()
        .filter(|rec| {
            let ts = timestamp_millis(rec, key);
            ts >= prev_start_ms && ts < start_ms
        })
        .count() as i64;

    match (previous, current) {
        (0, 0) => 0,
        (0, _) => 100,
        (prev, curr) => (((curr - prev) as f64 / prev as f64) * 100.0).round() as i64,
    }
}

/// Zero-filled `(day key, value)` pairs for each day in the window. Keys are
/// month/day only; collisions across a year boundary are an accepted
/// limitation of the dashboard's axis labels.
fn zero_series(start: DateTime<Local>, days: i64) -> Vec<(String, f64)> {
    (0..days)
        .map(|offset| {
            let day = start + Duration::days(offset);
            (day_key(&day), 0.0)
        })
        .collect()
}

fn day_key(day: &DateTime<Local>) -> String {
    format!("{}/{}", day.month(), day.day())
}

/// Accumulate into the bucket whose key matches the record's local date;
/// records outside the window find no bucket and are dropped.
fn add_to_series(series: &mut [(String, f64)], record: &Value, key: &str, amount: f64) {
    let Some(date) = str_field(record, key).and_then(parse_datetime) else {
        return;
    };
    let bucket_key = day_key(&date.with_timezone(&Local));
    if let Some(bucket) = series.iter_mut().find(|(k, _)| *k == bucket_key) {
        bucket.1 += amount;
    }
}

fn series_to_json(series: &[(String, f64)]) -> Vec<Value> {
    series
        .iter()
        .map(|(date, value)| json!({ "date": date, "value": value }))
        .collect()
}

fn seats_used(company: &Value) -> f64 {
    coerce_number(company.get("seats").and_then(|s| s.get("used")))
}
