//! Query Helpers: pure functions shared by every list handler.
//!
//! These reproduce real backend list semantics (substring search, optional
//! equality filters, date-range filters, pagination) so screens behave
//! identically against the mock and the live API.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::record::{coerce_number, parse_datetime, timestamp_millis};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Normalized list-query parameters.
///
/// Every field is optional except `page`/`limit`/`q`; an absent filter means
/// "no constraint", never "match empty". `start`/`end` are epoch millis.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: u64,
    pub limit: u64,
    pub q: String,
    pub status: Option<String>,
    pub role: Option<String>,
    pub plan: Option<String>,
    pub method: Option<String>,
    pub company_id: Option<String>,
    pub level: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl ListParams {
    /// Normalize raw query-string parameters.
    ///
    /// `page` defaults to 1, `limit` to 10 (with `pageSize` accepted as an
    /// alias). Empty-string values count as absent, matching the falsy
    /// treatment the console's query layer always had.
    pub fn from_map(raw: &HashMap<String, String>) -> Self {
        let get = |key: &str| -> Option<String> {
            raw.get(key).filter(|v| !v.is_empty()).cloned()
        };
        let get_num = |key: &str, default: u64| -> u64 {
            get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
        };
        let get_millis = |key: &str| -> Option<i64> {
            get(key)
                .as_deref()
                .and_then(parse_datetime)
                .map(|dt| dt.timestamp_millis())
        };

        Self {
            page: get_num("page", DEFAULT_PAGE),
            limit: get("limit")
                .or_else(|| get("pageSize"))
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LIMIT),
            q: get("q").unwrap_or_default(),
            status: get("status"),
            role: get("role"),
            plan: get("plan"),
            method: get("method"),
            company_id: get("companyId"),
            level: get("level"),
            priority: get("priority"),
            assignee: get("assignee"),
            start: get_millis("start"),
            end: get_millis("end"),
        }
    }
}

/// Case-insensitive substring match across any of the given fields.
///
/// An empty query matches everything. Missing fields and nulls compare as the
/// empty string; numbers match on their decimal form.
pub fn matches_query(q: &str, fields: &[Option<&Value>]) -> bool {
    if q.is_empty() {
        return true;
    }
    let needle = q.to_lowercase();
    fields.iter().any(|field| {
        let text = match field {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        };
        text.to_lowercase().contains(&needle)
    })
}

/// Sum a numeric field over a collection with loose coercion.
pub fn sum_field(list: &[Value], key: &str) -> f64 {
    list.iter().map(|rec| coerce_number(rec.get(key))).sum()
}

/// True if the record's string field equals the filter value, when a filter
/// value is present at all.
pub fn field_eq(record: &Value, key: &str, expected: Option<&str>) -> bool {
    match expected {
        None => true,
        Some(want) => record.get(key).and_then(Value::as_str) == Some(want),
    }
}

/// Inclusive date-range check over a record's timestamp field. Bounds that
/// are absent simply don't constrain.
pub fn in_date_range(record: &Value, key: &str, start: Option<i64>, end: Option<i64>) -> bool {
    let ts = timestamp_millis(record, key);
    if let Some(start) = start {
        if ts < start {
            return false;
        }
    }
    if let Some(end) = end {
        if ts > end {
            return false;
        }
    }
    true
}

/// Descending comparator on a timestamp field; missing dates coerce to epoch
/// 0 and sink to the end.
pub fn by_date_desc(a: &Value, b: &Value, key: &str) -> std::cmp::Ordering {
    timestamp_millis(b, key).cmp(&timestamp_millis(a, key))
}

/// Slice out one page and wrap it in the list envelope.
///
/// `total` is the post-filter, pre-pagination count. Page and limit are not
/// bounds-checked: a page past the end yields empty `data` with the correct
/// `total`, which is what the tables rely on when a delete empties the last
/// page.
pub fn paginate(list: Vec<Value>, page: u64, limit: u64) -> Value {
    let total = list.len() as u64;
    let start = (page.saturating_sub(1)).saturating_mul(limit) as usize;
    let items: Vec<Value> = list
        .into_iter()
        .skip(start)
        .take(limit as usize)
        .collect();
    json!({
        "data": items,
        "total": total,
        "page": page,
        "pageSize": limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn params_default_page_and_limit() {
        let p = ListParams::from_map(&raw(&[]));
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);
        assert_eq!(p.q, "");
        assert!(p.status.is_none());
    }

    #[test]
    fn params_accept_page_size_alias() {
        let p = ListParams::from_map(&raw(&[("pageSize", "25")]));
        assert_eq!(p.limit, 25);
        // explicit limit wins over the alias
        let p = ListParams::from_map(&raw(&[("limit", "5"), ("pageSize", "25")]));
        assert_eq!(p.limit, 5);
    }

    #[test]
    fn params_treat_empty_strings_as_absent() {
        let p = ListParams::from_map(&raw(&[("status", ""), ("q", "")]));
        assert!(p.status.is_none());
        assert_eq!(p.q, "");
    }

    #[test]
    fn params_convert_date_bounds_to_millis() {
        let p = ListParams::from_map(&raw(&[
            ("start", "2025-01-01"),
            ("end", "2025-01-31T23:59:59Z"),
        ]));
        let start = p.start.unwrap();
        let end = p.end.unwrap();
        assert!(start > 0 && end > start);
    }

    #[test]
    fn matches_query_is_case_insensitive_substring() {
        let name = json!("Meridian Watch Co");
        let email = json!("ops@meridian.example");
        assert!(matches_query("MERID", &[Some(&name), Some(&email)]));
        assert!(matches_query("example", &[Some(&name), Some(&email)]));
        assert!(!matches_query("zurich", &[Some(&name), Some(&email)]));
        // empty query matches everything, even with no fields
        assert!(matches_query("", &[]));
        // nulls and missing fields compare as empty
        assert!(!matches_query("x", &[None, Some(&Value::Null)]));
    }

    #[test]
    fn sum_field_coerces_non_numbers_to_zero() {
        let list = vec![
            json!({"amount": 100}),
            json!({"amount": "49.50"}),
            json!({"amount": null}),
            json!({}),
        ];
        assert_eq!(sum_field(&list, "amount"), 149.5);
    }

    #[test]
    fn paginate_reports_full_total() {
        let list: Vec<Value> = (0..23).map(|i| json!({"i": i})).collect();
        let page = paginate(list, 2, 10);
        assert_eq!(page["total"], 23);
        assert_eq!(page["page"], 2);
        assert_eq!(page["pageSize"], 10);
        assert_eq!(page["data"].as_array().unwrap().len(), 10);
        assert_eq!(page["data"][0]["i"], 10);
    }

    #[test]
    fn paginate_past_the_end_is_empty_with_correct_total() {
        let list: Vec<Value> = (0..3).map(|i| json!({"i": i})).collect();
        let page = paginate(list, 9, 10);
        assert_eq!(page["total"], 3);
        assert!(page["data"].as_array().unwrap().is_empty());
    }

    #[test]
    fn by_date_desc_sinks_missing_dates() {
        let mut list = vec![
            json!({"id": "a"}),
            json!({"id": "b", "createdAt": "2025-03-01T00:00:00Z"}),
            json!({"id": "c", "createdAt": "2025-04-01T00:00:00Z"}),
        ];
        list.sort_by(|a, b| by_date_desc(a, b, "createdAt"));
        assert_eq!(list[0]["id"], "c");
        assert_eq!(list[1]["id"], "b");
        assert_eq!(list[2]["id"], "a");
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let rec = json!({"createdAt": "2025-05-10T12:00:00Z"});
        let ts = crate::record::timestamp_millis(&rec, "createdAt");
        assert!(in_date_range(&rec, "createdAt", Some(ts), Some(ts)));
        assert!(!in_date_range(&rec, "createdAt", Some(ts + 1), None));
        assert!(!in_date_range(&rec, "createdAt", None, Some(ts - 1)));
    }
}
