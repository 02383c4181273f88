mod common;

use serde_json::{json, Value};

use common::{facade_with, get, iso_days_ago, iso_days_ahead};

// Metrics fixtures are placed relative to now so they land deterministically
// inside or outside the trailing window regardless of when the suite runs.

fn invoice(id: &str, status: &str, amount: f64, created_days_ago: i64) -> Value {
    json!({
        "_id": id,
        "number": format!("INV-{}", id),
        "companyId": "c_1",
        "companyName": "Meridian Watch Co",
        "amount": amount,
        "status": status,
        "createdAt": iso_days_ago(created_days_ago),
    })
}

fn user(id: &str, status: Option<&str>, created_days_ago: i64) -> Value {
    let mut rec = json!({
        "_id": id,
        "name": id,
        "email": format!("{}@x.example", id),
        "createdAt": iso_days_ago(created_days_ago),
    });
    if let Some(status) = status {
        rec["status"] = json!(status);
    }
    rec
}

fn company(id: &str, seats_used: i64, created_days_ago: i64) -> Value {
    json!({
        "_id": id,
        "name": format!("Company {}", id),
        "planId": "pro",
        "planStatus": "active",
        "seats": {"purchased": 50, "used": seats_used},
        "createdAt": iso_days_ago(created_days_ago),
    })
}

#[test]
fn mrr_sums_only_windowed_paid_invoices() {
    // the spec's canonical scenario: paid 100 today + open 50 today => 100
    let mut f = facade_with(&[(
        "invoices",
        vec![
            invoice("inv_1", "paid", 100.0, 0),
            invoice("inv_2", "open", 50.0, 0),
            // paid but outside the 7d window
            invoice("inv_3", "paid", 999.0, 30),
        ],
    )]);

    let m = get(&mut f, "/superadmin/metrics", &[("range", "7d")]).unwrap();
    assert_eq!(m["kpi"]["mrr"].as_f64().unwrap(), 100.0);

    // the wider window picks the older invoice back up
    let m = get(&mut f, "/superadmin/metrics", &[("range", "90d")]).unwrap();
    assert_eq!(m["kpi"]["mrr"].as_f64().unwrap(), 1099.0);
}

#[test]
fn unrecognized_range_defaults_to_30d() {
    let mut f = facade_with(&[("invoices", vec![invoice("inv_1", "paid", 10.0, 0)])]);
    let m = get(&mut f, "/superadmin/metrics", &[("range", "1y")]).unwrap();
    assert_eq!(m["timeseries"]["mrrDaily"].as_array().unwrap().len(), 30);
    let m = get(&mut f, "/superadmin/metrics", &[]).unwrap();
    assert_eq!(m["timeseries"]["newUsersDaily"].as_array().unwrap().len(), 30);
}

#[test]
fn users_without_status_count_as_active() {
    let mut f = facade_with(&[(
        "users",
        vec![
            user("u_1", Some("active"), 400),
            user("u_2", Some("online"), 400),
            user("u_3", None, 400),
            user("u_4", Some("suspended"), 400),
        ],
    )]);
    let m = get(&mut f, "/superadmin/metrics", &[]).unwrap();
    assert_eq!(m["kpi"]["usersActive"], 3);
}

#[test]
fn past_due_counts_overdue_open_invoices() {
    let mut overdue_open = invoice("inv_1", "open", 100.0, 10);
    overdue_open["dueDate"] = json!(iso_days_ago(3));
    let mut future_open = invoice("inv_2", "open", 100.0, 10);
    future_open["dueDate"] = json!(iso_days_ahead(10));
    let flagged = invoice("inv_3", "past_due", 100.0, 200);
    // open with no dueDate at all is not overdue
    let undated_open = invoice("inv_4", "open", 100.0, 10);

    let mut f = facade_with(&[(
        "invoices",
        vec![overdue_open, future_open, flagged, undated_open],
    )]);
    let m = get(&mut f, "/superadmin/metrics", &[]).unwrap();
    assert_eq!(m["kpi"]["invoicesPastDue"], 2);
}

#[test]
fn deltas_compare_adjacent_windows() {
    // 7d window: current = last 7 days, previous = the 7 before that
    let mut f = facade_with(&[
        (
            "companies",
            vec![
                company("c_1", 5, 1),  // current window
                company("c_2", 5, 2),  // current window
                company("c_3", 5, 9),  // previous window
                company("c_4", 5, 60), // neither
            ],
        ),
        (
            "users",
            vec![
                user("u_1", Some("active"), 1), // current, none previous
            ],
        ),
    ]);

    let m = get(&mut f, "/superadmin/metrics", &[("range", "7d")]).unwrap();
    // 1 -> 2 companies is +100; 0 -> 1 users pins at 100
    assert_eq!(m["kpi"]["companiesDelta"], 100);
    assert_eq!(m["kpi"]["usersDelta"], 100);
    // not computed yet for money KPIs
    assert_eq!(m["kpi"]["mrrDelta"], 0);
    assert_eq!(m["kpi"]["invoicesDelta"], 0);
}

#[test]
fn series_buckets_accumulate_by_day() {
    let mut f = facade_with(&[
        (
            "invoices",
            vec![
                invoice("inv_1", "paid", 100.0, 0),
                invoice("inv_2", "paid", 50.0, 0),
                invoice("inv_3", "paid", 25.0, 2),
                invoice("inv_4", "open", 999.0, 0),
            ],
        ),
        (
            "users",
            vec![user("u_1", None, 0), user("u_2", None, 1), user("u_3", None, 300)],
        ),
    ]);

    let m = get(&mut f, "/superadmin/metrics", &[("range", "7d")]).unwrap();

    let mrr_daily = m["timeseries"]["mrrDaily"].as_array().unwrap();
    assert_eq!(mrr_daily.len(), 7);
    let series_total: f64 = mrr_daily.iter().map(|p| p["value"].as_f64().unwrap()).sum();
    assert_eq!(series_total, 175.0, "series total equals windowed MRR");
    // today is the last bucket
    assert_eq!(mrr_daily[6]["value"].as_f64().unwrap(), 150.0);
    assert_eq!(mrr_daily[4]["value"].as_f64().unwrap(), 25.0);

    let users_daily = m["timeseries"]["newUsersDaily"].as_array().unwrap();
    let user_total: f64 = users_daily.iter().map(|p| p["value"].as_f64().unwrap()).sum();
    assert_eq!(user_total, 2.0, "only window creations count");

    // every point carries an M/D label
    assert!(mrr_daily.iter().all(|p| p["date"].as_str().unwrap().contains('/')));
}

#[test]
fn tables_surface_recent_invoices_and_top_seats() {
    let mut unnamed = invoice("inv_n", "open", 10.0, 1);
    unnamed.as_object_mut().unwrap().remove("companyName");

    let invoices: Vec<Value> = (0..6)
        .map(|i| invoice(&format!("inv_{}", i), "paid", 10.0, i + 2))
        .chain([unnamed])
        .collect();
    let companies: Vec<Value> = (0..7)
        .map(|i| company(&format!("c_{}", i), i * 3, 100))
        .collect();

    let mut f = facade_with(&[("invoices", invoices), ("companies", companies)]);
    let m = get(&mut f, "/superadmin/metrics", &[]).unwrap();

    let recent = m["tables"]["recentInvoices"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    // newest first; the unnamed one (1 day old) leads and got its name joined
    assert_eq!(recent[0]["_id"], "inv_n");
    assert_eq!(recent[0]["companyName"], "Company c_1");

    let top = m["tables"]["topCompanies"].as_array().unwrap();
    assert_eq!(top.len(), 5);
    assert_eq!(top[0]["_id"], "c_6");
    assert_eq!(top[1]["_id"], "c_5");
}
