//! The mock REST facade: a request router over in-memory collections that
//! reproduces the live super-admin backend's semantics (filtering,
//! pagination, partial update, 404/400 shapes) so the console behaves
//! identically against mock or real data.

pub mod billing;
pub mod companies;
pub mod logs;
pub mod metrics;
pub mod tickets;
pub mod users;

use std::collections::HashMap;

use axum::http::Method;
use chrono::Utc;
use serde_json::Value;

use crate::config;
use crate::error::ApiError;
use crate::record::record_id;
use crate::store::{seeds, Db};

/// Raw query-string parameters as the HTTP layer hands them over.
pub type Params = HashMap<String, String>;

pub type FacadeResult = Result<Value, ApiError>;

/// One facade instance owns the six collections and the store they persist
/// through. Instances never share state; tests build isolated ones freely.
pub struct Facade {
    db: Db,
    users: Vec<Value>,
    companies: Vec<Value>,
    invoices: Vec<Value>,
    payments: Vec<Value>,
    tickets: Vec<Value>,
    logs: Vec<Value>,
    /// Monotonic guard for synthesized ids; see [`Facade::next_id`].
    last_issued_ms: i64,
}

impl Facade {
    /// Build a facade over the given store, loading every collection (seeded
    /// on first use).
    pub fn new(mut db: Db) -> Self {
        let users = db.load("users", seeds::users());
        let companies = db.load("companies", seeds::companies());
        let invoices = db.load("invoices", seeds::invoices());
        let payments = db.load("payments", seeds::payments());
        let tickets = db.load("tickets", seeds::tickets());
        let logs = db.load("logs", seeds::logs());

        Self {
            db,
            users,
            companies,
            invoices,
            payments,
            tickets,
            logs,
            last_issued_ms: 0,
        }
    }

    /// Facade backed by the configured durable file store.
    pub fn with_default_storage() -> Self {
        let storage = &config::config().storage;
        Self::new(Db::file(&storage.data_dir, storage.key_prefix.clone()))
    }

    /// Fully isolated facade (embedded seeds, nothing durable).
    pub fn in_memory() -> Self {
        Self::new(Db::in_memory())
    }

    /// Route one logical HTTP call.
    ///
    /// Unmatched path/verb combinations reject with 404 "Not found", exactly
    /// like the live router.
    pub fn dispatch(
        &mut self,
        method: &Method,
        path: &str,
        params: &Params,
        body: Option<&Value>,
    ) -> FacadeResult {
        let trimmed = path.trim_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        let body = body.unwrap_or(&Value::Null);

        tracing::debug!(%method, path, "facade dispatch");

        match segments.as_slice() {
            // USERS
            ["superadmin", "users"] if method == Method::GET => self.users_list(params),
            ["superadmin", "users", "invite"] if method == Method::POST => {
                self.users_invite(body)
            }
            ["superadmin", "users", id] if method == Method::PATCH => self.user_patch(id, body),
            ["superadmin", "users", id] if method == Method::DELETE => self.user_delete(id),
            ["superadmin", "users", id, "impersonate"] if method == Method::POST => {
                self.user_impersonate(id)
            }
            ["superadmin", "users", id, "reset-password"] if method == Method::POST => {
                self.user_reset_password(id)
            }

            // COMPANIES
            ["superadmin", "companies"] if method == Method::GET => self.companies_list(params),
            ["superadmin", "companies", id, "billing"] if method == Method::PATCH => {
                self.company_patch_billing(id, body)
            }
            ["superadmin", "companies", id, "modules"] if method == Method::PATCH => {
                self.company_patch_modules(id, body)
            }

            // BILLING
            ["superadmin", "billing", "invoices"] if method == Method::GET => {
                self.invoices_list(params)
            }
            ["superadmin", "billing", "invoices", id] if method == Method::PATCH => {
                self.invoice_patch(id, body)
            }
            ["superadmin", "billing", "payments"] if method == Method::GET => {
                self.payments_list(params)
            }

            // SUPPORT
            ["superadmin", "support", "tickets"] if method == Method::GET => {
                self.tickets_list(params)
            }
            ["superadmin", "support", "tickets"] if method == Method::POST => {
                self.ticket_create(body)
            }
            ["superadmin", "support", "tickets", id] if method == Method::GET => {
                self.ticket_get(id)
            }
            ["superadmin", "support", "tickets", id] if method == Method::PATCH => {
                self.ticket_patch(id, body)
            }
            ["superadmin", "support", "tickets", id] if method == Method::DELETE => {
                self.ticket_delete(id)
            }
            // The admin-support screen calls /replies while older builds used
            // /reply; both land on the same append-and-touch handler.
            ["superadmin", "support", "tickets", id, "reply" | "replies"]
                if method == Method::POST =>
            {
                self.ticket_reply(id, body)
            }

            // LOGS
            ["superadmin", "logs"] if method == Method::GET => self.logs_list(params),

            // METRICS
            ["superadmin", "metrics"] if method == Method::GET => self.metrics(params),

            _ => Err(ApiError::not_found("Not found")),
        }
    }

    /// Synthesize a record id as `<prefix>_<epoch-millis>`, bumped forward
    /// past the last issued value so rapid successive creates never collide.
    pub(crate) fn next_id(&mut self, prefix: &str) -> String {
        let now = Utc::now().timestamp_millis();
        let ms = now.max(self.last_issued_ms + 1);
        self.last_issued_ms = ms;
        format!("{}_{}", prefix, ms)
    }

    /// Flush every collection back to the store. Mirrors the live backend's
    /// write-through behavior between page reloads.
    pub(crate) fn sync(&mut self) {
        self.db.save("users", &self.users);
        self.db.save("companies", &self.companies);
        self.db.save("invoices", &self.invoices);
        self.db.save("payments", &self.payments);
        self.db.save("tickets", &self.tickets);
        self.db.save("logs", &self.logs);
    }

    /// Company display name for joins, by company id (either key form).
    pub(crate) fn company_name(&self, company_id: &str) -> Option<&str> {
        self.companies
            .iter()
            .find(|c| record_id(c) == Some(company_id))
            .and_then(|c| c.get("name"))
            .and_then(Value::as_str)
    }

    // Collection accessors used by the handler modules.

    pub(crate) fn users(&self) -> &[Value] {
        &self.users
    }

    pub(crate) fn users_mut(&mut self) -> &mut Vec<Value> {
        &mut self.users
    }

    pub(crate) fn companies(&self) -> &[Value] {
        &self.companies
    }

    pub(crate) fn companies_mut(&mut self) -> &mut Vec<Value> {
        &mut self.companies
    }

    pub(crate) fn invoices(&self) -> &[Value] {
        &self.invoices
    }

    pub(crate) fn invoices_mut(&mut self) -> &mut Vec<Value> {
        &mut self.invoices
    }

    pub(crate) fn payments(&self) -> &[Value] {
        &self.payments
    }

    pub(crate) fn tickets(&self) -> &[Value] {
        &self.tickets
    }

    pub(crate) fn tickets_mut(&mut self) -> &mut Vec<Value> {
        &mut self.tickets
    }

    pub(crate) fn logs(&self) -> &[Value] {
        &self.logs
    }
}

/// Find a record by id (either identity key) in a collection.
pub(crate) fn find_record<'a>(collection: &'a [Value], id: &str) -> Option<&'a Value> {
    collection.iter().find(|rec| record_id(rec) == Some(id))
}

pub(crate) fn find_record_mut<'a>(collection: &'a mut [Value], id: &str) -> Option<&'a mut Value> {
    collection.iter_mut().find(|rec| record_id(rec) == Some(id))
}

pub(crate) fn find_index(collection: &[Value], id: &str) -> Option<usize> {
    collection.iter().position(|rec| record_id(rec) == Some(id))
}
