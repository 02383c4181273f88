//! Support ticket handlers.
//!
//! Ticket status is deliberately an open string: the support inbox screen
//! drives `{open, in_progress, resolved, closed}` while the helpdesk board
//! uses `{open, pending, on_hold, solved, closed}`, and until product settles
//! on one vocabulary the facade must accept both. Any state may transition
//! to any other; a closed ticket can be reopened.

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::query::{by_date_desc, field_eq, in_date_range, matches_query, paginate, ListParams};
use crate::record::{now_iso, str_field};

use super::{find_index, find_record, find_record_mut, Facade, FacadeResult, Params};

/// Fields a ticket PATCH may overwrite. Unlike users, an explicit null is
/// applied (it clears the assignee).
const PATCH_FIELDS: &[&str] = &["subject", "description", "status", "priority", "assignee"];

impl Facade {
    pub(crate) fn tickets_list(&self, params: &Params) -> FacadeResult {
        let p = ListParams::from_map(params);
        let mut list: Vec<Value> = self
            .tickets()
            .iter()
            .filter(|t| {
                matches_query(&p.q, &[t.get("subject"), t.get("companyName"), t.get("assignee")])
            })
            .filter(|t| field_eq(t, "status", p.status.as_deref()))
            .filter(|t| field_eq(t, "priority", p.priority.as_deref()))
            .filter(|t| match p.assignee.as_deref() {
                None => true,
                // unassigned tickets compare as ""
                Some(want) => str_field(t, "assignee").unwrap_or("") == want,
            })
            .filter(|t| field_eq(t, "companyId", p.company_id.as_deref()))
            .filter(|t| in_date_range(t, "createdAt", p.start, p.end))
            .cloned()
            .collect();
        list.sort_by(|a, b| by_date_desc(a, b, "updatedAt"));
        Ok(paginate(list, p.page, p.limit))
    }

    pub(crate) fn ticket_get(&self, id: &str) -> FacadeResult {
        find_record(self.tickets(), id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Ticket not found"))
    }

    pub(crate) fn ticket_create(&mut self, body: &Value) -> FacadeResult {
        let company_id = str_field(body, "companyId").filter(|v| !v.is_empty());
        let subject = str_field(body, "subject").filter(|v| !v.is_empty());
        let (Some(company_id), Some(subject)) = (company_id, subject) else {
            return Err(ApiError::bad_request("companyId and subject required"));
        };
        let company_id = company_id.to_string();
        let subject = subject.to_string();

        let company_name = self
            .company_name(&company_id)
            .unwrap_or("—")
            .to_string();
        let description = str_field(body, "description").unwrap_or("").to_string();
        let priority = str_field(body, "priority").unwrap_or("normal").to_string();
        let assignee = body.get("assignee").cloned().unwrap_or(Value::Null);

        let id = self.next_id("t");
        let now = now_iso();
        let ticket = json!({
            "_id": id,
            "companyId": company_id,
            "companyName": company_name,
            "subject": subject,
            "description": description,
            "status": "open",
            "priority": priority,
            "assignee": assignee,
            "createdAt": now,
            "updatedAt": now,
        });

        self.tickets_mut().insert(0, ticket.clone());
        self.sync();
        Ok(ticket)
    }

    pub(crate) fn ticket_patch(&mut self, id: &str, body: &Value) -> FacadeResult {
        let ticket = find_record_mut(self.tickets_mut(), id)
            .ok_or_else(|| ApiError::not_found("Ticket not found"))?;

        for key in PATCH_FIELDS {
            if let Some(value) = body.get(key) {
                ticket[*key] = value.clone();
            }
        }
        ticket["updatedAt"] = Value::String(now_iso());

        let updated = ticket.clone();
        self.sync();
        Ok(updated)
    }

    pub(crate) fn ticket_delete(&mut self, id: &str) -> FacadeResult {
        let index = find_index(self.tickets(), id)
            .ok_or_else(|| ApiError::not_found("Ticket not found"))?;
        self.tickets_mut().remove(index);
        self.sync();
        Ok(json!({ "ok": true, "id": id }))
    }

    /// Append-and-touch: there is no persisted message timeline yet, so a
    /// reply only refreshes `updatedAt` and returns the ticket.
    pub(crate) fn ticket_reply(&mut self, id: &str, _body: &Value) -> FacadeResult {
        let ticket = find_record_mut(self.tickets_mut(), id)
            .ok_or_else(|| ApiError::not_found("Ticket not found"))?;

        ticket["updatedAt"] = Value::String(now_iso());

        let updated = ticket.clone();
        self.sync();
        Ok(updated)
    }
}
