//! Billing handlers: invoice and payment lists, invoice status patch.

use serde_json::Value;

use crate::error::ApiError;
use crate::query::{by_date_desc, field_eq, in_date_range, matches_query, paginate, ListParams};

use super::{find_record_mut, Facade, FacadeResult, Params};

/// Invoices from the legacy importer carry `company_id` instead of
/// `companyId`; the filter accepts either spelling.
fn invoice_company_id(invoice: &Value) -> Option<&str> {
    invoice
        .get("companyId")
        .or_else(|| invoice.get("company_id"))
        .and_then(Value::as_str)
}

impl Facade {
    pub(crate) fn invoices_list(&self, params: &Params) -> FacadeResult {
        let p = ListParams::from_map(params);
        let mut list: Vec<Value> = self
            .invoices()
            .iter()
            .filter(|i| matches_query(&p.q, &[i.get("number"), i.get("companyName")]))
            .filter(|i| field_eq(i, "status", p.status.as_deref()))
            .filter(|i| match p.company_id.as_deref() {
                None => true,
                Some(want) => invoice_company_id(i) == Some(want),
            })
            .filter(|i| in_date_range(i, "createdAt", p.start, p.end))
            .cloned()
            .collect();
        list.sort_by(|a, b| by_date_desc(a, b, "createdAt"));
        Ok(paginate(list, p.page, p.limit))
    }

    /// PATCH /superadmin/billing/invoices/:id — status is the only mutable
    /// field; everything else on an issued invoice is frozen.
    pub(crate) fn invoice_patch(&mut self, id: &str, body: &Value) -> FacadeResult {
        let invoice = find_record_mut(self.invoices_mut(), id)
            .ok_or_else(|| ApiError::not_found("Invoice not found"))?;

        if let Some(status) = body.get("status").and_then(Value::as_str) {
            if !status.is_empty() {
                invoice["status"] = Value::String(status.to_string());
            }
        }

        let updated = invoice.clone();
        self.sync();
        Ok(updated)
    }

    pub(crate) fn payments_list(&self, params: &Params) -> FacadeResult {
        let p = ListParams::from_map(params);
        let mut list: Vec<Value> = self
            .payments()
            .iter()
            .filter(|pay| {
                let id = pay.get("_id").or_else(|| pay.get("id"));
                matches_query(&p.q, &[id, pay.get("companyName"), pay.get("reference")])
            })
            .filter(|pay| field_eq(pay, "status", p.status.as_deref()))
            .filter(|pay| field_eq(pay, "method", p.method.as_deref()))
            .filter(|pay| field_eq(pay, "companyId", p.company_id.as_deref()))
            .filter(|pay| in_date_range(pay, "createdAt", p.start, p.end))
            .cloned()
            .collect();
        list.sort_by(|a, b| by_date_desc(a, b, "createdAt"));
        Ok(paginate(list, p.page, p.limit))
    }
}
