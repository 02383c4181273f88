//! Company handlers: list, billing patch, feature-module patch.

use serde_json::{json, Map, Value};

use crate::error::ApiError;
use crate::query::{by_date_desc, field_eq, matches_query, paginate, ListParams};
use crate::record::coerce_number;

use super::{find_record_mut, Facade, FacadeResult, Params};

/// Loose string coercion for plan fields, matching what the billing form
/// sends (selects post strings, but older builds sent numbers for plan ids).
fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Facade {
    pub(crate) fn companies_list(&self, params: &Params) -> FacadeResult {
        let p = ListParams::from_map(params);
        let mut list: Vec<Value> = self
            .companies()
            .iter()
            .filter(|c| {
                matches_query(&p.q, &[c.get("name"), c.get("planId"), c.get("planStatus")])
            })
            .filter(|c| field_eq(c, "planStatus", p.status.as_deref()))
            .filter(|c| field_eq(c, "planId", p.plan.as_deref()))
            .cloned()
            .collect();
        list.sort_by(|a, b| by_date_desc(a, b, "createdAt"));
        Ok(paginate(list, p.page, p.limit))
    }

    /// PATCH /superadmin/companies/:id/billing
    ///
    /// Allow-listed: planId, planStatus, renewalDate, seatsPurchased. A
    /// `renewalDate: null` clears the date (month-to-month); null plan fields
    /// are skipped.
    pub(crate) fn company_patch_billing(&mut self, id: &str, body: &Value) -> FacadeResult {
        let company = find_record_mut(self.companies_mut(), id)
            .ok_or_else(|| ApiError::not_found("Company not found"))?;

        if let Some(plan_id) = body.get("planId").filter(|v| !v.is_null()) {
            company["planId"] = Value::String(coerce_string(plan_id));
        }
        if let Some(plan_status) = body.get("planStatus").filter(|v| !v.is_null()) {
            company["planStatus"] = Value::String(coerce_string(plan_status));
        }
        if let Some(renewal) = body.get("renewalDate") {
            company["renewalDate"] = renewal.clone();
        }
        if let Some(purchased) = body.get("seatsPurchased").filter(|v| !v.is_null()) {
            if !company["seats"].is_object() {
                company["seats"] = json!({});
            }
            company["seats"]["purchased"] = json!(coerce_number(Some(purchased)));
        }

        let updated = company.clone();
        self.sync();
        Ok(updated)
    }

    /// PATCH /superadmin/companies/:id/modules
    ///
    /// Merges the body's flags into featureFlags; existing flags the body
    /// does not name are left alone.
    pub(crate) fn company_patch_modules(&mut self, id: &str, body: &Value) -> FacadeResult {
        let flags = match body {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            _ => return Err(ApiError::bad_request("expected an object of module flags")),
        };

        let company = find_record_mut(self.companies_mut(), id)
            .ok_or_else(|| ApiError::not_found("Company not found"))?;

        if !company["featureFlags"].is_object() {
            company["featureFlags"] = json!({});
        }
        if let Some(existing) = company["featureFlags"].as_object_mut() {
            for (key, value) in flags {
                existing.insert(key, value);
            }
        }

        let updated = company.clone();
        self.sync();
        Ok(updated)
    }
}
