//! User handlers: list/invite/patch/delete plus the impersonation and
//! password-reset actions.

use serde_json::{json, Value};

use crate::auth::{generate_jwt, Claims};
use crate::error::ApiError;
use crate::query::{field_eq, matches_query, paginate, ListParams};
use crate::record::{now_iso, str_field};

use super::{find_index, find_record, find_record_mut, Facade, FacadeResult, Params};

/// Fields a user PATCH may overwrite. Identity and createdAt are immutable.
const PATCH_FIELDS: &[&str] = &["name", "company", "role", "status"];

impl Facade {
    pub(crate) fn users_list(&self, params: &Params) -> FacadeResult {
        let p = ListParams::from_map(params);
        let list: Vec<Value> = self
            .users()
            .iter()
            .filter(|u| {
                matches_query(&p.q, &[u.get("name"), u.get("email"), u.get("company")])
            })
            .filter(|u| field_eq(u, "status", p.status.as_deref()))
            .filter(|u| field_eq(u, "role", p.role.as_deref()))
            .cloned()
            .collect();
        // users keep insertion order; the newest invite sits on top already
        Ok(paginate(list, p.page, p.limit))
    }

    pub(crate) fn users_invite(&mut self, body: &Value) -> FacadeResult {
        let email = str_field(body, "email")
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ApiError::bad_request("email required"))?
            .to_string();

        let lowered = email.to_lowercase();
        let duplicate = self
            .users()
            .iter()
            .any(|u| str_field(u, "email").is_some_and(|e| e.to_lowercase() == lowered));
        if duplicate {
            return Err(ApiError::bad_request("email already exists"));
        }

        let name = str_field(body, "name")
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email.split('@').next().unwrap_or(&email).to_string());
        let role = str_field(body, "role").unwrap_or("agent").to_string();
        let company = str_field(body, "company").unwrap_or("Unassigned").to_string();

        let id = self.next_id("u");
        let user = json!({
            "_id": id,
            "name": name,
            "email": email,
            "role": role,
            "company": company,
            "status": "active",
            "createdAt": now_iso(),
        });

        self.users_mut().insert(0, user.clone());
        self.sync();
        Ok(user)
    }

    pub(crate) fn user_patch(&mut self, id: &str, body: &Value) -> FacadeResult {
        let user = find_record_mut(self.users_mut(), id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        // allow-listed fields only, and explicit nulls are skipped (a null
        // here means the form left the field untouched)
        for key in PATCH_FIELDS {
            if let Some(value) = body.get(key) {
                if !value.is_null() {
                    user[*key] = value.clone();
                }
            }
        }

        let updated = user.clone();
        self.sync();
        Ok(updated)
    }

    pub(crate) fn user_delete(&mut self, id: &str) -> FacadeResult {
        let index = find_index(self.users(), id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        self.users_mut().remove(index);
        self.sync();
        Ok(json!({ "ok": true, "id": id }))
    }

    pub(crate) fn user_impersonate(&self, id: &str) -> FacadeResult {
        let user = find_record(self.users(), id)
            .ok_or_else(|| ApiError::not_found("User not found"))?;

        let claims = Claims::impersonation(user);
        let token = generate_jwt(&claims)
            .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

        Ok(json!({ "token": token, "user": user }))
    }

    pub(crate) fn user_reset_password(&self, id: &str) -> FacadeResult {
        find_record(self.users(), id).ok_or_else(|| ApiError::not_found("User not found"))?;
        // the mock has no credential store; acknowledging is enough for the UI
        Ok(json!({ "ok": true }))
    }
}
