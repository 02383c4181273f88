//! Audit log handler. Read-only from the facade's perspective; entries are
//! written by the (real) backend's own actions.

use serde_json::Value;

use crate::query::{by_date_desc, field_eq, in_date_range, matches_query, paginate, ListParams};

use super::{Facade, FacadeResult, Params};

impl Facade {
    pub(crate) fn logs_list(&self, params: &Params) -> FacadeResult {
        let p = ListParams::from_map(params);
        let mut list: Vec<Value> = self
            .logs()
            .iter()
            .filter(|l| {
                matches_query(
                    &p.q,
                    &[l.get("action"), l.get("message"), l.get("actor"), l.get("target")],
                )
            })
            .filter(|l| field_eq(l, "level", p.level.as_deref()))
            .filter(|l| field_eq(l, "companyId", p.company_id.as_deref()))
            .filter(|l| in_date_range(l, "ts", p.start, p.end))
            .cloned()
            .collect();
        list.sort_by(|a, b| by_date_desc(a, b, "ts"));
        Ok(paginate(list, p.page, p.limit))
    }
}
