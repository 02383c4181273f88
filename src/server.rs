//! HTTP surface: serves the facade as a local mock backend so the console can
//! point at it during offline development.
//!
//! The router is deliberately a single catch-all: path matching is the
//! facade's job (it is the component under test), so the HTTP layer only
//! translates between wire shapes and `Facade::dispatch`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::error::ApiError;
use crate::facade::Facade;
use crate::middleware::ApiResponse;

/// Facade access is serialized through a mutex: one logical request runs to
/// completion before the next, matching the single-threaded contract the
/// mock guarantees.
pub type SharedFacade = Arc<Mutex<Facade>>;

pub fn app(facade: SharedFacade) -> Router {
    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .fallback(dispatch)
        .with_state(facade);

    if config::config().server.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    if config::config().security.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router
}

async fn dispatch(
    State(facade): State<SharedFacade>,
    method: Method,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let body_value = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Some(value),
            Err(e) => {
                return ApiError::bad_request(format!("invalid JSON body: {}", e)).into_response()
            }
        }
    };

    let result = match facade.lock() {
        Ok(mut facade) => facade.dispatch(&method, uri.path(), &params, body_value.as_ref()),
        Err(_) => Err(ApiError::internal_server_error("facade state poisoned")),
    };

    match result {
        Ok(data) => ApiResponse::success(data).into_response(),
        Err(err) => err.into_response(),
    }
}

async fn root() -> ApiResponse<Value> {
    let version = env!("CARGO_PKG_VERSION");

    ApiResponse::success(json!({
        "name": "WatchDesk Mock Admin API",
        "version": version,
        "description": "In-memory mock of the super-admin backend for offline console development",
        "endpoints": {
            "users": "/superadmin/users[/:id], /superadmin/users/invite, /superadmin/users/:id/impersonate",
            "companies": "/superadmin/companies, /superadmin/companies/:id/billing, /superadmin/companies/:id/modules",
            "billing": "/superadmin/billing/invoices[/:id], /superadmin/billing/payments",
            "support": "/superadmin/support/tickets[/:id], /superadmin/support/tickets/:id/reply",
            "logs": "/superadmin/logs",
            "metrics": "/superadmin/metrics?range=7d|30d|90d",
        }
    }))
}

async fn health() -> ApiResponse<Value> {
    ApiResponse::success(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}
