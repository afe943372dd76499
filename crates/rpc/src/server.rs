//! Server state, router assembly, and shared wire plumbing.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use storium_registry::{Registry, RegistryError};
use storium_types::Identity;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::access::{
    handle_access_summary, handle_account_access_list, handle_account_grantees,
    handle_file_access_list, handle_grant_account, handle_grant_file, handle_revoke_account,
    handle_revoke_file,
};
use crate::events::handle_events;
use crate::files::{
    handle_add_file, handle_delete_file, handle_file_access_check, handle_my_files,
    handle_public_files, handle_user_files,
};

/// Header carrying the pre-verified caller identity.
pub const IDENTITY_HEADER: &str = "x-storium-identity";

/// Wire-level error payload: `{ "error": { "code", "message" } }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self {
            error: ApiErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }
}

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub start_time: Instant,
    pub node_id: String,
    pub req_count: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, node_id: impl Into<String>) -> Self {
        Self {
            registry,
            start_time: Instant::now(),
            node_id: node_id.into(),
            req_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn record_request(&self) -> u64 {
        self.req_count.fetch_add(1, Ordering::Relaxed) as u64 + 1
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;

/// Map an engine error onto a wire response.
///
/// `access_denied` and `unauthorized` share a status code but keep distinct
/// error codes: the former is a non-fatal read outcome, the latter a
/// rejected mutation.
pub fn engine_error(err: RegistryError) -> (StatusCode, Json<ApiError>) {
    let (status, code) = match &err {
        RegistryError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        RegistryError::Unauthorized(_) => (StatusCode::FORBIDDEN, "unauthorized"),
        RegistryError::AccessDenied => (StatusCode::FORBIDDEN, "access_denied"),
        RegistryError::SelfGrant => (StatusCode::BAD_REQUEST, "self_grant"),
        RegistryError::InvalidIdentity(_) => (StatusCode::BAD_REQUEST, "invalid_identity"),
        RegistryError::InvalidRecord(_) => (StatusCode::BAD_REQUEST, "invalid_record"),
    };
    (status, Json(ApiError::new(code, &err.to_string())))
}

/// Pull the pre-verified caller identity out of the request headers.
pub fn caller_identity(headers: &HeaderMap) -> Result<Identity, (StatusCode, Json<ApiError>)> {
    let value = headers
        .get(IDENTITY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ApiError::new(
                    "invalid_identity",
                    &format!("missing {} header", IDENTITY_HEADER),
                )),
            )
        })?;

    parse_identity(value)
}

/// Parse an identity string from a path segment or header value.
pub fn parse_identity(value: &str) -> Result<Identity, (StatusCode, Json<ApiError>)> {
    Identity::decode(value).map_err(|err| engine_error(RegistryError::InvalidIdentity(err)))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    node_id: String,
    uptime_secs: u64,
    file_count: u64,
    event_count: u64,
    req_total: u64,
}

/// GET /health - liveness and basic counters
async fn handle_health(
    State(state): State<SharedState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ApiError>)> {
    let req_total = state.record_request();
    let file_count = state.registry.file_count().map_err(engine_error)?;

    Ok(Json(HealthResponse {
        status: "ok",
        node_id: state.node_id.clone(),
        uptime_secs: state.uptime_seconds(),
        file_count,
        event_count: state.registry.latest_event_seq(),
        req_total,
    }))
}

/// Assemble the router over the shared state.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/files", post(handle_add_file))
        .route("/files/mine", get(handle_my_files))
        .route("/files/public", get(handle_public_files))
        .route("/files/user/:identity", get(handle_user_files))
        .route("/files/:id", delete(handle_delete_file))
        .route("/files/:id/access/:identity", get(handle_file_access_check))
        .route(
            "/access/account",
            post(handle_grant_account).get(handle_account_access_list),
        )
        .route("/access/account/grantees", get(handle_account_grantees))
        .route("/access/account/:identity", delete(handle_revoke_account))
        .route(
            "/access/file",
            post(handle_grant_file)
                .delete(handle_revoke_file)
                .get(handle_file_access_list),
        )
        .route("/access/summary/:identity", get(handle_access_summary))
        .route("/events", get(handle_events))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn start_server(addr: SocketAddr, state: SharedState) -> Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("registry RPC listening on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}
