//! Audit event feed endpoint.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use storium_types::AuditRecord;

use crate::server::{ApiError, SharedState};

/// Hard cap on one feed page.
const MAX_PAGE: usize = 1_000;

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Cursor: only records with `seq > since` are returned.
    #[serde(default)]
    pub since: u64,

    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventFeedResponse {
    pub events: Vec<AuditRecord>,

    /// Sequence number of the newest record in the log, for cursor
    /// bookkeeping.
    pub latest_seq: u64,
}

/// GET /events?since=&limit= - append-only mutation feed
pub async fn handle_events(
    State(state): State<SharedState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventFeedResponse>, (StatusCode, Json<ApiError>)> {
    let limit = query.limit.min(MAX_PAGE);
    let events = state.registry.events_since(query.since, limit);

    Ok(Json(EventFeedResponse {
        events,
        latest_seq: state.registry.latest_event_seq(),
    }))
}
