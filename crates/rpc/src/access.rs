//! Access-control RPC endpoints.

use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use storium_registry::{AccountGrantRow, FileGrantRow};
use storium_types::FileId;

use crate::server::{caller_identity, engine_error, parse_identity, ApiError, SharedState};

/// Request to grant account-wide access.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountGrantRequest {
    /// Identity receiving access to all of the caller's files.
    pub grantee: String,
}

/// Request to grant or revoke access to one file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileGrantRequest {
    pub file_id: u64,
    pub grantee: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GrantResponse {
    pub grantee: String,
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileGrantResponse {
    pub file_id: u64,
    pub grantee: String,
    pub active: bool,
}

/// One account-grant row on the wire, revoked rows included.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountGrantEntry {
    pub grantee: String,
    pub active: bool,
}

impl From<AccountGrantRow> for AccountGrantEntry {
    fn from(row: AccountGrantRow) -> Self {
        Self {
            grantee: row.grantee.encode(),
            active: row.active,
        }
    }
}

/// One file-grant row on the wire, revoked and inert rows included.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileGrantEntry {
    pub file_id: u64,
    pub grantee: String,
    pub active: bool,
}

impl From<FileGrantRow> for FileGrantEntry {
    fn from(row: FileGrantRow) -> Self {
        Self {
            file_id: row.file_id.as_u64(),
            grantee: row.grantee.encode(),
            active: row.active,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountAccessListResponse {
    pub grants: Vec<AccountGrantEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccountGranteesResponse {
    pub grantees: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileAccessListResponse {
    pub grants: Vec<FileGrantEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessSummaryResponse {
    pub has_general_access: bool,
    pub accessible_file_ids: Vec<u64>,
    pub total_accessible_files: u64,
}

/// POST /access/account - grant account-wide access
pub async fn handle_grant_account(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<AccountGrantRequest>,
) -> Result<Json<GrantResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let grantee = parse_identity(&request.grantee)?;

    state
        .registry
        .grant_account_access(caller, grantee)
        .map_err(engine_error)?;

    Ok(Json(GrantResponse {
        grantee: grantee.encode(),
        active: true,
    }))
}

/// DELETE /access/account/{identity} - revoke account-wide access
pub async fn handle_revoke_account(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AxumPath(identity): AxumPath<String>,
) -> Result<Json<GrantResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let grantee = parse_identity(&identity)?;

    state
        .registry
        .revoke_account_access(caller, grantee)
        .map_err(engine_error)?;

    Ok(Json(GrantResponse {
        grantee: grantee.encode(),
        active: false,
    }))
}

/// POST /access/file - grant access to one file
pub async fn handle_grant_file(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<FileGrantRequest>,
) -> Result<Json<FileGrantResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let grantee = parse_identity(&request.grantee)?;

    state
        .registry
        .grant_file_access(caller, FileId(request.file_id), grantee)
        .map_err(engine_error)?;

    Ok(Json(FileGrantResponse {
        file_id: request.file_id,
        grantee: grantee.encode(),
        active: true,
    }))
}

/// DELETE /access/file - revoke access to one file
pub async fn handle_revoke_file(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<FileGrantRequest>,
) -> Result<Json<FileGrantResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let grantee = parse_identity(&request.grantee)?;

    state
        .registry
        .revoke_file_access(caller, FileId(request.file_id), grantee)
        .map_err(engine_error)?;

    Ok(Json(FileGrantResponse {
        file_id: request.file_id,
        grantee: grantee.encode(),
        active: false,
    }))
}

/// GET /access/account - the caller's account-grant rows, history included
pub async fn handle_account_access_list(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<AccountAccessListResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let grants = state
        .registry
        .account_access_list(caller)
        .into_iter()
        .map(AccountGrantEntry::from)
        .collect();

    Ok(Json(AccountAccessListResponse { grants }))
}

/// GET /access/account/grantees - identities with active account access
pub async fn handle_account_grantees(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<AccountGranteesResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let grantees = state
        .registry
        .account_grantees(caller)
        .into_iter()
        .map(|identity| identity.encode())
        .collect();

    Ok(Json(AccountGranteesResponse { grantees }))
}

/// GET /access/file - the caller's file-grant rows, history included
pub async fn handle_file_access_list(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<FileAccessListResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let grants = state
        .registry
        .file_access_list(caller)
        .into_iter()
        .map(FileGrantEntry::from)
        .collect();

    Ok(Json(FileAccessListResponse { grants }))
}

/// GET /access/summary/{identity} - what the caller can reach of a target
pub async fn handle_access_summary(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AxumPath(identity): AxumPath<String>,
) -> Result<Json<AccessSummaryResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let target = parse_identity(&identity)?;

    let summary = state
        .registry
        .access_summary(caller, target)
        .map_err(engine_error)?;

    Ok(Json(AccessSummaryResponse {
        has_general_access: summary.has_general_access,
        accessible_file_ids: summary
            .accessible_file_ids
            .into_iter()
            .map(|id| id.as_u64())
            .collect(),
        total_accessible_files: summary.total_accessible_files,
    }))
}
