//! File registry RPC endpoints.

use axum::extract::{Path as AxumPath, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use storium_registry::RegistryError;
use storium_types::{FileId, FileRecord, FileType, NewFile};

use crate::server::{caller_identity, engine_error, parse_identity, ApiError, SharedState};

/// Request to register a file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddFileRequest {
    /// Display name, required.
    pub file_name: String,

    /// Category: one of image, document, video, audio, other.
    pub file_type: String,

    /// Opaque reference into the external content store.
    pub content_hash: String,

    /// Size in bytes as reported by the uploader.
    pub file_size: u64,

    /// Whether the record is listed publicly.
    #[serde(default)]
    pub is_public: bool,

    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,

    /// Optional tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A file record on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct FileRecordResponse {
    /// Registry-assigned ID.
    pub id: u64,

    /// Owner identity.
    pub owner: String,

    /// Display name.
    pub file_name: String,

    /// Category.
    pub file_type: String,

    /// Content store reference (echoed back).
    pub content_hash: String,

    /// Size in bytes.
    pub file_size: u64,

    /// Registry-assigned upload timestamp (microseconds).
    pub upload_time_us: u64,

    /// Whether the record is listed publicly.
    pub is_public: bool,

    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl From<FileRecord> for FileRecordResponse {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id.as_u64(),
            owner: record.owner.encode(),
            file_name: record.file_name,
            file_type: record.file_type.to_string(),
            content_hash: record.content_hash,
            file_size: record.file_size,
            upload_time_us: record.upload_time_us,
            is_public: record.is_public,
            description: record.description,
            tags: record.tags,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileListResponse {
    pub files: Vec<FileRecordResponse>,
}

fn list_response(records: Vec<FileRecord>) -> FileListResponse {
    FileListResponse {
        files: records.into_iter().map(FileRecordResponse::from).collect(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    pub file_id: u64,
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileAccessCheckResponse {
    pub file_id: u64,
    pub user: String,
    pub has_access: bool,
}

/// POST /files - register a new file
pub async fn handle_add_file(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(request): Json<AddFileRequest>,
) -> Result<Json<FileRecordResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;

    let file_type: FileType = request.file_type.parse().map_err(|_| {
        engine_error(RegistryError::InvalidRecord(format!(
            "unknown file type: {}",
            request.file_type
        )))
    })?;

    let file = NewFile {
        file_name: request.file_name,
        file_type,
        content_hash: request.content_hash,
        file_size: request.file_size,
        is_public: request.is_public,
        description: request.description,
        tags: request.tags,
    };

    let record = state.registry.add_file(caller, file).map_err(engine_error)?;
    Ok(Json(record.into()))
}

/// DELETE /files/{id} - tombstone a file (owner-only)
pub async fn handle_delete_file(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AxumPath(id): AxumPath<u64>,
) -> Result<Json<DeleteFileResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    state
        .registry
        .delete_file(caller, FileId(id))
        .map_err(engine_error)?;

    Ok(Json(DeleteFileResponse {
        file_id: id,
        deleted: true,
    }))
}

/// GET /files/mine - the caller's own files
pub async fn handle_my_files(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<FileListResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let records = state.registry.get_my_files(caller).map_err(engine_error)?;
    Ok(Json(list_response(records)))
}

/// GET /files/user/{identity} - another user's files, access-filtered
pub async fn handle_user_files(
    State(state): State<SharedState>,
    headers: HeaderMap,
    AxumPath(identity): AxumPath<String>,
) -> Result<Json<FileListResponse>, (StatusCode, Json<ApiError>)> {
    let caller = caller_identity(&headers)?;
    let target = parse_identity(&identity)?;

    let records = state
        .registry
        .get_user_files(caller, target)
        .map_err(engine_error)?;
    Ok(Json(list_response(records)))
}

/// GET /files/public - every public file, no identity required
pub async fn handle_public_files(
    State(state): State<SharedState>,
) -> Result<Json<FileListResponse>, (StatusCode, Json<ApiError>)> {
    let records = state.registry.get_public_files().map_err(engine_error)?;
    Ok(Json(list_response(records)))
}

/// GET /files/{id}/access/{identity} - file-grant layer check
pub async fn handle_file_access_check(
    State(state): State<SharedState>,
    AxumPath((id, identity)): AxumPath<(u64, String)>,
) -> Result<Json<FileAccessCheckResponse>, (StatusCode, Json<ApiError>)> {
    let user = parse_identity(&identity)?;
    let has_access = state
        .registry
        .has_file_access(FileId(id), user)
        .map_err(engine_error)?;

    Ok(Json(FileAccessCheckResponse {
        file_id: id,
        user: user.encode(),
        has_access,
    }))
}
