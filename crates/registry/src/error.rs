//! Error types for the registry engine.

use storium_types::{FileId, IdentityError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// The file ID does not resolve to a live record.
    #[error("file {0} not found")]
    NotFound(FileId),

    /// The actor attempted an owner-only mutation on a file it does not own.
    #[error("caller is not the owner of file {0}")]
    Unauthorized(FileId),

    /// The requester has no read path to the target's files.
    #[error("no access to the requested files")]
    AccessDenied,

    /// Grant or revoke targeting the caller itself.
    #[error("cannot grant or revoke access for yourself")]
    SelfGrant,

    /// Malformed principal identifier.
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[from] IdentityError),

    /// Malformed file record input.
    #[error("invalid file record: {0}")]
    InvalidRecord(String),
}

pub type Result<T> = std::result::Result<T, RegistryError>;
