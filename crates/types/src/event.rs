//! Audit events appended on every successful registry mutation.

use crate::file::FileId;
use crate::identity::Identity;
use serde::{Deserialize, Serialize};

/// One mutation observed by the registry.
///
/// A closed, tagged set: each kind carries exactly the fields external
/// observers need to reconstruct the state change without re-querying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AuditEvent {
    FileUploaded {
        actor: Identity,
        file_id: FileId,
        file_name: String,
        content_hash: String,
    },
    FileDeleted {
        actor: Identity,
        file_id: FileId,
    },
    AccessGranted {
        owner: Identity,
        grantee: Identity,
    },
    AccessRevoked {
        owner: Identity,
        grantee: Identity,
    },
    FileAccessGranted {
        owner: Identity,
        grantee: Identity,
        file_id: FileId,
    },
    FileAccessRevoked {
        owner: Identity,
        grantee: Identity,
        file_id: FileId,
    },
}

impl AuditEvent {
    /// Stable name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AuditEvent::FileUploaded { .. } => "FileUploaded",
            AuditEvent::FileDeleted { .. } => "FileDeleted",
            AuditEvent::AccessGranted { .. } => "AccessGranted",
            AuditEvent::AccessRevoked { .. } => "AccessRevoked",
            AuditEvent::FileAccessGranted { .. } => "FileAccessGranted",
            AuditEvent::FileAccessRevoked { .. } => "FileAccessRevoked",
        }
    }

    /// The identity that performed the mutation.
    pub fn actor(&self) -> Identity {
        match self {
            AuditEvent::FileUploaded { actor, .. } => *actor,
            AuditEvent::FileDeleted { actor, .. } => *actor,
            AuditEvent::AccessGranted { owner, .. } => *owner,
            AuditEvent::AccessRevoked { owner, .. } => *owner,
            AuditEvent::FileAccessGranted { owner, .. } => *owner,
            AuditEvent::FileAccessRevoked { owner, .. } => *owner,
        }
    }

    /// The file the event concerns, if any.
    pub fn file_id(&self) -> Option<FileId> {
        match self {
            AuditEvent::FileUploaded { file_id, .. } => Some(*file_id),
            AuditEvent::FileDeleted { file_id, .. } => Some(*file_id),
            AuditEvent::FileAccessGranted { file_id, .. } => Some(*file_id),
            AuditEvent::FileAccessRevoked { file_id, .. } => Some(*file_id),
            AuditEvent::AccessGranted { .. } | AuditEvent::AccessRevoked { .. } => None,
        }
    }
}

/// An appended audit log entry.
///
/// `seq` starts at 1 and increases by one per append; records are never
/// mutated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub seq: u64,
    pub time_us: u64,
    #[serde(flatten)]
    pub event: AuditEvent,
}
