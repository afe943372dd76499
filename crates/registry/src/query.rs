//! Read-side composition over the record store and access table.
//!
//! Every call here is a pure filter over the two components; no state is
//! held. Results are returned in creation order (ascending ID); any other
//! presentation ordering is a client concern.

use crate::access::AccessTable;
use crate::error::{RegistryError, Result};
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storium_types::{FileId, FileRecord, Identity};

/// What one requester can reach of one target's files. Used by clients to
/// pre-flight a listing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessSummary {
    /// Active account-wide grant from target to requester.
    pub has_general_access: bool,

    /// Live files of the target covered by a per-file grant to the
    /// requester, ascending ID.
    pub accessible_file_ids: Vec<FileId>,

    pub total_accessible_files: u64,
}

pub struct QueryEngine {
    store: Arc<dyn RecordStore>,
    access: Arc<AccessTable>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn RecordStore>, access: Arc<AccessTable>) -> Self {
        Self { store, access }
    }

    /// Every live record the caller owns. No access check: an owner always
    /// has access to its own files.
    pub fn own_files(&self, caller: Identity) -> Result<Vec<FileRecord>> {
        let mut files = self.store.list_by_owner(&caller)?;
        files.sort_by_key(|record| record.id);
        Ok(files)
    }

    /// The target's records visible to the requester.
    ///
    /// A public record is visible to anyone; everything else goes through
    /// the access predicate. When nothing is visible, an authorized
    /// requester gets an empty sequence and a requester with no read path
    /// at all gets `AccessDenied`.
    pub fn files_of(&self, target: Identity, requester: Identity) -> Result<Vec<FileRecord>> {
        let mut files = self.store.list_by_owner(&target)?;
        files.sort_by_key(|record| record.id);

        if requester == target {
            return Ok(files);
        }

        let mut visible = Vec::new();
        for record in files {
            if record.is_public || self.access.has_access(record.id, requester)? {
                visible.push(record);
            }
        }

        if !visible.is_empty() {
            return Ok(visible);
        }

        if self.access.account_grant_active(target, requester)
            || !self.access.file_grants_for(target, requester).is_empty()
        {
            Ok(Vec::new())
        } else {
            Err(RegistryError::AccessDenied)
        }
    }

    /// Every live public record, any owner.
    pub fn public_files(&self) -> Result<Vec<FileRecord>> {
        let mut files = self.store.list_public()?;
        files.sort_by_key(|record| record.id);
        Ok(files)
    }

    /// Aggregate the requester's reachability into the target's files.
    pub fn access_summary(&self, target: Identity, requester: Identity) -> Result<AccessSummary> {
        let has_general_access = self.access.account_grant_active(target, requester);

        let mut accessible_file_ids: Vec<FileId> = self
            .access
            .file_grants_for(target, requester)
            .into_iter()
            .filter(|id| self.store.get(*id).is_ok())
            .collect();
        accessible_file_ids.sort();

        let total_accessible_files = accessible_file_ids.len() as u64;
        Ok(AccessSummary {
            has_general_access,
            accessible_file_ids,
            total_accessible_files,
        })
    }
}
