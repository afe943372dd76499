//! Registry facade composing the record store, access table, and audit log.

use crate::access::{AccessTable, AccountGrantRow, FileGrantRow};
use crate::audit::AuditLog;
use crate::error::Result;
use crate::query::{AccessSummary, QueryEngine};
use crate::store::{MemoryRecordStore, RecordStore};
use std::sync::Arc;
use storium_types::{AuditEvent, AuditRecord, FileId, FileRecord, Identity, NewFile};
use tracing::debug;

/// The file registry and access-control engine.
///
/// Mutations validate the caller against ownership rules, apply against the
/// store and access table, then append exactly one audit event (idempotent
/// re-grants included). A failed mutation has no observable side effect.
pub struct Registry {
    store: Arc<dyn RecordStore>,
    access: Arc<AccessTable>,
    query: QueryEngine,
    audit: AuditLog,
}

impl Registry {
    /// Registry backed by the in-memory record store.
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryRecordStore::new()))
    }

    /// Registry over a caller-provided storage backend.
    pub fn with_store(store: Arc<dyn RecordStore>) -> Self {
        let access = Arc::new(AccessTable::new(store.clone()));
        let query = QueryEngine::new(store.clone(), access.clone());
        Self {
            store,
            access,
            query,
            audit: AuditLog::new(),
        }
    }

    /// Register a new file, returning the stored record with its assigned
    /// ID and upload time.
    pub fn add_file(&self, caller: Identity, file: NewFile) -> Result<FileRecord> {
        let record = self.store.create(caller, file)?;
        debug!(file_id = %record.id, owner = %record.owner, "file registered");
        self.audit.append(AuditEvent::FileUploaded {
            actor: caller,
            file_id: record.id,
            file_name: record.file_name.clone(),
            content_hash: record.content_hash.clone(),
        });
        Ok(record)
    }

    /// Tombstone a file. Owner-only.
    pub fn delete_file(&self, caller: Identity, id: FileId) -> Result<()> {
        self.store.delete(id, caller)?;
        debug!(file_id = %id, "file deleted");
        self.audit.append(AuditEvent::FileDeleted {
            actor: caller,
            file_id: id,
        });
        Ok(())
    }

    /// Grant `grantee` read access to all of the caller's files, present
    /// and future.
    pub fn grant_account_access(&self, caller: Identity, grantee: Identity) -> Result<()> {
        self.access.grant_account(caller, grantee)?;
        self.audit.append(AuditEvent::AccessGranted {
            owner: caller,
            grantee,
        });
        Ok(())
    }

    pub fn revoke_account_access(&self, caller: Identity, grantee: Identity) -> Result<()> {
        self.access.revoke_account(caller, grantee)?;
        self.audit.append(AuditEvent::AccessRevoked {
            owner: caller,
            grantee,
        });
        Ok(())
    }

    /// Grant `grantee` read access to one of the caller's files.
    pub fn grant_file_access(
        &self,
        caller: Identity,
        file_id: FileId,
        grantee: Identity,
    ) -> Result<()> {
        self.access.grant_file(file_id, caller, grantee)?;
        self.audit.append(AuditEvent::FileAccessGranted {
            owner: caller,
            grantee,
            file_id,
        });
        Ok(())
    }

    pub fn revoke_file_access(
        &self,
        caller: Identity,
        file_id: FileId,
        grantee: Identity,
    ) -> Result<()> {
        self.access.revoke_file(file_id, caller, grantee)?;
        self.audit.append(AuditEvent::FileAccessRevoked {
            owner: caller,
            grantee,
            file_id,
        });
        Ok(())
    }

    /// Every live record the caller owns, ascending ID.
    pub fn get_my_files(&self, caller: Identity) -> Result<Vec<FileRecord>> {
        self.query.own_files(caller)
    }

    /// The target's records visible to the caller, ascending ID, or
    /// `AccessDenied`.
    pub fn get_user_files(&self, caller: Identity, target: Identity) -> Result<Vec<FileRecord>> {
        self.query.files_of(target, caller)
    }

    /// Every live public record, ascending ID.
    pub fn get_public_files(&self) -> Result<Vec<FileRecord>> {
        self.query.public_files()
    }

    /// A single live record by ID.
    pub fn get_file(&self, id: FileId) -> Result<FileRecord> {
        self.store.get(id)
    }

    /// The central authorization predicate.
    pub fn has_access(&self, file_id: FileId, requester: Identity) -> Result<bool> {
        self.access.has_access(file_id, requester)
    }

    /// The file-grant layer alone.
    pub fn has_file_access(&self, file_id: FileId, requester: Identity) -> Result<bool> {
        self.access.has_file_access(file_id, requester)
    }

    /// The caller's account-wide grant rows, revoked included.
    pub fn account_access_list(&self, caller: Identity) -> Vec<AccountGrantRow> {
        self.access.list_account_grants(caller)
    }

    /// Identities currently holding an active account grant from the
    /// caller.
    pub fn account_grantees(&self, caller: Identity) -> Vec<Identity> {
        self.access.list_account_grantees(caller)
    }

    /// The caller's per-file grant rows, revoked and inert included.
    pub fn file_access_list(&self, caller: Identity) -> Vec<FileGrantRow> {
        self.access.list_file_grants(caller)
    }

    /// What the caller can reach of the target's files.
    pub fn access_summary(&self, caller: Identity, target: Identity) -> Result<AccessSummary> {
        self.query.access_summary(target, caller)
    }

    /// Audit records with `seq > after`, oldest first.
    pub fn events_since(&self, after: u64, limit: usize) -> Vec<AuditRecord> {
        self.audit.events_since(after, limit)
    }

    /// Sequence number of the newest audit record.
    pub fn latest_event_seq(&self) -> u64 {
        self.audit.latest_seq()
    }

    /// Count of live records in the store.
    pub fn file_count(&self) -> Result<u64> {
        self.store.count()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
