//! Account-wide and per-file access grants.
//!
//! Two independent authorization layers composed by logical OR inside
//! [`AccessTable::has_access`], the single predicate every read path goes
//! through. Rows are tombstoned on revoke (flipped inactive, never removed)
//! so listings keep history visible.

use crate::error::{RegistryError, Result};
use crate::shard::ShardedMap;
use crate::store::RecordStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storium_types::{FileId, Identity};

/// One account-wide grant row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountGrantRow {
    pub grantee: Identity,
    pub active: bool,
}

/// One per-file grant row, scoped to a single file of the grantor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileGrantRow {
    pub file_id: FileId,
    pub grantee: Identity,
    pub active: bool,
}

/// The access-control table.
///
/// Ownership is always resolved through the record store; a caller-asserted
/// owner is never trusted.
pub struct AccessTable {
    store: Arc<dyn RecordStore>,

    /// grantor -> rows in insertion order, revoked rows kept.
    account_grants: ShardedMap<Identity, Vec<AccountGrantRow>>,

    /// owner -> rows in insertion order, revoked and inert rows kept.
    file_grants: ShardedMap<Identity, Vec<FileGrantRow>>,
}

impl AccessTable {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            account_grants: ShardedMap::new(),
            file_grants: ShardedMap::new(),
        }
    }

    /// Grant `grantee` read access to all of `grantor`'s files, present and
    /// future. Idempotent: at most one row per (grantor, grantee) pair.
    pub fn grant_account(&self, grantor: Identity, grantee: Identity) -> Result<()> {
        if grantor == grantee {
            return Err(RegistryError::SelfGrant);
        }

        let mut grants = self.account_grants.write(&grantor);
        let rows = grants.entry(grantor).or_default();
        match rows.iter_mut().find(|row| row.grantee == grantee) {
            Some(row) => row.active = true,
            None => rows.push(AccountGrantRow {
                grantee,
                active: true,
            }),
        }
        Ok(())
    }

    /// Revoke an account-wide grant. The row is flipped inactive, never
    /// removed; revoking an absent grant is a no-op.
    pub fn revoke_account(&self, grantor: Identity, grantee: Identity) -> Result<()> {
        if grantor == grantee {
            return Err(RegistryError::SelfGrant);
        }

        let mut grants = self.account_grants.write(&grantor);
        if let Some(rows) = grants.get_mut(&grantor) {
            if let Some(row) = rows.iter_mut().find(|row| row.grantee == grantee) {
                row.active = false;
            }
        }
        Ok(())
    }

    /// Grant `grantee` read access to one file. Fails unless `actor` is the
    /// file's true owner.
    pub fn grant_file(&self, file_id: FileId, actor: Identity, grantee: Identity) -> Result<()> {
        if actor == grantee {
            return Err(RegistryError::SelfGrant);
        }

        let owner = self.store.owner_of(file_id)?;
        if owner != actor {
            return Err(RegistryError::Unauthorized(file_id));
        }

        let mut grants = self.file_grants.write(&owner);
        let rows = grants.entry(owner).or_default();
        match rows
            .iter_mut()
            .find(|row| row.file_id == file_id && row.grantee == grantee)
        {
            Some(row) => row.active = true,
            None => rows.push(FileGrantRow {
                file_id,
                grantee,
                active: true,
            }),
        }
        Ok(())
    }

    /// Revoke a per-file grant. Same authorization rule as granting;
    /// revoking an absent grant is a no-op.
    pub fn revoke_file(&self, file_id: FileId, actor: Identity, grantee: Identity) -> Result<()> {
        if actor == grantee {
            return Err(RegistryError::SelfGrant);
        }

        let owner = self.store.owner_of(file_id)?;
        if owner != actor {
            return Err(RegistryError::Unauthorized(file_id));
        }

        let mut grants = self.file_grants.write(&owner);
        if let Some(rows) = grants.get_mut(&owner) {
            if let Some(row) = rows
                .iter_mut()
                .find(|row| row.file_id == file_id && row.grantee == grantee)
            {
                row.active = false;
            }
        }
        Ok(())
    }

    /// The authorization predicate: `requester` may read `file_id` iff it
    /// owns the file, holds an active account grant from the owner, or
    /// holds an active grant on this specific file.
    pub fn has_access(&self, file_id: FileId, requester: Identity) -> Result<bool> {
        let owner = self.store.owner_of(file_id)?;

        if owner == requester {
            return Ok(true);
        }

        if self.account_grant_active(owner, requester) {
            return Ok(true);
        }

        Ok(self.file_grant_active(owner, file_id, requester))
    }

    /// The file-grant layer alone; account grants do not leak into this
    /// view.
    pub fn has_file_access(&self, file_id: FileId, requester: Identity) -> Result<bool> {
        let owner = self.store.owner_of(file_id)?;
        Ok(self.file_grant_active(owner, file_id, requester))
    }

    /// Whether an active account-wide grant exists from `grantor` to
    /// `grantee`.
    pub fn account_grant_active(&self, grantor: Identity, grantee: Identity) -> bool {
        let grants = self.account_grants.read(&grantor);
        grants
            .get(&grantor)
            .map(|rows| rows.iter().any(|row| row.grantee == grantee && row.active))
            .unwrap_or(false)
    }

    fn file_grant_active(&self, owner: Identity, file_id: FileId, grantee: Identity) -> bool {
        let grants = self.file_grants.read(&owner);
        grants
            .get(&owner)
            .map(|rows| {
                rows.iter()
                    .any(|row| row.file_id == file_id && row.grantee == grantee && row.active)
            })
            .unwrap_or(false)
    }

    /// IDs of `owner`'s files with an active grant to `grantee`. May
    /// include IDs whose record has since been deleted; callers filter
    /// against the store.
    pub fn file_grants_for(&self, owner: Identity, grantee: Identity) -> Vec<FileId> {
        let grants = self.file_grants.read(&owner);
        grants
            .get(&owner)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.grantee == grantee && row.active)
                    .map(|row| row.file_id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every account row of `grantor`, revoked included, insertion order.
    pub fn list_account_grants(&self, grantor: Identity) -> Vec<AccountGrantRow> {
        let grants = self.account_grants.read(&grantor);
        grants.get(&grantor).cloned().unwrap_or_default()
    }

    /// Identities currently holding an active account grant from `grantor`.
    pub fn list_account_grantees(&self, grantor: Identity) -> Vec<Identity> {
        let grants = self.account_grants.read(&grantor);
        grants
            .get(&grantor)
            .map(|rows| {
                rows.iter()
                    .filter(|row| row.active)
                    .map(|row| row.grantee)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every file-grant row of `owner`, revoked and inert included,
    /// insertion order.
    pub fn list_file_grants(&self, owner: Identity) -> Vec<FileGrantRow> {
        let grants = self.file_grants.read(&owner);
        grants.get(&owner).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRecordStore;
    use storium_types::{FileType, NewFile};

    fn identity(byte: u8) -> Identity {
        Identity([byte; 20])
    }

    fn new_file(name: &str) -> NewFile {
        NewFile {
            file_name: name.to_string(),
            file_type: FileType::Other,
            content_hash: format!("hash-{}", name),
            file_size: 1,
            is_public: false,
            description: None,
            tags: vec![],
        }
    }

    fn table_with_store() -> (AccessTable, Arc<MemoryRecordStore>) {
        let store = Arc::new(MemoryRecordStore::new());
        (AccessTable::new(store.clone()), store)
    }

    #[test]
    fn self_grant_rejected_everywhere() {
        let (table, store) = table_with_store();
        let owner = identity(1);
        let record = store.create(owner, new_file("a")).unwrap();

        assert!(matches!(
            table.grant_account(owner, owner),
            Err(RegistryError::SelfGrant)
        ));
        assert!(matches!(
            table.revoke_account(owner, owner),
            Err(RegistryError::SelfGrant)
        ));
        assert!(matches!(
            table.grant_file(record.id, owner, owner),
            Err(RegistryError::SelfGrant)
        ));
        assert!(matches!(
            table.revoke_file(record.id, owner, owner),
            Err(RegistryError::SelfGrant)
        ));

        // Nothing was recorded.
        assert!(table.list_account_grants(owner).is_empty());
        assert!(table.list_file_grants(owner).is_empty());
    }

    #[test]
    fn account_grant_is_idempotent() {
        let (table, _store) = table_with_store();
        let grantor = identity(1);
        let grantee = identity(2);

        table.grant_account(grantor, grantee).unwrap();
        table.grant_account(grantor, grantee).unwrap();

        let rows = table.list_account_grants(grantor);
        assert_eq!(rows.len(), 1, "double grant must not duplicate the row");
        assert!(rows[0].active);
    }

    #[test]
    fn revoke_tombstones_the_row() {
        let (table, _store) = table_with_store();
        let grantor = identity(1);
        let grantee = identity(2);

        table.grant_account(grantor, grantee).unwrap();
        table.revoke_account(grantor, grantee).unwrap();

        let rows = table.list_account_grants(grantor);
        assert_eq!(rows.len(), 1);
        assert!(!rows[0].active, "revoked row stays visible as inactive");

        assert!(!table.account_grant_active(grantor, grantee));
        assert!(table.list_account_grantees(grantor).is_empty());
    }

    #[test]
    fn revoking_absent_grant_is_a_noop() {
        let (table, _store) = table_with_store();
        assert!(table.revoke_account(identity(1), identity(2)).is_ok());
        assert!(table.list_account_grants(identity(1)).is_empty());
    }

    #[test]
    fn file_grant_requires_true_owner() {
        let (table, store) = table_with_store();
        let owner = identity(1);
        let impostor = identity(2);
        let grantee = identity(3);
        let record = store.create(owner, new_file("a")).unwrap();

        let err = table.grant_file(record.id, impostor, grantee).unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(_)));
        assert!(!table.has_file_access(record.id, grantee).unwrap());
    }

    #[test]
    fn file_grant_on_unknown_file_is_not_found() {
        let (table, _store) = table_with_store();
        let err = table
            .grant_file(FileId(99), identity(1), identity(2))
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn predicate_is_three_way_or() {
        let (table, store) = table_with_store();
        let owner = identity(1);
        let by_account = identity(2);
        let by_file = identity(3);
        let stranger = identity(4);
        let record = store.create(owner, new_file("a")).unwrap();

        table.grant_account(owner, by_account).unwrap();
        table.grant_file(record.id, owner, by_file).unwrap();

        assert!(table.has_access(record.id, owner).unwrap());
        assert!(table.has_access(record.id, by_account).unwrap());
        assert!(table.has_access(record.id, by_file).unwrap());
        assert!(!table.has_access(record.id, stranger).unwrap());

        // The file-grant view exposes only its own layer.
        assert!(!table.has_file_access(record.id, by_account).unwrap());
        assert!(table.has_file_access(record.id, by_file).unwrap());
    }

    #[test]
    fn layers_revoke_independently() {
        let (table, store) = table_with_store();
        let owner = identity(1);
        let grantee = identity(2);
        let record = store.create(owner, new_file("a")).unwrap();

        table.grant_account(owner, grantee).unwrap();
        table.grant_file(record.id, owner, grantee).unwrap();

        table.revoke_account(owner, grantee).unwrap();
        assert!(
            table.has_access(record.id, grantee).unwrap(),
            "file grant must survive an account revoke"
        );

        table.grant_account(owner, grantee).unwrap();
        table.revoke_file(record.id, owner, grantee).unwrap();
        assert!(
            table.has_access(record.id, grantee).unwrap(),
            "account grant must survive a file revoke"
        );

        table.revoke_account(owner, grantee).unwrap();
        assert!(!table.has_access(record.id, grantee).unwrap());
    }

    #[test]
    fn grants_on_deleted_files_go_inert() {
        let (table, store) = table_with_store();
        let owner = identity(1);
        let grantee = identity(2);
        let record = store.create(owner, new_file("a")).unwrap();

        table.grant_file(record.id, owner, grantee).unwrap();
        store.delete(record.id, owner).unwrap();

        // The predicate can no longer resolve the file.
        assert!(matches!(
            table.has_access(record.id, grantee),
            Err(RegistryError::NotFound(_))
        ));

        // The row itself is retained for history.
        let rows = table.list_file_grants(owner);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].active);
    }
}
