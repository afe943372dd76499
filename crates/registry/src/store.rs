//! Record storage for the file registry.

use crate::error::{RegistryError, Result};
use crate::shard::ShardedMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use storium_types::{storium_time_now, FileId, FileRecord, Identity, NewFile};

/// Trait for file record storage backends.
pub trait RecordStore: Send + Sync {
    /// Insert a new record, assigning the next unique ID and the upload
    /// timestamp. Succeeds for any well-formed input.
    fn create(&self, owner: Identity, file: NewFile) -> Result<FileRecord>;

    /// Retrieve a live record by ID.
    fn get(&self, id: FileId) -> Result<FileRecord>;

    /// Owner of a live record.
    fn owner_of(&self, id: FileId) -> Result<Identity>;

    /// Tombstone a record. Only the owner may delete; the ID stays reserved
    /// and the record disappears from every future enumeration.
    fn delete(&self, id: FileId, actor: Identity) -> Result<()>;

    /// Live records owned by `owner`. No ordering is applied here; the
    /// query side orders results.
    fn list_by_owner(&self, owner: &Identity) -> Result<Vec<FileRecord>>;

    /// Live records with `is_public == true`.
    fn list_public(&self) -> Result<Vec<FileRecord>>;

    /// Count of live records.
    fn count(&self) -> Result<u64>;
}

/// In-memory record store with sharded reader-writer locks.
#[derive(Clone)]
pub struct MemoryRecordStore {
    inner: Arc<MemoryRecordStoreInner>,
}

struct MemoryRecordStoreInner {
    /// Next ID to assign. The single serialization point for ID
    /// assignment; IDs are never reused, deletion included.
    next_id: AtomicU64,

    /// Primary index: ID -> record, sharded by ID.
    records: ShardedMap<FileId, FileRecord>,

    /// Secondary index: owner -> IDs in creation order.
    by_owner: ShardedMap<Identity, Vec<FileId>>,
}

impl MemoryRecordStore {
    /// Create a new in-memory store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryRecordStoreInner {
                next_id: AtomicU64::new(1),
                records: ShardedMap::new(),
                by_owner: ShardedMap::new(),
            }),
        }
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore for MemoryRecordStore {
    fn create(&self, owner: Identity, file: NewFile) -> Result<FileRecord> {
        file.validate().map_err(RegistryError::InvalidRecord)?;

        let id = FileId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        let record = FileRecord {
            id,
            owner,
            file_name: file.file_name,
            file_type: file.file_type,
            content_hash: file.content_hash,
            file_size: file.file_size,
            upload_time_us: storium_time_now(),
            is_public: file.is_public,
            description: file.description,
            tags: file.tags,
            deleted_at_us: None,
        };

        {
            let mut records = self.inner.records.write(&id);
            records.insert(id, record.clone());
        }

        {
            let mut by_owner = self.inner.by_owner.write(&owner);
            by_owner.entry(owner).or_default().push(id);
        }

        Ok(record)
    }

    fn get(&self, id: FileId) -> Result<FileRecord> {
        let records = self.inner.records.read(&id);
        records
            .get(&id)
            .filter(|record| !record.is_deleted())
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    fn owner_of(&self, id: FileId) -> Result<Identity> {
        let records = self.inner.records.read(&id);
        records
            .get(&id)
            .filter(|record| !record.is_deleted())
            .map(|record| record.owner)
            .ok_or(RegistryError::NotFound(id))
    }

    fn delete(&self, id: FileId, actor: Identity) -> Result<()> {
        let mut records = self.inner.records.write(&id);
        let record = records
            .get_mut(&id)
            .filter(|record| !record.is_deleted())
            .ok_or(RegistryError::NotFound(id))?;

        if record.owner != actor {
            return Err(RegistryError::Unauthorized(id));
        }

        record.deleted_at_us = Some(storium_time_now());
        Ok(())
    }

    fn list_by_owner(&self, owner: &Identity) -> Result<Vec<FileRecord>> {
        let ids = {
            let by_owner = self.inner.by_owner.read(owner);
            match by_owner.get(owner) {
                Some(ids) => ids.clone(),
                None => return Ok(Vec::new()),
            }
        };

        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let records = self.inner.records.read(&id);
            if let Some(record) = records.get(&id).filter(|record| !record.is_deleted()) {
                results.push(record.clone());
            }
        }

        Ok(results)
    }

    fn list_public(&self) -> Result<Vec<FileRecord>> {
        let mut results = Vec::new();
        self.inner.records.for_each(|_, record| {
            if record.is_public && !record.is_deleted() {
                results.push(record.clone());
            }
        });
        Ok(results)
    }

    fn count(&self) -> Result<u64> {
        let mut live = 0u64;
        self.inner.records.for_each(|_, record| {
            if !record.is_deleted() {
                live += 1;
            }
        });
        Ok(live)
    }
}
