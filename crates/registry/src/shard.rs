//! Sharded reader-writer maps.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Number of independent lock shards per map.
const SHARD_COUNT: usize = 16;

/// A hash map split across a fixed number of independently locked shards.
///
/// Writers on keys that land in different shards never contend, and each
/// shard allows unlimited concurrent readers. Iteration locks one shard at
/// a time, so a full visit is per-shard consistent rather than a global
/// snapshot.
pub struct ShardedMap<K, V> {
    shards: Vec<RwLock<HashMap<K, V>>>,
}

impl<K: Hash + Eq, V> ShardedMap<K, V> {
    pub fn new() -> Self {
        Self {
            shards: (0..SHARD_COUNT)
                .map(|_| RwLock::new(HashMap::new()))
                .collect(),
        }
    }

    fn shard_index(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }

    /// Read access to the shard holding `key`.
    pub fn read(&self, key: &K) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.shards[self.shard_index(key)].read()
    }

    /// Write access to the shard holding `key`.
    pub fn write(&self, key: &K) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        self.shards[self.shard_index(key)].write()
    }

    /// Visit every entry across all shards.
    pub fn for_each(&self, mut visit: impl FnMut(&K, &V)) {
        for shard in &self.shards {
            let guard = shard.read();
            for (key, value) in guard.iter() {
                visit(key, value);
            }
        }
    }

    /// Total number of entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Hash + Eq, V> Default for ShardedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
