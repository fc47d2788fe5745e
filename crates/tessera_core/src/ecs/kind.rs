//! # Kind Tables
//!
//! Assigns small dense integers to Rust types on first use.
//!
//! Component and system kinds index straight into the registry's pool and
//! system vectors. The shared table sits behind a lock, so each thread keeps
//! its own copy of the kinds it has already seen and only touches the lock
//! on the first use of a type. Assigned kinds never change, so a cached kind
//! can never go stale.
//!
//! Numbering is process-lifetime only and never persisted.

use std::any::TypeId;
use std::cell::RefCell;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::{BuildHasherDefault, Hasher};
use std::thread::LocalKey;

use parking_lot::RwLock;

/// Hasher for `TypeId` keys.
///
/// A `TypeId` is already a high-quality hash, so its bits are folded in
/// as-is instead of running them through SipHash.
#[derive(Default)]
pub(crate) struct TypeIdHasher(u64);

impl Hasher for TypeIdHasher {
    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }

    #[inline]
    fn write_u64(&mut self, value: u64) {
        self.0 = self.0.rotate_left(5) ^ value;
    }

    fn write(&mut self, bytes: &[u8]) {
        for chunk in bytes.chunks(8) {
            let mut word = [0u8; 8];
            word[..chunk.len()].copy_from_slice(chunk);
            self.write_u64(u64::from_le_bytes(word));
        }
    }
}

/// Map keyed by `TypeId` using [`TypeIdHasher`].
pub(crate) type TypeIdMap<V> = HashMap<TypeId, V, BuildHasherDefault<TypeIdHasher>>;

/// Per-thread copy of the kinds a table has handed out.
pub(crate) type KindCache = LocalKey<RefCell<TypeIdMap<u16>>>;

/// Type -> dense index table with a fixed upper bound.
pub(crate) struct KindTable {
    ids: RwLock<TypeIdMap<u16>>,
    cache: &'static KindCache,
    limit: usize,
}

impl KindTable {
    /// Creates an empty table that hands out at most `limit` kinds.
    ///
    /// `cache` must belong to this table alone.
    pub(crate) fn new(limit: usize, cache: &'static KindCache) -> Self {
        debug_assert!(limit <= usize::from(u16::MAX) + 1);
        Self {
            ids: RwLock::new(TypeIdMap::default()),
            cache,
            limit,
        }
    }

    /// Maximum number of kinds this table can assign.
    #[inline]
    pub(crate) fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the kind already assigned to `type_id`, if any.
    #[inline]
    pub(crate) fn lookup(&self, type_id: TypeId) -> Option<u16> {
        if let Some(kind) = self.cached(type_id) {
            return Some(kind);
        }
        let kind = self.ids.read().get(&type_id).copied()?;
        self.remember(type_id, kind);
        Some(kind)
    }

    /// Returns the kind for `type_id`, assigning the next free one if needed.
    ///
    /// Returns `None` once the table is full.
    pub(crate) fn assign(&self, type_id: TypeId) -> Option<u16> {
        if let Some(kind) = self.lookup(type_id) {
            return Some(kind);
        }

        let mut ids = self.ids.write();
        let next = ids.len();
        let kind = match ids.entry(type_id) {
            // Another thread won the race between the read and write lock.
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                if next >= self.limit {
                    return None;
                }
                *entry.insert(u16::try_from(next).ok()?)
            }
        };
        drop(ids);

        self.remember(type_id, kind);
        Some(kind)
    }

    #[inline]
    fn cached(&self, type_id: TypeId) -> Option<u16> {
        self.cache
            .try_with(|cache| cache.borrow().get(&type_id).copied())
            .ok()
            .flatten()
    }

    fn remember(&self, type_id: TypeId, kind: u16) {
        // Thread teardown: the shared table still answers.
        let _ = self.cache.try_with(|cache| {
            cache.borrow_mut().insert(type_id, kind);
        });
    }

    /// Number of kinds assigned so far.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.ids.read().len()
    }

    /// Number of kinds cached on the calling thread.
    #[cfg(test)]
    pub(crate) fn cached_len(&self) -> usize {
        self.cache.with(|cache| cache.borrow().len())
    }
}
