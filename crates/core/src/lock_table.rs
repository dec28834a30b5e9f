// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyed lock table
//!
//! Hands out one semaphore per key, the same instance for every caller
//! of that key, created lazily on first access. A one-permit
//! bookkeeping guard covers only the create-and-insert step; callers'
//! critical sections queue on their own key's semaphore and never
//! contend on the table itself.

use std::collections::HashMap;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Semaphore;

use crate::scoped;

/// Longest a `lock_for` call may wait on the bookkeeping guard. The
/// guard is only ever held across a map lookup and insert, so hitting
/// this deadline signals a broken table, not user-level contention.
const GUARD_DEADLINE: Duration = Duration::from_millis(1500);

/// Errors surfaced by [`LockTable`].
#[derive(Debug, Error)]
pub enum LockTableError {
    /// The internal bookkeeping guard was not acquired within its
    /// deadline. Distinct from an ordinary "lock busy" outcome: per-key
    /// waiters never hold the guard, so a stall here is a malfunction.
    #[error("lock table bookkeeping guard stalled for {0:?}")]
    GuardStalled(Duration),
}

/// Maps keys to lazily-created counting semaphores.
///
/// Every semaphore admits `permits_per_key` concurrent holders; one
/// permit gives per-key mutual exclusion. Entries live as long as the
/// table unless explicitly removed with [`LockTable::evict_idle`].
/// Share the table itself behind an `Arc`; it is never a process-wide
/// singleton.
#[derive(Debug)]
pub struct LockTable<K> {
    permits_per_key: NonZeroUsize,
    /// One-permit guard over `locks` mutation.
    guard: Semaphore,
    locks: RwLock<HashMap<K, Arc<Semaphore>>>,
}

impl<K> LockTable<K>
where
    K: Eq + Hash,
{
    pub fn new(permits_per_key: NonZeroUsize) -> Self {
        Self::with_locks(permits_per_key, HashMap::new())
    }

    /// Build a table over an existing key-to-semaphore mapping.
    pub fn with_locks(permits_per_key: NonZeroUsize, locks: HashMap<K, Arc<Semaphore>>) -> Self {
        Self {
            permits_per_key,
            guard: Semaphore::new(1),
            locks: RwLock::new(locks),
        }
    }

    /// Get the semaphore bound to `key`, creating it on first access.
    ///
    /// Repeated calls for the same key return the same instance, even
    /// under concurrent first access: the fast path is a shared read of
    /// the map, and a miss re-checks under the bookkeeping guard before
    /// creating, so a racing caller's insert is reused rather than
    /// duplicated.
    pub async fn lock_for(&self, key: K) -> Result<Arc<Semaphore>, LockTableError> {
        if let Some(existing) = self.read_locks().get(&key) {
            return Ok(existing.clone());
        }

        scoped::try_with_permit(&self.guard, Some(GUARD_DEADLINE), None, || async move {
            let mut locks = self.write_locks();
            if let Some(existing) = locks.get(&key) {
                return existing.clone();
            }
            let fresh = Arc::new(Semaphore::new(self.permits_per_key.get()));
            locks.insert(key, fresh.clone());
            tracing::debug!(
                permits = self.permits_per_key.get(),
                entries = locks.len(),
                "created keyed semaphore"
            );
            fresh
        })
        .await
        .ok_or(LockTableError::GuardStalled(GUARD_DEADLINE))
    }

    /// Remove entries no caller currently uses.
    ///
    /// An entry is idle when the table holds the only reference to its
    /// semaphore and every permit is available. Runs under the same
    /// bookkeeping guard as an insert. Returns how many entries were
    /// removed. The table never evicts on its own; callers with
    /// unbounded key cardinality invoke this during maintenance.
    pub async fn evict_idle(&self) -> Result<usize, LockTableError> {
        scoped::try_with_permit(&self.guard, Some(GUARD_DEADLINE), None, || async move {
            let full = self.permits_per_key.get();
            let mut locks = self.write_locks();
            let before = locks.len();
            locks.retain(|_, sem| {
                Arc::strong_count(sem) > 1 || sem.available_permits() < full
            });
            let removed = before - locks.len();
            if removed > 0 {
                tracing::debug!(removed, remaining = locks.len(), "evicted idle keyed semaphores");
            }
            removed
        })
        .await
        .ok_or(LockTableError::GuardStalled(GUARD_DEADLINE))
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.read_locks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_locks().is_empty()
    }

    /// Concurrent holders admitted per key.
    pub fn permits_per_key(&self) -> NonZeroUsize {
        self.permits_per_key
    }

    fn read_locks(&self) -> RwLockReadGuard<'_, HashMap<K, Arc<Semaphore>>> {
        self.locks.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_locks(&self) -> RwLockWriteGuard<'_, HashMap<K, Arc<Semaphore>>> {
        self.locks.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "lock_table_tests.rs"]
mod tests;
