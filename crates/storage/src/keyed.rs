// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path-keyed concurrent storage
//!
//! Serializes operations per path: two writes to the same file queue
//! on that path's semaphore, while operations on distinct paths run
//! concurrently. This is the reference consumer of the lock table.

use std::future::Future;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use keygate_core::{scoped, LockTable};

use crate::fs::FsStorage;
use crate::provider::{Storage, StorageError};

#[derive(Debug)]
pub struct KeyedFsStorage {
    inner: FsStorage,
    /// One permit per path: per-path mutual exclusion.
    locks: LockTable<PathBuf>,
}

impl KeyedFsStorage {
    pub fn new() -> Self {
        Self {
            inner: FsStorage::new(),
            locks: LockTable::new(NonZeroUsize::MIN),
        }
    }

    /// Number of path locks currently tracked.
    pub fn tracked_paths(&self) -> usize {
        self.locks.len()
    }

    /// Drop per-path semaphores no operation currently holds.
    ///
    /// The table never evicts on its own, so a long-lived store that
    /// touches many distinct paths calls this during maintenance.
    pub async fn prune_idle_locks(&self) -> Result<usize, StorageError> {
        Ok(self.locks.evict_idle().await?)
    }

    /// Run `work` while holding the semaphore bound to `path`.
    async fn with_path_lock<T, F, Fut>(&self, path: &Path, work: F) -> Result<T, StorageError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        let lock = self.locks.lock_for(path.to_path_buf()).await?;
        match scoped::with_permit(&lock, work).await {
            Some(result) => result,
            None => Err(StorageError::LockClosed {
                path: path.to_path_buf(),
            }),
        }
    }
}

impl Default for KeyedFsStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for KeyedFsStorage {
    async fn delete(&self, path: &Path) -> Result<(), StorageError> {
        self.with_path_lock(path, || self.inner.delete(path)).await
    }

    async fn exists(&self, path: &Path) -> Result<bool, StorageError> {
        self.with_path_lock(path, || self.inner.exists(path)).await
    }

    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.with_path_lock(path, || self.inner.read_bytes(path))
            .await
    }

    async fn read_string(&self, path: &Path) -> Result<String, StorageError> {
        self.with_path_lock(path, || self.inner.read_string(path))
            .await
    }

    async fn write_bytes(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
        self.with_path_lock(path, || self.inner.write_bytes(path, content))
            .await
    }

    async fn write_string(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        self.with_path_lock(path, || self.inner.write_string(path, content))
            .await
    }

    async fn search(
        &self,
        dir: &Path,
        pattern: &str,
        recurse: bool,
    ) -> Result<Vec<PathBuf>, StorageError> {
        // A search spans many paths; it takes no per-path lock.
        self.inner.search(dir, pattern, recurse).await
    }
}

#[cfg(test)]
#[path = "keyed_tests.rs"]
mod tests;
