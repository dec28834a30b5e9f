// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage provider trait and errors

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use keygate_core::LockTableError;
use thiserror::Error;

/// Errors surfaced by storage providers.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The path itself is unusable for this operation: empty, or
    /// pointing at a file or directory that is not there.
    #[error("cannot {op} {path:?}: {source}")]
    InvalidPath {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Lock(#[from] LockTableError),
    /// The per-path semaphore was closed while waiting. Not expected
    /// during normal operation.
    #[error("keyed lock unavailable for {path:?}")]
    LockClosed { path: PathBuf },
}

/// Async file-backed store.
#[async_trait]
pub trait Storage {
    /// Delete the file at `path`.
    async fn delete(&self, path: &Path) -> Result<(), StorageError>;

    /// Check whether a file exists at `path`.
    async fn exists(&self, path: &Path) -> Result<bool, StorageError>;

    /// Read the full content of `path`.
    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, StorageError>;

    /// Read the full content of `path` as UTF-8.
    async fn read_string(&self, path: &Path) -> Result<String, StorageError>;

    /// Write `content` to `path`, replacing any previous content.
    async fn write_bytes(&self, path: &Path, content: &[u8]) -> Result<(), StorageError>;

    /// Write `content` to `path`, replacing any previous content.
    async fn write_string(&self, path: &Path, content: &str) -> Result<(), StorageError>;

    /// List files under `dir` whose names match `pattern` (a single
    /// `*` wildcard is supported), descending into subdirectories when
    /// `recurse` is set.
    async fn search(
        &self,
        dir: &Path,
        pattern: &str,
        recurse: bool,
    ) -> Result<Vec<PathBuf>, StorageError>;
}
