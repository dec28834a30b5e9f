// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain file-system storage backend
//!
//! No locking of its own; wrap it in [`crate::KeyedFsStorage`] for
//! concurrent callers.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::provider::{Storage, StorageError};

#[derive(Debug, Default)]
pub struct FsStorage;

impl FsStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Storage for FsStorage {
    async fn delete(&self, path: &Path) -> Result<(), StorageError> {
        check_path("delete", path)?;
        fs::remove_file(path)
            .await
            .map_err(|e| path_error("delete", path, e))
    }

    async fn exists(&self, path: &Path) -> Result<bool, StorageError> {
        check_path("probe", path)?;
        Ok(fs::try_exists(path).await?)
    }

    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        check_path("read", path)?;
        fs::read(path).await.map_err(|e| path_error("read", path, e))
    }

    async fn read_string(&self, path: &Path) -> Result<String, StorageError> {
        check_path("read", path)?;
        fs::read_to_string(path)
            .await
            .map_err(|e| path_error("read", path, e))
    }

    async fn write_bytes(&self, path: &Path, content: &[u8]) -> Result<(), StorageError> {
        check_path("write", path)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(path, content)
            .await
            .map_err(|e| path_error("write", path, e))
    }

    async fn write_string(&self, path: &Path, content: &str) -> Result<(), StorageError> {
        self.write_bytes(path, content.as_bytes()).await
    }

    async fn search(
        &self,
        dir: &Path,
        pattern: &str,
        recurse: bool,
    ) -> Result<Vec<PathBuf>, StorageError> {
        check_path("search", dir)?;

        let mut pending = vec![dir.to_path_buf()];
        let mut found = Vec::new();

        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(&current)
                .await
                .map_err(|e| path_error("search", &current, e))?;
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    if recurse {
                        pending.push(entry.path());
                    }
                } else if name_matches(&entry.file_name().to_string_lossy(), pattern) {
                    found.push(entry.path());
                }
            }
        }

        found.sort();
        Ok(found)
    }
}

fn check_path(op: &'static str, path: &Path) -> Result<(), StorageError> {
    if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
        return Err(StorageError::InvalidPath {
            op,
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty or whitespace path"),
        });
    }
    Ok(())
}

/// Not-found failures name the operation and path; everything else
/// passes through as a plain io error.
fn path_error(op: &'static str, path: &Path, source: io::Error) -> StorageError {
    if source.kind() == io::ErrorKind::NotFound {
        StorageError::InvalidPath {
            op,
            path: path.to_path_buf(),
            source,
        }
    } else {
        StorageError::Io(source)
    }
}

/// Match a file name against a pattern with at most one `*` wildcard
/// ("*", "*.json", "report-*"). Without a wildcard the match is exact.
fn name_matches(name: &str, pattern: &str) -> bool {
    match pattern.split_once('*') {
        None => name == pattern,
        Some((prefix, suffix)) => {
            name.len() >= prefix.len() + suffix.len()
                && name.starts_with(prefix)
                && name.ends_with(suffix)
        }
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
