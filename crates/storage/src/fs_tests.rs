// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! File-system backend tests

use super::*;

use std::path::Path;

use tempfile::tempdir;

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = tempdir().unwrap();
    let storage = FsStorage::new();
    let path = dir.path().join("note.txt");

    storage.write_string(&path, "hello").await.unwrap();

    assert_eq!(storage.read_string(&path).await.unwrap(), "hello");
    assert_eq!(storage.read_bytes(&path).await.unwrap(), b"hello");
}

#[tokio::test]
async fn write_creates_missing_parent_directories() {
    let dir = tempdir().unwrap();
    let storage = FsStorage::new();
    let path = dir.path().join("a/b/c/deep.txt");

    storage.write_bytes(&path, b"deep").await.unwrap();

    assert!(storage.exists(&path).await.unwrap());
}

#[tokio::test]
async fn delete_removes_the_file() {
    let dir = tempdir().unwrap();
    let storage = FsStorage::new();
    let path = dir.path().join("gone.txt");
    storage.write_string(&path, "x").await.unwrap();

    storage.delete(&path).await.unwrap();

    assert!(!storage.exists(&path).await.unwrap());
}

#[tokio::test]
async fn missing_file_surfaces_as_invalid_path() {
    let dir = tempdir().unwrap();
    let storage = FsStorage::new();
    let path = dir.path().join("missing.txt");

    let read = storage.read_string(&path).await.unwrap_err();
    assert!(matches!(read, StorageError::InvalidPath { op: "read", .. }));

    let delete = storage.delete(&path).await.unwrap_err();
    assert!(matches!(delete, StorageError::InvalidPath { op: "delete", .. }));
}

#[tokio::test]
async fn empty_path_is_rejected() {
    let storage = FsStorage::new();

    let err = storage.read_bytes(Path::new("")).await.unwrap_err();

    assert!(matches!(err, StorageError::InvalidPath { op: "read", .. }));
}

#[tokio::test]
async fn whitespace_only_path_is_rejected() {
    let storage = FsStorage::new();

    let err = storage
        .write_string(Path::new("   "), "oops")
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::InvalidPath { op: "write", .. }));

    let probe = storage.exists(Path::new("\t ")).await.unwrap_err();
    assert!(matches!(probe, StorageError::InvalidPath { op: "probe", .. }));
}

#[tokio::test]
async fn search_matches_pattern_in_directory() {
    let dir = tempdir().unwrap();
    let storage = FsStorage::new();
    storage
        .write_string(&dir.path().join("a.json"), "{}")
        .await
        .unwrap();
    storage
        .write_string(&dir.path().join("b.json"), "{}")
        .await
        .unwrap();
    storage
        .write_string(&dir.path().join("c.txt"), "")
        .await
        .unwrap();

    let found = storage.search(dir.path(), "*.json", false).await.unwrap();

    assert_eq!(
        found,
        vec![dir.path().join("a.json"), dir.path().join("b.json")]
    );
}

#[tokio::test]
async fn search_descends_only_when_recursive() {
    let dir = tempdir().unwrap();
    let storage = FsStorage::new();
    storage
        .write_string(&dir.path().join("top.log"), "")
        .await
        .unwrap();
    storage
        .write_string(&dir.path().join("nested/inner.log"), "")
        .await
        .unwrap();

    let flat = storage.search(dir.path(), "*.log", false).await.unwrap();
    assert_eq!(flat, vec![dir.path().join("top.log")]);

    let deep = storage.search(dir.path(), "*.log", true).await.unwrap();
    assert_eq!(
        deep,
        vec![
            dir.path().join("nested/inner.log"),
            dir.path().join("top.log")
        ]
    );
}

#[tokio::test]
async fn search_in_missing_directory_is_invalid_path() {
    let dir = tempdir().unwrap();
    let storage = FsStorage::new();

    let err = storage
        .search(&dir.path().join("nowhere"), "*", false)
        .await
        .unwrap_err();

    assert!(matches!(err, StorageError::InvalidPath { op: "search", .. }));
}

#[test]
fn name_matching_supports_one_wildcard() {
    assert!(name_matches("report.json", "report.json"));
    assert!(!name_matches("report.json", "other.json"));
    assert!(name_matches("report.json", "*.json"));
    assert!(name_matches("report-2024.csv", "report-*"));
    assert!(name_matches("anything", "*"));
    assert!(!name_matches("short", "longer-than-name*"));
}
