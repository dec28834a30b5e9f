// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! keygate-storage: path-keyed file storage built on keygate-core
//!
//! This crate provides:
//! - The [`Storage`] trait for async file-backed stores
//! - [`FsStorage`] - a plain tokio::fs backend
//! - [`KeyedFsStorage`] - the same backend with per-path serialization
//!   through a [`keygate_core::LockTable`]

pub mod fs;
pub mod keyed;
pub mod provider;

// Re-exports
pub use fs::FsStorage;
pub use keyed::KeyedFsStorage;
pub use provider::{Storage, StorageError};
