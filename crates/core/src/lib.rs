// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! keygate-core: keyed locking and fan-out coordination primitives
//!
//! This crate provides:
//! - **scoped** - semaphore permits held for the span of an action, released on every exit path
//! - **lock_table** - one lazily-created shared semaphore per key
//! - **fanout** - concurrent map over a sequence with input-order results and failure aggregation
//! - **single_flight** - latest-wins cancellation handover for a stream of update requests

pub mod fanout;
pub mod lock_table;
pub mod scoped;
pub mod single_flight;

// Re-exports
pub use fanout::{flat_map_collect, for_each, for_each_collect, FanoutError, ItemFailure};
pub use lock_table::{LockTable, LockTableError};
pub use scoped::{try_with_permit, try_with_permit_blocking, with_permit};
pub use single_flight::SingleFlight;
