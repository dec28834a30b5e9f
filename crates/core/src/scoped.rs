// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scoped semaphore acquisition
//!
//! Holds a permit for exactly the span of a wrapped action, replacing
//! the manual acquire/try/finally/release pattern at call sites.
//! Deadlines and cancellation bound the wait only: once a permit is
//! held the action always runs and the permit is always returned,
//! carried by tokio's RAII permit guard.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio_util::sync::CancellationToken;

/// Run `action` while holding one permit of `semaphore`.
///
/// Returns `None` when no permit could be obtained: the deadline
/// elapsed, `cancel` fired first, or the semaphore was closed. The
/// action is not invoked in that case and nothing is released.
///
/// Returns `Some(value)` after the action ran to completion with the
/// permit held. The permit is released exactly once when the action's
/// future finishes, including when `value` is an `Err` the caller goes
/// on to propagate. A deadline of `Duration::ZERO` is a non-blocking
/// probe.
pub async fn try_with_permit<T, F, Fut>(
    semaphore: &Semaphore,
    deadline: Option<Duration>,
    cancel: Option<&CancellationToken>,
    action: F,
) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let permit = wait_for_permit(semaphore, deadline, cancel).await?;
    let value = action().await;
    drop(permit);
    Some(value)
}

/// Infinite-wait shorthand for [`try_with_permit`].
///
/// `None` is only possible when the semaphore has been closed.
pub async fn with_permit<T, F, Fut>(semaphore: &Semaphore, action: F) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    try_with_permit(semaphore, None, None, action).await
}

/// Thread-blocking bridge for legacy synchronous call sites.
///
/// Delegates to [`try_with_permit`] on the given runtime handle so the
/// acquire/release logic exists in exactly one place. Must be called
/// from a thread outside the runtime: blocking a worker on its own
/// runtime deadlocks, and nesting sync-over-async bridges can starve
/// the pool.
pub fn try_with_permit_blocking<T, F, Fut>(
    handle: &Handle,
    semaphore: &Semaphore,
    deadline: Option<Duration>,
    cancel: Option<&CancellationToken>,
    action: F,
) -> Option<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    handle.block_on(try_with_permit(semaphore, deadline, cancel, action))
}

/// Wait for one permit, bounded by an optional deadline and an
/// optional cancellation token. Both may be supplied together.
async fn wait_for_permit<'a>(
    semaphore: &'a Semaphore,
    deadline: Option<Duration>,
    cancel: Option<&CancellationToken>,
) -> Option<SemaphorePermit<'a>> {
    // A token fired before the wait starts always wins, even when a
    // permit is free.
    let acquire = async {
        match cancel {
            Some(token) if token.is_cancelled() => None,
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => None,
                permit = semaphore.acquire() => permit.ok(),
            },
            None => semaphore.acquire().await.ok(),
        }
    };

    match deadline {
        Some(limit) => tokio::time::timeout(limit, acquire).await.ok().flatten(),
        None => acquire.await,
    }
}

#[cfg(test)]
#[path = "scoped_tests.rs"]
mod tests;
