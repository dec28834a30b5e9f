// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrent fan-out over a sequence
//!
//! Spawns one task per item with no throttling, lets every unit run to
//! completion regardless of sibling failures, and reports all captured
//! failures in a single aggregate error afterwards. Collecting
//! variants tag each unit with its submission index and re-sort before
//! returning, so output position matches input position despite
//! nondeterministic completion order.

use std::future::Future;

use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

/// A captured per-item failure, tagged with the item's position in the
/// input sequence. Failure order within an aggregate is not
/// significant.
#[derive(Debug)]
pub struct ItemFailure<E> {
    pub index: usize,
    pub error: E,
}

/// Errors surfaced by the fan-out functions.
#[derive(Debug, Error)]
pub enum FanoutError<E> {
    /// One or more items failed. Every unit had already run to
    /// completion when this was raised; `failures` carries all of them.
    #[error("{} of {total} fan-out items failed", failures.len())]
    Aggregate {
        total: usize,
        failures: Vec<ItemFailure<E>>,
    },
    /// The shared token fired before all units finished. Remaining
    /// units keep running detached; cancellation is cooperative and
    /// nothing is aborted.
    #[error("fan-out cancelled before all items completed")]
    Cancelled,
    /// A unit panicked or its task was aborted externally. Raised only
    /// after the remaining units were joined.
    #[error("fan-out worker failed to join")]
    JoinFailed(#[source] JoinError),
}

/// Apply `action` to every item concurrently.
///
/// All units run to completion; a failing unit never cancels its
/// siblings. If any failed, returns [`FanoutError::Aggregate`] bundling
/// every captured failure. The optional token is shared by all units
/// and observed cooperatively: by each action if it chooses to check,
/// and by the final join, which returns [`FanoutError::Cancelled`] if
/// the token fires first.
pub async fn for_each<T, E, F, Fut>(
    items: impl IntoIterator<Item = T>,
    action: F,
    cancel: Option<&CancellationToken>,
) -> Result<(), FanoutError<E>>
where
    E: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
{
    run_units(items, action, cancel).await.map(|_| ())
}

/// Apply `func` to every item concurrently and collect the results in
/// input order.
///
/// Same execution and failure policy as [`for_each`]. On success,
/// `out[i]` is the result for `items[i]`.
pub async fn for_each_collect<T, R, E, F, Fut>(
    items: impl IntoIterator<Item = T>,
    func: F,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<R>, FanoutError<E>>
where
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let mut slots = run_units(items, func, cancel).await?;
    slots.sort_unstable_by_key(|(index, _)| *index);
    Ok(slots.into_iter().map(|(_, value)| value).collect())
}

/// Apply a subsequence-producing `func` to every item concurrently and
/// concatenate the results.
///
/// Subsequences are concatenated in item order: everything produced
/// for `items[0]` precedes everything produced for `items[1]`.
pub async fn flat_map_collect<T, R, E, S, F, Fut>(
    items: impl IntoIterator<Item = T>,
    func: F,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<R>, FanoutError<E>>
where
    S: IntoIterator<Item = R> + Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<S, E>> + Send + 'static,
{
    let groups = for_each_collect(items, func, cancel).await?;
    Ok(groups.into_iter().flatten().collect())
}

/// Spawn one task per item and join them all, capturing per-item
/// failures instead of failing fast. Returns completion-ordered
/// `(index, value)` slots.
async fn run_units<T, R, E, F, Fut>(
    items: impl IntoIterator<Item = T>,
    func: F,
    cancel: Option<&CancellationToken>,
) -> Result<Vec<(usize, R)>, FanoutError<E>>
where
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let mut units = JoinSet::new();
    for (index, item) in items.into_iter().enumerate() {
        let work = func(item);
        units.spawn(async move { (index, work.await) });
    }
    let total = units.len();

    let mut slots = Vec::with_capacity(total);
    let mut failures = Vec::new();
    let mut join_failure = None;

    loop {
        let joined = match cancel {
            Some(token) => tokio::select! {
                joined = units.join_next() => joined,
                _ = token.cancelled() => {
                    units.detach_all();
                    return Err(FanoutError::Cancelled);
                }
            },
            None => units.join_next().await,
        };

        match joined {
            Some(Ok((index, Ok(value)))) => slots.push((index, value)),
            Some(Ok((index, Err(error)))) => failures.push(ItemFailure { index, error }),
            // A panicked unit: keep joining the rest before reporting.
            Some(Err(e)) => join_failure = Some(e),
            None => break,
        }
    }

    if let Some(e) = join_failure {
        return Err(FanoutError::JoinFailed(e));
    }
    if !failures.is_empty() {
        tracing::debug!(failed = failures.len(), total, "fan-out completed with failures");
        return Err(FanoutError::Aggregate { total, failures });
    }
    Ok(slots)
}

#[cfg(test)]
#[path = "fanout_tests.rs"]
mod tests;
