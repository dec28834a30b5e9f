// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Latest-wins update coordination
//!
//! Every update request installs a fresh cancellation token and fires
//! the previous one, so an older in-flight update observes cancellation
//! at its next check.

use std::future::Future;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Hands each update request a cancellation token that supersedes the
/// previous request's token.
///
/// Contract: token replacement only. The internal guard covers the
/// cancel-and-replace of the token slot, not the update body, so two
/// near-simultaneous [`update`](Self::update) calls may overlap in
/// execution. By the time the later body starts, the earlier body's
/// token has been fired; a body that wants to stop early must check
/// its token. Callers that need mutually exclusive bodies wrap
/// `update` in their own lock.
#[derive(Debug, Default)]
pub struct SingleFlight {
    /// At most one live token; replaced under the mutex, which plays
    /// the role of a one-permit guard around the slot.
    current: Mutex<Option<CancellationToken>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supersede any in-flight update and run `action` bound to a
    /// fresh token, awaiting its completion.
    ///
    /// The previous token is fired before the new body starts, never
    /// after, so an update can trust that its own token outlives every
    /// earlier one.
    pub async fn update<T, F, Fut>(&self, action: F) -> T
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = T>,
    {
        let token = self.install_fresh_token().await;
        action(token).await
    }

    /// Fire the live token, if any, without starting a new update.
    pub async fn cancel_pending(&self) {
        let mut slot = self.current.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
    }

    async fn install_fresh_token(&self) -> CancellationToken {
        let mut slot = self.current.lock().await;
        if let Some(previous) = slot.take() {
            tracing::debug!("superseding in-flight update");
            previous.cancel();
        }
        let fresh = CancellationToken::new();
        *slot = Some(fresh.clone());
        fresh
    }
}

#[cfg(test)]
#[path = "single_flight_tests.rs"]
mod tests;
