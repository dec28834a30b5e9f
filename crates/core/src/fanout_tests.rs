// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fan-out tests

use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn collect_preserves_input_order_despite_completion_order() {
    // Delays chosen so completion order is the reverse of input order.
    let items = vec![40u64, 30, 20, 10, 0];

    let out = for_each_collect(
        items,
        |delay| async move {
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok::<_, &str>(delay * 2)
        },
        None,
    )
    .await
    .unwrap();

    assert_eq!(out, vec![80, 60, 40, 20, 0]);
}

#[tokio::test]
async fn all_items_run_even_when_one_fails() {
    let ran = Arc::new(AtomicUsize::new(0));

    let err = for_each(
        [1, 2, 3],
        |n| {
            let ran = ran.clone();
            async move {
                ran.fetch_add(1, Ordering::SeqCst);
                if n == 2 {
                    Err(format!("item {n} failed"))
                } else {
                    Ok(())
                }
            }
        },
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(ran.load(Ordering::SeqCst), 3);
    match err {
        FanoutError::Aggregate { total, failures } => {
            assert_eq!(total, 3);
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].index, 1);
            assert_eq!(failures[0].error, "item 2 failed");
        }
        other => panic!("expected aggregate, got {other}"),
    }
}

#[tokio::test]
async fn aggregate_display_counts_failures() {
    let err = for_each(
        [1u32, 2, 3],
        |n| async move { if n > 1 { Err(n) } else { Ok(()) } },
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "2 of 3 fan-out items failed");
}

#[tokio::test]
async fn flat_map_concatenates_in_item_order() {
    let out = flat_map_collect(
        [1usize, 2, 3],
        |n| async move { Ok::<_, &str>(vec![n; n]) },
        None,
    )
    .await
    .unwrap();

    assert_eq!(out, vec![1, 2, 2, 3, 3, 3]);
}

#[tokio::test]
async fn empty_input_completes_with_no_results() {
    let out = for_each_collect(
        Vec::<u32>::new(),
        |n| async move { Ok::<_, &str>(n) },
        None,
    )
    .await
    .unwrap();

    assert!(out.is_empty());
}

#[tokio::test(start_paused = true)]
async fn fired_token_surfaces_cancellation_from_the_join() {
    let token = CancellationToken::new();
    token.cancel();

    let err = for_each(
        [1u32, 2],
        |_| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok::<_, &str>(())
        },
        Some(&token),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FanoutError::Cancelled));
}

#[tokio::test]
async fn panicked_unit_reports_join_failure_after_siblings_finish() {
    let ran = Arc::new(AtomicUsize::new(0));

    let err = for_each(
        [0, 1, 2],
        |n| {
            let ran = ran.clone();
            async move {
                if n == 1 {
                    panic!("boom");
                }
                ran.fetch_add(1, Ordering::SeqCst);
                Ok::<_, &str>(())
            }
        },
        None,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, FanoutError::JoinFailed(_)));
    assert_eq!(ran.load(Ordering::SeqCst), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn collect_order_matches_input_for_random_delays(
        delays in proptest::collection::vec(0u64..10, 1..10)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let out = rt.block_on(async {
            for_each_collect(
                delays.clone(),
                |d| async move {
                    tokio::time::sleep(Duration::from_millis(d)).await;
                    Ok::<_, &str>(d)
                },
                None,
            )
            .await
            .unwrap()
        });
        prop_assert_eq!(out, delays);
    }
}
