mod common;

use bank_wrapped::testing::{tx, MockBank};
use common::{dated, fetcher, CONCURRENCY};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_three_pages_with_pre_cutoff_record_on_last() {
    let mut records = dated("new", 4, "2022-04-01");
    records.push(tx("old", "2021-11-30", -700));
    let bank = Arc::new(MockBank::new().with_org("org_hq", vec![], records));

    let outcome = fetcher(&bank, 2, 2022).fetch_all("org_hq").await.unwrap();

    assert_eq!(outcome.total_pages, 3);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(outcome.batches_dispatched, 1);
    assert_eq!(outcome.records.len(), 4);
    assert!(outcome.records.iter().all(|t| t.id.starts_with("new")));
    assert_eq!(bank.page_requests("org_hq").await.len(), 3);
}

#[tokio::test]
async fn test_batch_count_follows_page_count() {
    for total_pages in [1usize, 2, 5, 6, 7, 11, 12] {
        let bank = Arc::new(MockBank::new().with_org(
            "org_hq",
            vec![],
            dated("t", total_pages, "2022-08-08"),
        ));

        let outcome = fetcher(&bank, 1, 2022).fetch_all("org_hq").await.unwrap();

        let expected = (total_pages - 1).div_ceil(CONCURRENCY);
        assert_eq!(
            outcome.batches_dispatched, expected,
            "{total_pages} pages should take {expected} batches"
        );
        assert_eq!(outcome.records.len(), total_pages);
    }
}

#[tokio::test]
async fn test_no_pages_fetched_beyond_cutoff_batch() {
    // Page 4 carries the first pre-cutoff record; 20 pages in total.
    let mut records = dated("new", 3, "2022-01-15");
    records.extend(dated("old", 17, "2021-07-01"));
    let bank = Arc::new(MockBank::new().with_org("org_hq", vec![], records));

    let outcome = fetcher(&bank, 1, 2022).fetch_all("org_hq").await.unwrap();

    assert_eq!(outcome.records.len(), 3);
    let requested = bank.page_requests("org_hq").await;
    // Only the first batch (pages 2..=6) can be in flight when page 4 trips.
    assert!(requested.iter().all(|page| *page <= 6), "{requested:?}");
}

#[tokio::test]
async fn test_batches_never_exceed_concurrency() {
    let bank = Arc::new(
        MockBank::new()
            .with_org("org_hq", vec![], dated("t", 16, "2022-03-03"))
            .with_latency(Duration::from_millis(2)),
    );

    let outcome = fetcher(&bank, 1, 2022).fetch_all("org_hq").await.unwrap();

    assert_eq!(outcome.records.len(), 16);
    assert!(bank.max_in_flight() <= CONCURRENCY);
}

#[tokio::test]
async fn test_empty_collection() {
    let bank = Arc::new(MockBank::new().with_org("org_hq", vec![], vec![]));

    let outcome = fetcher(&bank, 10, 2022).fetch_all("org_hq").await.unwrap();
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.total_pages, 1);
}
