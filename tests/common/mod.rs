//! Common test utilities and helpers
#![allow(dead_code)]

use bank_wrapped::aggregate::{FailurePolicy, OrgAggregator};
use bank_wrapped::bank::{HttpBankApi, Transaction};
use bank_wrapped::fetch::{FetchSettings, PagedFetcher, RetryConfig, RetryExecutor};
use bank_wrapped::testing::{tx, MockBank};
use std::sync::Arc;
use std::time::Duration;

pub const CONCURRENCY: usize = 5;

pub fn no_delay_retry() -> RetryExecutor {
    RetryExecutor::new(RetryConfig {
        attempts: 2,
        delay: Duration::ZERO,
    })
}

pub fn settings(per_page: u32, cutoff_year: i32) -> FetchSettings {
    FetchSettings {
        per_page,
        concurrency_level: CONCURRENCY,
        cutoff_year,
    }
}

pub fn fetcher(bank: &Arc<MockBank>, per_page: u32, cutoff_year: i32) -> PagedFetcher<HttpBankApi> {
    PagedFetcher::new(
        Arc::new(HttpBankApi::new(bank.client())),
        settings(per_page, cutoff_year),
        no_delay_retry(),
    )
}

pub fn aggregator(
    bank: &Arc<MockBank>,
    per_page: u32,
    cutoff_year: i32,
    user_id: &str,
    policy: FailurePolicy,
) -> OrgAggregator<HttpBankApi> {
    let api = Arc::new(HttpBankApi::new(bank.client()));
    let fetcher = PagedFetcher::new(api.clone(), settings(per_page, cutoff_year), no_delay_retry());
    OrgAggregator::new(api, fetcher, no_delay_retry(), user_id).with_policy(policy)
}

/// `count` outflows of one cent each, all on `date`.
pub fn dated(prefix: &str, count: usize, date: &str) -> Vec<Transaction> {
    (0..count)
        .map(|i| tx(&format!("{prefix}-{i}"), date, -1))
        .collect()
}
