//! Paginated transaction retrieval for one organization
//!
//! Page 1 is fetched first to learn the page count. Pages `2..=total` are then
//! turned into lazy tasks up front and run through the [`BatchScheduler`].
//! Every task shares one [`StopMarker`]: once a page shows the cutoff was
//! reached (no next page, an empty page, or a record dated before the cutoff
//! year) later tasks short-circuit without touching the network.

use super::batch::BatchScheduler;
use super::retry::RetryExecutor;
use crate::bank::{BankApi, Page, Transaction};
use crate::error::Result;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    pub per_page: u32,
    pub concurrency_level: usize,
    pub cutoff_year: i32,
}

/// Lowest page number that showed the cutoff was reached.
///
/// Pages above the marker are skipped before dispatch, and discarded if the
/// marker moved below them while they were in flight.
#[derive(Debug)]
pub struct StopMarker(AtomicU32);

impl StopMarker {
    pub fn new() -> Self {
        Self(AtomicU32::new(u32::MAX))
    }

    pub fn trip(&self, page: u32) {
        self.0.fetch_min(page, Ordering::SeqCst);
    }

    /// Whether a page numbered below `page` tripped the marker.
    pub fn tripped_before(&self, page: u32) -> bool {
        self.0.load(Ordering::SeqCst) < page
    }
}

impl Default for StopMarker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    /// Qualifying records in page order.
    pub records: Vec<Transaction>,
    /// As reported by page 1; 1 when absent or malformed.
    pub total_pages: u32,
    /// Pages that hit the network, page 1 included.
    pub pages_fetched: u32,
    /// Batches dispatched after page 1.
    pub batches_dispatched: usize,
}

enum PageYield {
    Skipped,
    Discarded,
    Kept(Vec<Transaction>),
}

pub struct PagedFetcher<A: ?Sized> {
    api: Arc<A>,
    settings: FetchSettings,
    scheduler: BatchScheduler,
    retry: RetryExecutor,
}

impl<A: BankApi + ?Sized> PagedFetcher<A> {
    pub fn new(api: Arc<A>, settings: FetchSettings, retry: RetryExecutor) -> Self {
        Self {
            api,
            scheduler: BatchScheduler::new(settings.concurrency_level),
            settings,
            retry,
        }
    }

    pub async fn fetch_all(&self, org_id: &str) -> Result<FetchOutcome> {
        let stop = StopMarker::new();

        let first = self.fetch_page(org_id, 1).await?;
        let total_pages = first.meta.total_pages.unwrap_or(1).max(1);
        if self.reaches_cutoff(&first) {
            stop.trip(1);
        }

        let mut records = self.qualifying(first.records);
        if total_pages == 1 {
            return Ok(FetchOutcome {
                records,
                total_pages,
                pages_fetched: 1,
                batches_dispatched: 0,
            });
        }

        let tasks: Vec<_> = (2..=total_pages)
            .map(|page| self.page_task(org_id, page, &stop))
            .collect();
        let run = self.scheduler.try_run(tasks).await?;

        let mut pages_fetched = 1;
        for page in run.outputs {
            match page {
                PageYield::Skipped => {}
                PageYield::Discarded => pages_fetched += 1,
                PageYield::Kept(page_records) => {
                    pages_fetched += 1;
                    records.extend(page_records);
                }
            }
        }

        info!(
            "Fetched {} qualifying transactions for {} ({} of {} pages, {} batches)",
            records.len(),
            org_id,
            pages_fetched,
            total_pages,
            run.batches
        );

        Ok(FetchOutcome {
            records,
            total_pages,
            pages_fetched,
            batches_dispatched: run.batches,
        })
    }

    async fn page_task(&self, org_id: &str, page: u32, stop: &StopMarker) -> Result<PageYield> {
        if stop.tripped_before(page) {
            debug!("Skipping {} page {}: cutoff already reached", org_id, page);
            return Ok(PageYield::Skipped);
        }

        let fetched = self.fetch_page(org_id, page).await?;

        if stop.tripped_before(page) {
            debug!("Discarding {} page {}: cutoff reached while in flight", org_id, page);
            return Ok(PageYield::Discarded);
        }
        if self.reaches_cutoff(&fetched) {
            debug!("Cutoff reached for {} at page {}", org_id, page);
            stop.trip(page);
        }

        Ok(PageYield::Kept(self.qualifying(fetched.records)))
    }

    async fn fetch_page(&self, org_id: &str, page: u32) -> Result<Page<Transaction>> {
        let context = format!("{org_id} transactions page {page}");
        self.retry
            .execute_with_retry(
                || self.api.transactions_page(org_id, page, self.settings.per_page),
                &context,
            )
            .await
    }

    fn reaches_cutoff(&self, page: &Page<Transaction>) -> bool {
        page.meta.next_page.is_none()
            || page.is_empty()
            || page
                .records
                .iter()
                .any(|tx| tx.year() < self.settings.cutoff_year)
    }

    fn qualifying(&self, records: Vec<Transaction>) -> Vec<Transaction> {
        records
            .into_iter()
            .filter(|tx| tx.year() >= self.settings.cutoff_year)
            .collect()
    }
}
