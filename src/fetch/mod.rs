//! Bounded, early-terminating page retrieval

pub mod batch;
pub mod paged;
pub mod retry;

pub use batch::{BatchRun, BatchScheduler};
pub use paged::{FetchOutcome, FetchSettings, PagedFetcher, StopMarker};
pub use retry::{ErrorHook, RetryConfig, RetryExecutor, MAX_ATTEMPTS};
