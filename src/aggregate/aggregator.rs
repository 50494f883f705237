use super::state::{AggregateState, OrgContribution};
use crate::bank::{BankApi, Organization};
use crate::error::{Error, Result};
use crate::fetch::{PagedFetcher, RetryExecutor};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// What to do with the run when one organization's fetch is escalated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Drop that organization's contribution and keep the others.
    #[default]
    Continue,
    /// Fail the whole aggregation.
    AbortAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgFailure {
    pub org_id: String,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateRun {
    pub state: AggregateState,
    pub failures: Vec<OrgFailure>,
}

impl AggregateRun {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fetches every organization in parallel and folds the results into one
/// [`AggregateState`].
pub struct OrgAggregator<A: ?Sized> {
    api: Arc<A>,
    fetcher: PagedFetcher<A>,
    retry: RetryExecutor,
    user_id: String,
    policy: FailurePolicy,
}

impl<A: BankApi + ?Sized> OrgAggregator<A> {
    pub fn new(
        api: Arc<A>,
        fetcher: PagedFetcher<A>,
        retry: RetryExecutor,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            api,
            fetcher,
            retry,
            user_id: user_id.into(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run(&self, org_ids: &[String]) -> Result<AggregateRun> {
        let total = org_ids.len();
        let completed = AtomicUsize::new(0);
        info!("Aggregating {} organizations", total);

        let tasks = org_ids.iter().map(|org_id| {
            let completed = &completed;
            async move {
                let result = self.index_org(org_id).await;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                info!("Organization {} finished ({}/{})", org_id, done, total);
                result.map_err(|e| Error::for_org(org_id.as_str(), e))
            }
        });

        // In-flight organizations are never cancelled; the policy only decides
        // what happens to the results once every task has resolved.
        let results = join_all(tasks).await;

        let mut run = AggregateRun::default();
        match self.policy {
            FailurePolicy::AbortAll => {
                for result in results {
                    run.state.absorb(result?);
                }
            }
            FailurePolicy::Continue => {
                for (org_id, result) in org_ids.iter().zip(results) {
                    match result {
                        Ok(contribution) => run.state.absorb(contribution),
                        Err(err) => {
                            warn!("Skipping organization {}: {}", org_id, err);
                            run.failures.push(OrgFailure {
                                org_id: org_id.clone(),
                                error: err.to_string(),
                            });
                        }
                    }
                }
            }
        }

        Ok(run)
    }

    async fn index_org(&self, org_id: &str) -> Result<OrgContribution> {
        // Both sides run to completion even when the other fails.
        let (org, outcome) = futures::join!(self.fetch_org(org_id), self.fetcher.fetch_all(org_id));
        let (org, outcome) = (org?, outcome?);
        Ok(OrgContribution::index(&org, outcome.records, &self.user_id))
    }

    async fn fetch_org(&self, org_id: &str) -> Result<Organization> {
        let context = format!("organization {org_id}");
        self.retry
            .execute_with_retry(|| self.api.organization(org_id), &context)
            .await
    }
}
