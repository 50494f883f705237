//! End-to-end run: fetch every organization, compute metrics, share.

use crate::aggregate::{OrgAggregator, OrgFailure};
use crate::api::{ApiClient, HeaderSource, IntervalRateLimiter};
use crate::bank::{BankApi, HttpBankApi};
use crate::config::WrappedConfig;
use crate::error::{Error, Result};
use crate::fetch::{FetchSettings, PagedFetcher, RetryExecutor};
use crate::metrics::{compute_metrics, Metrics};
use crate::notify::{share_link, WebhookNotifier};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Environment variable consulted per request when no token is configured.
pub const TOKEN_ENV: &str = "WRAPPED_API_TOKEN";

#[derive(Debug, Clone, Default)]
pub struct RunParams {
    pub user_id: String,
    pub org_ids: Vec<String>,
    /// Overrides the configured cutoff year.
    pub cutoff_year: Option<i32>,
    /// Used when the user is not found in any organization's member list.
    pub display_name: Option<String>,
}

impl RunParams {
    pub fn new(user_id: impl Into<String>, org_ids: Vec<String>) -> Self {
        Self {
            user_id: user_id.into(),
            org_ids,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation("user id is required".to_string()));
        }
        if self.org_ids.is_empty() {
            return Err(Error::Validation(
                "at least one organization id is required".to_string(),
            ));
        }
        if self.org_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(Error::Validation("organization ids must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrappedReport {
    pub metrics: Metrics,
    pub failures: Vec<OrgFailure>,
    pub share_link: String,
}

impl WrappedReport {
    /// False when some organization was dropped and the metrics undercount.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Wrapped {
    api: Arc<dyn BankApi>,
    config: WrappedConfig,
    notifier: Option<WebhookNotifier>,
}

impl Wrapped {
    /// Wire up the HTTP client, rate limiter, and webhook from `config`.
    pub fn from_config(config: WrappedConfig) -> Result<Self> {
        let client = build_client(&config)?;
        let notifier = config
            .webhook_url
            .as_deref()
            .map(WebhookNotifier::new)
            .transpose()?;

        Ok(Self {
            api: Arc::new(HttpBankApi::new(client)),
            config,
            notifier,
        })
    }

    pub fn with_api(api: Arc<dyn BankApi>, config: WrappedConfig) -> Self {
        Self {
            api,
            config,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: WebhookNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub async fn run(&self, params: RunParams) -> Result<WrappedReport> {
        params.validate()?;

        let cutoff_year = params
            .cutoff_year
            .unwrap_or_else(|| self.config.effective_cutoff_year());
        info!(
            "Building {} wrapped for {} across {} organizations",
            cutoff_year,
            params.user_id,
            params.org_ids.len()
        );

        let retry = RetryExecutor::new(self.config.retry.clone());
        let fetcher = PagedFetcher::new(
            self.api.clone(),
            FetchSettings {
                per_page: self.config.per_page,
                concurrency_level: self.config.concurrency_level,
                cutoff_year,
            },
            retry.clone(),
        );
        let aggregator = OrgAggregator::new(self.api.clone(), fetcher, retry, params.user_id.clone())
            .with_policy(self.config.failure_policy);

        let run = aggregator.run(&params.org_ids).await?;
        let metrics = compute_metrics(&run.state, &params.user_id, params.display_name.as_deref());

        // Only a name found in a member list goes into the link.
        let link = share_link(
            &self.config.share_base_url,
            &params.user_id,
            &params.org_ids,
            run.state.display_name.as_deref(),
        );
        if let Some(notifier) = &self.notifier {
            notifier.notify(&link).await;
        }

        Ok(WrappedReport {
            metrics,
            failures: run.failures,
            share_link: link,
        })
    }
}

fn build_client(config: &WrappedConfig) -> Result<ApiClient> {
    let mut builder = ApiClient::builder(config.base_url.as_str());
    for (name, value) in &config.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    if config.api_token.is_some() || std::env::var(TOKEN_ENV).is_ok() {
        let configured = config.api_token.clone();
        builder = builder.header(
            "Authorization",
            HeaderSource::from_fn(move || {
                let token = configured
                    .clone()
                    .or_else(|| std::env::var(TOKEN_ENV).ok())
                    .unwrap_or_default();
                format!("Bearer {token}")
            }),
        );
    }

    if let Some(interval) = config.min_request_interval {
        builder = builder.rate_limiter(Arc::new(IntervalRateLimiter::new(interval)));
    }

    builder.build()
}
