//! Retry-then-escalate combinator
//!
//! Runs an operation up to `attempts` times with a fixed delay between
//! tries. When the final attempt fails the error hook is invoked once and
//! the error returned to the caller.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

/// An operation is tried at most twice: once, then one retry.
pub const MAX_ATTEMPTS: u32 = 2;

/// Called with the final error once retries are exhausted.
pub type ErrorHook = Arc<dyn Fn(&str, &Error) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Delay before each retry.
    #[serde(default = "default_delay", with = "humantime_serde")]
    pub delay: Duration,
}

fn default_attempts() -> u32 {
    2
}

fn default_delay() -> Duration {
    Duration::from_millis(250)
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            delay: default_delay(),
        }
    }
}

#[derive(Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
    on_failure: ErrorHook,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self {
            config,
            on_failure: Arc::new(|context: &str, err: &Error| {
                error!("Giving up on {}: {}", context, err);
            }),
        }
    }

    /// Replace the hook invoked after the final failed attempt.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_failure = hook;
        self
    }

    pub async fn execute_with_retry<F, Fut, T>(&self, operation: F, context: &str) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.config.attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;

            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) if attempt < attempts => {
                    warn!(
                        "Retrying {} (attempt {}/{}) after error: {}",
                        context, attempt, attempts, err
                    );
                    if !self.config.delay.is_zero() {
                        tokio::time::sleep(self.config.delay).await;
                    }
                }
                Err(err) => {
                    (self.on_failure)(context, &err);
                    return Err(err);
                }
            }
        }
    }
}

impl Default for RetryExecutor {
    fn default() -> Self {
        Self::new(RetryConfig::default())
    }
}
