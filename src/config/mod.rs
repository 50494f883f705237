//! Configuration for wrapped runs
//!
//! Values are layered with increasing precedence:
//!
//! 1. Hardcoded defaults
//! 2. TOML config file (`--config` or `<config dir>/bank-wrapped/config.toml`)
//! 3. Environment variables (`WRAPPED_*` prefix)

use crate::aggregate::FailurePolicy;
use crate::error::{Error, Result};
use crate::fetch::{RetryConfig, MAX_ATTEMPTS};
use chrono::Datelike;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

pub mod loader;

pub use loader::ConfigLoader;

/// Valid log levels for configuration validation.
pub const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Get the platform config directory for bank-wrapped
pub fn get_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "hackclub", "bank-wrapped")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WrappedConfig {
    /// API root, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Transactions requested per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Page fetches dispatched together per batch.
    #[serde(default = "default_concurrency_level")]
    pub concurrency_level: usize,

    #[serde(default)]
    pub retry: RetryConfig,

    /// Transactions dated before this year are excluded and stop pagination.
    /// Defaults to the current calendar year.
    #[serde(default)]
    pub cutoff_year: Option<i32>,

    /// Default headers sent with every request.
    #[serde(default = "default_headers")]
    pub headers: BTreeMap<String, String>,

    /// Bearer token; resolved per request from the environment when unset here.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Minimum spacing between dispatched requests.
    #[serde(default, with = "humantime_serde")]
    pub min_request_interval: Option<Duration>,

    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Webhook notified with the share link once a run completes.
    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default = "default_share_base_url")]
    pub share_base_url: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    "https://bank.hackclub.com/api/v3".to_string()
}

fn default_per_page() -> u32 {
    150
}

fn default_concurrency_level() -> usize {
    5
}

fn default_headers() -> BTreeMap<String, String> {
    BTreeMap::from([("Bank-Wrapped".to_string(), "true".to_string())])
}

fn default_share_base_url() -> String {
    "https://hack.af/wrapped".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WrappedConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            per_page: default_per_page(),
            concurrency_level: default_concurrency_level(),
            retry: RetryConfig::default(),
            cutoff_year: None,
            headers: default_headers(),
            api_token: None,
            min_request_interval: None,
            failure_policy: FailurePolicy::default(),
            webhook_url: None,
            share_base_url: default_share_base_url(),
            log_level: default_log_level(),
        }
    }
}

impl WrappedConfig {
    pub fn merge_env_vars(&mut self) {
        self.merge_env_with(|key| std::env::var(key).ok());
    }

    /// Apply `WRAPPED_*` overrides read through `lookup`.
    ///
    /// Unparseable numeric values are ignored and the previous value kept.
    pub fn merge_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup("WRAPPED_BASE_URL") {
            self.base_url = base_url;
        }

        if let Some(per_page) = lookup("WRAPPED_PER_PAGE").and_then(|v| v.parse().ok()) {
            self.per_page = per_page;
        }

        if let Some(level) = lookup("WRAPPED_CONCURRENCY").and_then(|v| v.parse().ok()) {
            self.concurrency_level = level;
        }

        if let Some(year) = lookup("WRAPPED_CUTOFF_YEAR").and_then(|v| v.parse().ok()) {
            self.cutoff_year = Some(year);
        }

        if let Some(token) = lookup("WRAPPED_API_TOKEN") {
            self.api_token = Some(token);
        }

        if let Some(webhook) = lookup("WRAPPED_WEBHOOK_URL") {
            self.webhook_url = Some(webhook);
        }

        if let Some(log_level) = lookup("WRAPPED_LOG_LEVEL") {
            self.log_level = log_level;
        }
    }

    pub fn effective_cutoff_year(&self) -> i32 {
        self.cutoff_year
            .unwrap_or_else(|| chrono::Local::now().date_naive().year())
    }

    /// Check the loaded values, reporting every problem at once.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            problems.push(format!("base_url must be http(s): {}", self.base_url));
        }
        if self.per_page == 0 {
            problems.push("per_page must be at least 1".to_string());
        }
        if self.concurrency_level == 0 {
            problems.push("concurrency_level must be at least 1".to_string());
        }
        if !(1..=MAX_ATTEMPTS).contains(&self.retry.attempts) {
            problems.push(format!(
                "retry.attempts must be between 1 and {}: {}",
                MAX_ATTEMPTS, self.retry.attempts
            ));
        }
        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            problems.push(format!(
                "log_level must be one of {}: {}",
                VALID_LOG_LEVELS.join(", "),
                self.log_level
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::Config(problems.join("; ")))
        }
    }
}
