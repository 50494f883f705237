//! # Bank Wrapped
//!
//! Builds a year-in-review summary of a user's spending across the
//! organizations they belong to on a fiscal-sponsorship bank.
//!
//! ## Usage
//!
//! ```bash
//! bank-wrapped run --user-id usr_abc --org org_1,org_2 [--year 2024] [--json]
//! ```
//!
//! ## Modules
//!
//! - `api` - Immutable request path builder over a pluggable HTTP transport
//! - `bank` - Bank domain models and the upstream REST seam
//! - `fetch` - Batched, cutoff-aware pagination with retry
//! - `aggregate` - Parallel per-organization fetch and merge
//! - `metrics` - Pure metrics computation over the aggregate
//! - `notify` - Share links and the completion webhook
//! - `wrapped` - End-to-end run orchestration
//! - `config` - Layered configuration
//! - `testing` - In-memory transports and fixtures
pub mod aggregate;
pub mod api;
pub mod bank;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod notify;
pub mod wrapped;

pub mod testing;

pub use error::{Error, Result};
pub use wrapped::{RunParams, Wrapped, WrappedReport};
