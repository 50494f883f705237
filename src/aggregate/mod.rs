//! Cross-organization aggregation
//!
//! Each organization task produces an [`OrgContribution`]; the coordinator in
//! [`OrgAggregator::run`] merges them into an [`AggregateState`] after every
//! task has resolved.

pub mod aggregator;
pub mod keywords;
pub mod state;

pub use aggregator::{AggregateRun, FailurePolicy, OrgAggregator, OrgFailure};
pub use keywords::{tokenize, STOP_WORDS};
pub use state::{AggregateState, OrgContribution, OrgSpend};
