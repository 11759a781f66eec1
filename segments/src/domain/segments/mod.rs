//! Segment execution
//!
//! Loads persisted rules, compiles each one after the tenant base filter and
//! runs the resulting query against the customer table.

mod error;
mod query;
mod runner;

pub use error::SegmentError;
pub use query::{CUSTOMER_COLUMNS, CustomerQuery, SegmentQuery};
pub use runner::{RuleOutcome, RunSummary, SegmentRunner};
