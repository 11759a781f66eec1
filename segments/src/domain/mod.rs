//! Domain logic for customer segmentation
//!
//! - `rules` - Rule tree decoding and predicate compilation
//! - `segments` - Running persisted rules against the customer table

pub mod rules;
pub mod segments;

pub use rules::{CompiledPredicate, RuleError, RuleNode, SqlParams};
pub use segments::{CustomerQuery, SegmentError, SegmentRunner};
