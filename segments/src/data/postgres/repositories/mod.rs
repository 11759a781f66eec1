//! PostgreSQL repositories

pub mod customer;
pub mod segment_rule;

pub use customer::find_customers;
pub use segment_rule::list_segment_rules;
