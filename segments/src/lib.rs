//! Segment rule compiler and runner
//!
//! Compiles JSON rule trees into parameterized PostgreSQL predicates and runs
//! them against the customer table.

pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
