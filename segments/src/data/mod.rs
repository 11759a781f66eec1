//! Data storage layer
//!
//! - `postgres` - Connection pool and repositories for rules and customers
//! - `types` - Row types returned by the repositories

pub mod postgres;
pub mod types;

pub use postgres::PostgresService;
