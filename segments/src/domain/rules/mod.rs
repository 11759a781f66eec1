//! Segment rule compiler
//!
//! Turns persisted JSON rule trees into parameterized SQL predicates.
//! A rule tree nests combinator groups (`AND`/`OR`) around leaf conditions
//! (`field operator value`). Compilation emits a parenthesized boolean
//! expression with `$N` placeholders plus the ordered parameters they bind to.
//!
//! ## Usage
//!
//! ```
//! use segments::domain::rules::{SqlParams, compile, parse_rule};
//!
//! let json = r#"{"combinator": "AND", "rules": [
//!     {"field": "status", "operator": "=", "value": "active"}
//! ]}"#;
//! let rule = parse_rule(json, &[]).unwrap();
//! let compiled = compile(&rule, SqlParams::default()).unwrap();
//! assert_eq!(compiled.sql, "( ( status = $1 ) )");
//! ```

mod builder;
mod compiler;
mod error;
mod parser;
mod types;

pub use builder::build_leaf;
pub use compiler::{CompiledPredicate, compile, compile_from, compile_node};
pub use error::RuleError;
pub use parser::{MAX_RULE_DEPTH, MAX_RULE_JSON_SIZE, parse_rule};
pub use types::{Combinator, RuleNode, RuleValue, SqlParam, SqlParams};
