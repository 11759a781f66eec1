//! Customer query construction
//!
//! The base filter scopes customers to one parent (group or company) and
//! hides soft-deleted rows; it consumes `$1` and `$2`, so every compiled rule
//! predicate starts numbering at `$3`.

use serde::Serialize;

use crate::domain::rules::{RuleError, RuleNode, SqlParams, compile};

/// Columns selected for each matched customer
pub const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, phone_number";

/// A complete, ready-to-run customer query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentQuery {
    pub sql: String,
    pub params: SqlParams,
}

/// Base customer query for one parent
#[derive(Debug, Clone)]
pub struct CustomerQuery {
    base: String,
    params: SqlParams,
}

impl CustomerQuery {
    /// `table` must already be validated as a plain identifier
    pub fn new(table: &str, parent: &str) -> Self {
        let mut params = SqlParams::default();
        let parent_position = params.push(parent);
        let deleted_position = params.push(false);

        let base = format!(
            "SELECT {} FROM {} WHERE parent = ${} AND is_deleted = ${}",
            CUSTOMER_COLUMNS, table, parent_position, deleted_position
        );

        Self { base, params }
    }

    /// Compile `rule` after the base filter
    pub fn with_rule(&self, rule: &RuleNode) -> Result<SegmentQuery, RuleError> {
        let predicate = compile(rule, self.params.clone())?;
        Ok(SegmentQuery {
            sql: format!("{} AND {}", self.base, predicate.sql),
            params: predicate.params,
        })
    }
}
