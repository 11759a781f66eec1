//! Segment runner error types

use thiserror::Error;

use crate::data::postgres::PostgresError;
use crate::domain::rules::RuleError;

#[derive(Error, Debug)]
pub enum SegmentError {
    #[error("Rule '{name}' ({id}) is invalid: {source}")]
    InvalidRule {
        id: String,
        name: String,
        #[source]
        source: RuleError,
    },

    #[error(transparent)]
    Postgres(#[from] PostgresError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rule_display() {
        let err = SegmentError::InvalidRule {
            id: "r1".to_string(),
            name: "VIP".to_string(),
            source: RuleError::EmptyRule,
        };
        assert_eq!(err.to_string(), "Rule 'VIP' (r1) is invalid: Rule has no conditions");
    }
}
