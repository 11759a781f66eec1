//! Rule compilation error types

use thiserror::Error;

/// Errors raised while decoding or compiling a rule tree
///
/// Any of these aborts the whole rule; no partial predicate is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Missing field, operator or value to build condition (field: '{field}')")]
    MalformedLeaf { field: String },

    #[error("Invalid operator '{operator}' for {shape} value on field '{field}'")]
    OperatorValueMismatch {
        field: String,
        operator: String,
        shape: &'static str,
    },

    #[error(
        "Unsupported value type {found} for field '{field}', allowed types are string and list of strings"
    )]
    UnsupportedValueType { field: String, found: &'static str },

    #[error("List value for field '{field}' has a non-string element at index {index} ({found})")]
    NonStringListElement {
        field: String,
        index: usize,
        found: &'static str,
    },

    #[error("Invalid combinator '{0}', expected AND or OR")]
    InvalidCombinator(String),

    #[error("A combinator is required to join {count} conditions")]
    MissingCombinator { count: usize },

    #[error("Unsupported operator '{operator}' for field '{field}'")]
    UnsupportedOperator { field: String, operator: String },

    #[error("Rule has no conditions")]
    EmptyRule,

    #[error("Invalid rule JSON: {0}")]
    InvalidJson(String),

    #[error("Rule JSON exceeds maximum size of {max} bytes")]
    RuleTooLarge { max: usize },

    #[error("Rule nesting exceeds maximum depth of {max}")]
    RuleTooDeep { max: usize },

    #[error("Cannot filter by field: {0}")]
    FieldNotAllowed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_mismatch_display() {
        let err = RuleError::OperatorValueMismatch {
            field: "x".to_string(),
            operator: "in".to_string(),
            shape: "string",
        };
        assert_eq!(
            err.to_string(),
            "Invalid operator 'in' for string value on field 'x'"
        );
    }

    #[test]
    fn test_unsupported_value_type_names_field() {
        let err = RuleError::UnsupportedValueType {
            field: "age".to_string(),
            found: "number",
        };
        assert!(err.to_string().contains("'age'"));
        assert!(err.to_string().contains("number"));
    }
}
