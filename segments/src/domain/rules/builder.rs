//! Leaf condition builder
//!
//! Builds one atomic SQL comparison from a `field operator value` triple.

use super::error::RuleError;
use super::types::{RuleNode, RuleValue, SqlParam, SqlParams};

/// List membership keyword, rewritten to `= ANY($n)`
const IN_OPERATOR: &str = "in";

/// Operators accepted against a scalar value (matched case-insensitively)
const SCALAR_OPERATORS: &[&str] = &[
    "=", "!=", "<>", "<", "<=", ">", ">=", "like", "ilike", "not like", "not ilike",
];

/// Lowercase and collapse inner whitespace so `NOT  LIKE` matches `not like`
fn normalize_operator(operator: &str) -> String {
    operator
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

pub(super) fn is_in_operator(operator: &str) -> bool {
    operator.trim().eq_ignore_ascii_case(IN_OPERATOR)
}

/// Build the node's own condition
///
/// Returns `None` for a pure combinator node. On success exactly one
/// parameter is appended; the operator is emitted verbatim except for `in`,
/// which becomes `= ANY($n)` with the whole list bound as one array.
pub fn build_leaf(
    node: &RuleNode,
    mut params: SqlParams,
) -> Result<(Option<String>, SqlParams), RuleError> {
    let (field, operator, value) = match (&node.field, &node.operator, &node.value) {
        (None, None, None) => return Ok((None, params)),
        (Some(field), Some(operator), Some(value)) => (field, operator, value),
        (field, _, _) => {
            return Err(RuleError::MalformedLeaf {
                field: field.clone().unwrap_or_default(),
            });
        }
    };

    let mismatch = || RuleError::OperatorValueMismatch {
        field: field.clone(),
        operator: operator.clone(),
        shape: value.shape(),
    };

    let condition = match value {
        RuleValue::Scalar(scalar) => {
            if is_in_operator(operator) {
                return Err(mismatch());
            }
            if !SCALAR_OPERATORS.contains(&normalize_operator(operator).as_str()) {
                return Err(RuleError::UnsupportedOperator {
                    field: field.clone(),
                    operator: operator.clone(),
                });
            }
            let position = params.push(SqlParam::Text(scalar.clone()));
            format!("{} {} ${}", field, operator, position)
        }
        RuleValue::List(items) => {
            if !is_in_operator(operator) {
                return Err(mismatch());
            }
            let position = params.push(SqlParam::TextArray(items.clone()));
            format!("{} = ANY(${})", field, position)
        }
    };

    tracing::trace!(%field, %operator, condition = %condition, "Built leaf condition");
    Ok((Some(condition), params))
}
