//! Rule parsing
//!
//! Decodes persisted JSON rule documents into validated `RuleNode` trees.
//! Value shapes and combinators are checked here so the compiler only ever
//! sees the accepted variants.

use serde::Deserialize;
use serde_json::Value;

use super::builder::is_in_operator;
use super::error::RuleError;
use super::types::{Combinator, RuleNode, RuleValue};

/// Maximum size of a rule document in bytes (64KB)
pub const MAX_RULE_JSON_SIZE: usize = 64 * 1024;

/// Maximum nesting depth of a rule tree
pub const MAX_RULE_DEPTH: usize = 32;

/// Wire shape of a rule node
#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    combinator: Option<String>,
    #[serde(default)]
    rules: Option<Vec<RawRule>>,
}

/// Parse a rule document
///
/// When `allowed_fields` is non-empty, every leaf field must appear in it.
pub fn parse_rule(json_str: &str, allowed_fields: &[String]) -> Result<RuleNode, RuleError> {
    if json_str.len() > MAX_RULE_JSON_SIZE {
        return Err(RuleError::RuleTooLarge {
            max: MAX_RULE_JSON_SIZE,
        });
    }

    let raw: RawRule =
        serde_json::from_str(json_str).map_err(|e| RuleError::InvalidJson(e.to_string()))?;

    convert(raw, 1, allowed_fields)
}

fn convert(raw: RawRule, depth: usize, allowed_fields: &[String]) -> Result<RuleNode, RuleError> {
    if depth > MAX_RULE_DEPTH {
        return Err(RuleError::RuleTooDeep {
            max: MAX_RULE_DEPTH,
        });
    }

    // Empty strings are treated as absent
    let field = raw.field.filter(|f| !f.is_empty());
    let operator = raw.operator.filter(|o| !o.is_empty());

    if let Some(ref field) = field
        && !allowed_fields.is_empty()
        && !allowed_fields.iter().any(|allowed| allowed == field)
    {
        return Err(RuleError::FieldNotAllowed(field.clone()));
    }

    let value = match raw.value {
        Some(value) => Some(decode_leaf_value(
            field.as_deref(),
            operator.as_deref(),
            value,
        )?),
        None => None,
    };

    let combinator = raw
        .combinator
        .filter(|c| !c.trim().is_empty())
        .map(|c| c.parse::<Combinator>())
        .transpose()?;

    let children = raw
        .rules
        .unwrap_or_default()
        .into_iter()
        .map(|child| convert(child, depth + 1, allowed_fields))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RuleNode {
        field,
        operator,
        value,
        combinator,
        children,
    })
}

/// Decode a leaf value, reporting leaf-level problems before element types
///
/// A list under a non-`in` operator is an operator mismatch whatever its
/// elements hold, and a bad value on a leaf missing its field or operator
/// is a malformed leaf.
fn decode_leaf_value(
    field: Option<&str>,
    operator: Option<&str>,
    value: Value,
) -> Result<RuleValue, RuleError> {
    let (Some(field), Some(operator)) = (field, operator) else {
        return decode_value(field.unwrap_or_default(), value).map_err(|_| {
            RuleError::MalformedLeaf {
                field: field.unwrap_or_default().to_string(),
            }
        });
    };

    if value.is_array() && !is_in_operator(operator) {
        return Err(RuleError::OperatorValueMismatch {
            field: field.to_string(),
            operator: operator.to_string(),
            shape: "list",
        });
    }

    decode_value(field, value)
}

fn decode_value(field: &str, value: Value) -> Result<RuleValue, RuleError> {
    match value {
        Value::String(s) => Ok(RuleValue::Scalar(s)),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(s) => Ok(s),
                other => Err(RuleError::NonStringListElement {
                    field: field.to_string(),
                    index,
                    found: json_kind(&other),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RuleValue::List),
        other => Err(RuleError::UnsupportedValueType {
            field: field.to_string(),
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
