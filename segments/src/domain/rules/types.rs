//! Rule tree and SQL parameter types

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::RuleError;

/// Comparison value of a leaf condition
///
/// Untyped JSON lists are only accepted when every element is a string,
/// so both list shapes collapse into `List` when the rule is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValue {
    Scalar(String),
    List(Vec<String>),
}

impl RuleValue {
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "string",
            Self::List(_) => "list",
        }
    }
}

/// Logical joiner between sibling conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Combinator {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(RuleError::InvalidCombinator(s.to_string())),
        }
    }
}

/// A node of a decoded rule tree
///
/// Either a leaf condition (`field`, `operator` and `value` all set) or a pure
/// combinator group (none of them set). Partial leaves are rejected when the
/// node is compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleNode {
    pub field: Option<String>,
    pub operator: Option<String>,
    pub value: Option<RuleValue>,
    pub combinator: Option<Combinator>,
    pub children: Vec<RuleNode>,
}

impl RuleNode {
    pub fn leaf(field: impl Into<String>, operator: impl Into<String>, value: RuleValue) -> Self {
        Self {
            field: Some(field.into()),
            operator: Some(operator.into()),
            value: Some(value),
            ..Self::default()
        }
    }

    pub fn group(combinator: Combinator, children: Vec<RuleNode>) -> Self {
        Self {
            combinator: Some(combinator),
            children,
            ..Self::default()
        }
    }
}

/// A single bound parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Text(String),
    TextArray(Vec<String>),
    Bool(bool),
}

impl From<&str> for SqlParam {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for SqlParam {
    fn from(value: Vec<String>) -> Self {
        Self::TextArray(value)
    }
}

impl From<bool> for SqlParam {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Collects SQL parameters during query building (maintains insertion order)
///
/// Placeholder `$N` refers to the Nth value, so callers may seed the list with
/// base-filter parameters before compiling a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SqlParams {
    pub values: Vec<SqlParam>,
}

impl SqlParams {
    /// Append a value and return its 1-based placeholder position
    pub fn push(&mut self, value: impl Into<SqlParam>) -> usize {
        self.values.push(value.into());
        self.values.len()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SqlParam> {
        self.values.iter()
    }
}

impl<T: Into<SqlParam>> FromIterator<T> for SqlParams {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combinator_parse_case_insensitive() {
        assert_eq!("and".parse::<Combinator>().unwrap(), Combinator::And);
        assert_eq!(" Or ".parse::<Combinator>().unwrap(), Combinator::Or);
        assert_eq!(Combinator::Or.to_string(), "OR");
    }

    #[test]
    fn test_combinator_parse_rejects_other_text() {
        let err = "XOR".parse::<Combinator>().unwrap_err();
        assert_eq!(err, RuleError::InvalidCombinator("XOR".to_string()));
    }

    #[test]
    fn test_params_push_returns_position() {
        let mut params: SqlParams = ["cmp_1"].into_iter().collect();
        assert_eq!(params.push(false), 2);
        assert_eq!(params.push(vec!["a".to_string()]), 3);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn test_params_serialize_untagged() {
        let mut params = SqlParams::default();
        params.push("active");
        params.push(vec!["a".to_string(), "b".to_string()]);
        params.push(false);
        let json = serde_json::to_string(&params).unwrap();
        assert_eq!(json, r#"["active",["a","b"],false]"#);
    }
}
