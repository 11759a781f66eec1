//! Rule tree compiler
//!
//! Walks a rule tree depth-first and joins leaf conditions with their
//! group's combinator. The parameter list is moved into each call and handed
//! back with the node's appends, so placeholder numbers follow the textual
//! order of the whole tree.

use serde::Serialize;

use super::builder::build_leaf;
use super::error::RuleError;
use super::types::{RuleNode, SqlParams};

/// Compiler output: SQL boolean fragment plus every bound parameter
///
/// `params` includes whatever the caller seeded before compiling, so the Nth
/// placeholder in `sql` binds to `params.values[N - 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledPredicate {
    pub sql: String,
    pub params: SqlParams,
}

/// Compile a rule tree into a predicate, continuing numbering after `params`
pub fn compile(node: &RuleNode, params: SqlParams) -> Result<CompiledPredicate, RuleError> {
    let offset = params.len();
    let (sql, params) = compile_node(node, params)?;
    let sql = sql.ok_or(RuleError::EmptyRule)?;

    tracing::debug!(
        offset,
        bound = params.len() - offset,
        "Compiled rule predicate"
    );
    Ok(CompiledPredicate { sql, params })
}

/// Compile a standalone predicate whose placeholders start at `$offset + 1`
///
/// For embedding into a query that binds its own first `offset` parameters.
/// The returned params hold only the rule's values.
pub fn compile_from(node: &RuleNode, offset: usize) -> Result<CompiledPredicate, RuleError> {
    let reserved: SqlParams = std::iter::repeat_n(String::new(), offset).collect();
    let CompiledPredicate { sql, mut params } = compile(node, reserved)?;
    params.values = params.values.split_off(offset);
    Ok(CompiledPredicate { sql, params })
}

/// Compile one node and its descendants
///
/// Returns `None` when neither the node nor any descendant carries a
/// condition; such nodes are left out of the parent's join.
pub fn compile_node(
    node: &RuleNode,
    params: SqlParams,
) -> Result<(Option<String>, SqlParams), RuleError> {
    let (own, mut params) = build_leaf(node, params)?;

    let mut conditions: Vec<String> = Vec::with_capacity(node.children.len() + 1);
    conditions.extend(own);

    for child in &node.children {
        let (nested, next) = compile_node(child, params)?;
        params = next;
        conditions.extend(nested);
    }

    let joined = match conditions.len() {
        0 => return Ok((None, params)),
        1 => conditions.remove(0),
        count => {
            let combinator = node
                .combinator
                .ok_or(RuleError::MissingCombinator { count })?;
            conditions.join(&format!(" {} ", combinator.as_sql()))
        }
    };

    Ok((Some(format!("( {} )", joined)), params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::{Combinator, RuleValue, SqlParam};

    fn status_active() -> RuleNode {
        RuleNode::leaf("status", "=", RuleValue::Scalar("active".to_string()))
    }

    fn tag_in_ab() -> RuleNode {
        RuleNode::leaf(
            "tag",
            "IN",
            RuleValue::List(vec!["a".to_string(), "b".to_string()]),
        )
    }

    fn ab() -> SqlParam {
        SqlParam::TextArray(vec!["a".to_string(), "b".to_string()])
    }

    #[test]
    fn single_leaf_is_wrapped() {
        let compiled = compile(&status_active(), SqlParams::default()).unwrap();
        assert_eq!(compiled.sql, "( status = $1 )");
        assert_eq!(compiled.params.values, vec![SqlParam::from("active")]);
    }

    #[test]
    fn single_list_leaf() {
        let compiled = compile(&tag_in_ab(), SqlParams::default()).unwrap();
        assert_eq!(compiled.sql, "( tag = ANY($1) )");
        assert_eq!(compiled.params.values, vec![ab()]);
    }

    #[test]
    fn siblings_continue_numbering() {
        let rule = RuleNode::group(Combinator::Or, vec![status_active(), tag_in_ab()]);
        let compiled = compile(&rule, SqlParams::default()).unwrap();

        assert_eq!(compiled.sql, "( ( status = $1 ) OR ( tag = ANY($2) ) )");
        assert_eq!(compiled.params.values, vec![SqlParam::from("active"), ab()]);
    }

    #[test]
    fn own_condition_precedes_children() {
        let mut rule = RuleNode::group(Combinator::And, vec![tag_in_ab()]);
        rule.field = Some("city".to_string());
        rule.operator = Some("=".to_string());
        rule.value = Some(RuleValue::Scalar("Oslo".to_string()));

        let compiled = compile(&rule, SqlParams::default()).unwrap();
        assert_eq!(compiled.sql, "( city = $1 AND ( tag = ANY($2) ) )");
    }

    #[test]
    fn numbering_starts_after_seeded_params() {
        let seed: SqlParams = [SqlParam::from("cmp_1"), SqlParam::Bool(false)]
            .into_iter()
            .collect();
        let rule = RuleNode::group(Combinator::And, vec![status_active(), tag_in_ab()]);
        let compiled = compile(&rule, seed).unwrap();

        assert_eq!(compiled.sql, "( ( status = $3 ) AND ( tag = ANY($4) ) )");
        assert_eq!(compiled.params.len(), 4);
        assert_eq!(compiled.params.values[0], SqlParam::from("cmp_1"));
    }

    #[test]
    fn compile_from_offset_returns_only_rule_params() {
        let rule = RuleNode::group(Combinator::Or, vec![status_active(), tag_in_ab()]);
        let compiled = compile_from(&rule, 2).unwrap();

        assert_eq!(compiled.sql, "( ( status = $3 ) OR ( tag = ANY($4) ) )");
        assert_eq!(compiled.params.values, vec![SqlParam::from("active"), ab()]);

        let unshifted = compile_from(&rule, 0).unwrap();
        assert_eq!(unshifted, compile(&rule, SqlParams::default()).unwrap());
    }

    #[test]
    fn nested_groups_keep_textual_order() {
        let inner = RuleNode::group(
            Combinator::Or,
            vec![
                RuleNode::leaf("a", "=", RuleValue::Scalar("1".to_string())),
                RuleNode::leaf("b", ">", RuleValue::Scalar("2".to_string())),
            ],
        );
        let rule = RuleNode::group(
            Combinator::And,
            vec![
                inner,
                RuleNode::leaf("c", "<", RuleValue::Scalar("3".to_string())),
            ],
        );
        let compiled = compile(&rule, SqlParams::default()).unwrap();

        assert_eq!(
            compiled.sql,
            "( ( ( a = $1 ) OR ( b > $2 ) ) AND ( c < $3 ) )"
        );
        assert_eq!(
            compiled.params.values,
            vec![
                SqlParam::from("1"),
                SqlParam::from("2"),
                SqlParam::from("3")
            ]
        );
    }

    #[test]
    fn placeholder_count_matches_params() {
        let rule = RuleNode::group(
            Combinator::Or,
            vec![
                status_active(),
                RuleNode::group(Combinator::And, vec![tag_in_ab(), status_active()]),
                tag_in_ab(),
            ],
        );
        let compiled = compile(&rule, SqlParams::default()).unwrap();

        let placeholders = compiled.sql.matches('$').count();
        assert_eq!(placeholders, compiled.params.len());
        for n in 1..=placeholders {
            assert!(compiled.sql.contains(&format!("${}", n)));
        }
        assert_eq!(compiled.sql.matches('(').count(), compiled.sql.matches(')').count());
    }

    #[test]
    fn compiling_twice_is_identical() {
        let rule = RuleNode::group(Combinator::Or, vec![status_active(), tag_in_ab()]);
        let first = compile(&rule, SqlParams::default()).unwrap();
        let second = compile(&rule, SqlParams::default()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_children_are_omitted() {
        let rule = RuleNode::group(
            Combinator::And,
            vec![
                RuleNode::group(Combinator::Or, vec![]),
                status_active(),
                RuleNode::default(),
            ],
        );
        let compiled = compile(&rule, SqlParams::default()).unwrap();
        assert_eq!(compiled.sql, "( ( status = $1 ) )");
    }

    #[test]
    fn empty_root_is_an_error() {
        let rule = RuleNode::group(Combinator::And, vec![RuleNode::default()]);
        let err = compile(&rule, SqlParams::default()).unwrap_err();
        assert_eq!(err, RuleError::EmptyRule);
    }

    #[test]
    fn single_condition_needs_no_combinator() {
        let rule = RuleNode {
            children: vec![status_active()],
            ..RuleNode::default()
        };
        let compiled = compile(&rule, SqlParams::default()).unwrap();
        assert_eq!(compiled.sql, "( ( status = $1 ) )");
    }

    #[test]
    fn multiple_conditions_need_combinator() {
        let rule = RuleNode {
            children: vec![status_active(), tag_in_ab()],
            ..RuleNode::default()
        };
        let err = compile(&rule, SqlParams::default()).unwrap_err();
        assert_eq!(err, RuleError::MissingCombinator { count: 2 });
    }

    #[test]
    fn first_error_wins() {
        let rule = RuleNode::group(
            Combinator::And,
            vec![
                status_active(),
                RuleNode::leaf("x", "in", RuleValue::Scalar("solo".to_string())),
                RuleNode::leaf("y", "=", RuleValue::List(vec![])),
            ],
        );
        let err = compile(&rule, SqlParams::default()).unwrap_err();
        assert!(matches!(
            err,
            RuleError::OperatorValueMismatch { ref field, .. } if field == "x"
        ));
    }
}
