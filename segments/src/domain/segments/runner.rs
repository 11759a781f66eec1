//! Sequential rule runner

use sqlx::PgPool;

use crate::core::config::{InvalidRulePolicy, RulesConfig};
use crate::data::postgres::repositories::{find_customers, list_segment_rules};
use crate::data::types::{CustomerRow, SegmentRuleRow};
use crate::domain::rules::parse_rule;

use super::error::SegmentError;
use super::query::{CustomerQuery, SegmentQuery};

/// Result of running one rule
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub rule_name: String,
    pub query: SegmentQuery,
    pub customers: Vec<CustomerRow>,
}

/// Totals for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub evaluated: usize,
    pub skipped: usize,
    pub customers: usize,
}

/// Runs every persisted rule for one parent, one rule at a time
pub struct SegmentRunner<'a> {
    pool: &'a PgPool,
    config: &'a RulesConfig,
    query: CustomerQuery,
}

impl<'a> SegmentRunner<'a> {
    pub fn new(pool: &'a PgPool, config: &'a RulesConfig, parent: &str) -> Self {
        Self {
            pool,
            config,
            query: CustomerQuery::new(&config.customer_table, parent),
        }
    }

    /// Run all rules, reporting each outcome as soon as it is available
    pub async fn run<F>(&self, mut on_outcome: F) -> Result<RunSummary, SegmentError>
    where
        F: FnMut(&RuleOutcome),
    {
        let rows = list_segment_rules(self.pool, &self.config.rule_table).await?;
        tracing::info!(count = rows.len(), "Running segment rules");

        let mut summary = RunSummary::default();
        for row in rows {
            let query = match prepare_rule(&self.query, self.config, &row) {
                Ok(query) => query,
                Err(err) => {
                    handle_invalid_rule(self.config.on_invalid_rule, err)?;
                    summary.skipped += 1;
                    continue;
                }
            };

            let customers = find_customers(self.pool, &query.sql, &query.params).await?;
            tracing::debug!(
                rule = %row.name,
                customers = customers.len(),
                "Rule evaluated"
            );

            summary.evaluated += 1;
            summary.customers += customers.len();
            on_outcome(&RuleOutcome {
                rule_id: row.id,
                rule_name: row.name,
                query,
                customers,
            });
        }

        tracing::info!(
            evaluated = summary.evaluated,
            skipped = summary.skipped,
            customers = summary.customers,
            "Segment run finished"
        );
        Ok(summary)
    }
}

/// Decode and compile one persisted rule
pub fn prepare_rule(
    query: &CustomerQuery,
    config: &RulesConfig,
    row: &SegmentRuleRow,
) -> Result<SegmentQuery, SegmentError> {
    let invalid = |source| SegmentError::InvalidRule {
        id: row.id.clone(),
        name: row.name.clone(),
        source,
    };

    let rule = parse_rule(&row.rule, &config.allowed_fields).map_err(invalid)?;
    query.with_rule(&rule).map_err(invalid)
}

/// Apply the invalid rule policy: `Ok` means skip and continue
fn handle_invalid_rule(policy: InvalidRulePolicy, err: SegmentError) -> Result<(), SegmentError> {
    match policy {
        InvalidRulePolicy::Skip => {
            tracing::warn!(error = %err, "Skipping invalid rule");
            Ok(())
        }
        InvalidRulePolicy::Halt => Err(err),
    }
}
