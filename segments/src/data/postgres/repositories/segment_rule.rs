//! Segment rule repository for PostgreSQL operations

use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::types::SegmentRuleRow;

/// List every persisted rule, ordered by name
///
/// `table` must already be validated as a plain identifier. Columns are cast
/// to text so uuid ids and json/jsonb documents read the same way.
pub async fn list_segment_rules(
    pool: &PgPool,
    table: &str,
) -> Result<Vec<SegmentRuleRow>, PostgresError> {
    let sql = format!(
        "SELECT id::text, name, rule::text FROM {} ORDER BY name, id",
        table
    );

    let rows = sqlx::query_as::<_, (String, String, String)>(&sql)
        .fetch_all(pool)
        .await?;

    tracing::debug!(%table, count = rows.len(), "Loaded segment rules");

    Ok(rows
        .into_iter()
        .map(|(id, name, rule)| SegmentRuleRow { id, name, rule })
        .collect())
}
