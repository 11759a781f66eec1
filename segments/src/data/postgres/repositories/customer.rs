//! Customer repository for PostgreSQL operations

use sqlx::PgPool;

use crate::data::postgres::PostgresError;
use crate::data::types::CustomerRow;
use crate::domain::rules::{SqlParam, SqlParams};

type CustomerTuple = (
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Run a compiled customer query, binding `params` in placeholder order
///
/// `sql` must select `id, first_name, last_name, email, phone_number`.
pub async fn find_customers(
    pool: &PgPool,
    sql: &str,
    params: &SqlParams,
) -> Result<Vec<CustomerRow>, PostgresError> {
    let mut query = sqlx::query_as::<_, CustomerTuple>(sql);
    for param in params.iter() {
        query = match param {
            SqlParam::Text(value) => query.bind(value.as_str()),
            SqlParam::TextArray(values) => query.bind(values.as_slice()),
            SqlParam::Bool(value) => query.bind(*value),
        };
    }

    let rows = query.fetch_all(pool).await?;
    tracing::trace!(count = rows.len(), "Fetched customers");

    Ok(rows
        .into_iter()
        .map(
            |(id, first_name, last_name, email, phone_number)| CustomerRow {
                id,
                first_name,
                last_name,
                email,
                phone_number,
            },
        )
        .collect())
}
