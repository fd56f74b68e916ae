//! Database operations for `extracted_demands`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// Insert payload for one extracted demand. Rows are append-only.
#[derive(Debug, Clone)]
pub struct NewDemand {
    pub matched_text: String,
    pub normalized_text: String,
    pub keywords: Vec<String>,
    pub category: Option<String>,
}

/// The slice of an `extracted_demands` row the ranking aggregator needs,
/// joined with its parent source's platform.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DemandInRangeRow {
    pub id: i64,
    pub source_id: i64,
    pub platform: String,
    pub normalized_text: String,
    pub category: Option<String>,
}

/// Inserts one extracted demand for a source and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_extracted_demand(
    pool: &PgPool,
    source_id: i64,
    demand: &NewDemand,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO extracted_demands \
             (source_id, matched_text, normalized_text, keywords, category) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id",
    )
    .bind(source_id)
    .bind(&demand.matched_text)
    .bind(&demand.normalized_text)
    .bind(&demand.keywords)
    .bind(&demand.category)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Returns all demands created within `[start, end]` (inclusive), joined
/// with their parent source's platform, in insertion order.
///
/// Insertion order is what makes the ranking's frequency tie-break stable.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_demands_in_range(
    pool: &PgPool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<DemandInRangeRow>, DbError> {
    let rows = sqlx::query_as::<_, DemandInRangeRow>(
        "SELECT d.id, d.source_id, s.platform, d.normalized_text, d.category \
         FROM extracted_demands d \
         JOIN demand_sources s ON s.id = d.source_id \
         WHERE d.created_at >= $1 AND d.created_at <= $2 \
         ORDER BY d.id",
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
