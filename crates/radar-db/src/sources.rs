//! Database operations for `demand_sources`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `demand_sources` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DemandSourceRow {
    pub id: i64,
    pub task_id: i64,
    pub platform: String,
    pub platform_source_id: Option<String>,
    pub title: String,
    pub content: String,
    pub url: String,
    pub author: Option<String>,
    pub upvotes: i64,
    pub comment_count: i64,
    pub metadata: serde_json::Value,
    pub posted_at: DateTime<Utc>,
    pub crawled_at: DateTime<Utc>,
}

/// Insert payload for one raw document. Rows are append-only.
#[derive(Debug, Clone)]
pub struct NewDemandSource {
    pub platform: String,
    pub platform_source_id: Option<String>,
    pub title: String,
    pub content: String,
    pub url: String,
    pub author: Option<String>,
    pub upvotes: i64,
    pub comment_count: i64,
    pub metadata: serde_json::Value,
    pub posted_at: DateTime<Utc>,
}

/// Inserts one raw document for a task and returns its id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_demand_source(
    pool: &PgPool,
    task_id: i64,
    source: &NewDemandSource,
) -> Result<i64, DbError> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO demand_sources \
             (task_id, platform, platform_source_id, title, content, url, \
              author, upvotes, comment_count, metadata, posted_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         RETURNING id",
    )
    .bind(task_id)
    .bind(&source.platform)
    .bind(&source.platform_source_id)
    .bind(&source.title)
    .bind(&source.content)
    .bind(&source.url)
    .bind(&source.author)
    .bind(source.upvotes)
    .bind(source.comment_count)
    .bind(&source.metadata)
    .bind(source.posted_at)
    .fetch_one(pool)
    .await?;

    Ok(id)
}
