//! Database operations for `demand_rankings`.
//!
//! A day's ranking set is replaced wholesale inside one transaction,
//! serialized by a per-day advisory lock, so concurrent generation runs
//! for the same day cannot interleave the delete and the insert.

use chrono::{Datelike, NaiveDate};
use sqlx::PgPool;

use crate::DbError;

/// Advisory lock class for ranking replacement ("RADK").
const RANKING_LOCK_CLASS: i32 = 0x5241_444B;

/// A row from the `demand_rankings` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DemandRankingRow {
    pub id: i64,
    pub demand_id: i64,
    pub normalized_text: String,
    pub ranking_date: NaiveDate,
    pub rank: i32,
    pub frequency: i32,
    pub source_count: i32,
    pub trend: String,
    pub notes: Option<String>,
}

/// Insert payload for one ranking row.
#[derive(Debug, Clone)]
pub struct NewDemandRanking {
    pub demand_id: i64,
    pub normalized_text: String,
    pub rank: i32,
    pub frequency: i32,
    pub source_count: i32,
    pub trend: String,
    pub notes: Option<String>,
}

const RANKING_COLUMNS: &str =
    "id, demand_id, normalized_text, ranking_date, rank, frequency, source_count, trend, notes";

/// Looks up one day's ranking row for a normalized demand text.
///
/// Used for day-over-day trend classification: the same demand identity is
/// matched by its normalized text, never by rank position.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_ranking_for_day(
    pool: &PgPool,
    day: NaiveDate,
    normalized_text: &str,
) -> Result<Option<DemandRankingRow>, DbError> {
    let row = sqlx::query_as::<_, DemandRankingRow>(&format!(
        "SELECT {RANKING_COLUMNS} FROM demand_rankings \
         WHERE ranking_date = $1 AND normalized_text = $2"
    ))
    .bind(day)
    .bind(normalized_text)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns all ranking rows for a day, ordered by rank.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_rankings_for_day(
    pool: &PgPool,
    day: NaiveDate,
) -> Result<Vec<DemandRankingRow>, DbError> {
    let rows = sqlx::query_as::<_, DemandRankingRow>(&format!(
        "SELECT {RANKING_COLUMNS} FROM demand_rankings \
         WHERE ranking_date = $1 \
         ORDER BY rank"
    ))
    .bind(day)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replaces a day's ranking set: delete everything for `day`, then insert
/// `rows`. All-or-nothing: runs in one transaction holding a per-day
/// advisory lock, released on commit or rollback.
///
/// The delete runs even when `rows` is empty, so a day whose source data
/// was invalidated cannot keep a stale ranking.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement in the transaction fails.
pub async fn replace_rankings_for_day(
    pool: &PgPool,
    day: NaiveDate,
    rows: &[NewDemandRanking],
) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(RANKING_LOCK_CLASS)
        .bind(day.num_days_from_ce())
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM demand_rankings WHERE ranking_date = $1")
        .bind(day)
        .execute(&mut *tx)
        .await?;

    for row in rows {
        sqlx::query(
            "INSERT INTO demand_rankings \
                 (demand_id, normalized_text, ranking_date, rank, frequency, \
                  source_count, trend, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(row.demand_id)
        .bind(&row.normalized_text)
        .bind(day)
        .bind(row.rank)
        .bind(row.frequency)
        .bind(row.source_count)
        .bind(&row.trend)
        .bind(&row.notes)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(rows.len())
}
