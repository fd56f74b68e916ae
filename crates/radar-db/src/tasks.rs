//! Database operations for `radar_tasks` and `radar_task_platforms`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `radar_tasks` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RadarTaskRow {
    pub id: i64,
    pub public_id: Uuid,
    pub status: String,
    pub platforms: Vec<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub sources_count: i32,
    pub demands_count: i32,
    pub rankings_count: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A row from the `radar_task_platforms` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskPlatformRow {
    pub id: i64,
    pub task_id: i64,
    pub platform: String,
    pub status: String,
    pub sources_count: i32,
    pub demands_count: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const TASK_COLUMNS: &str = "id, public_id, status, platforms, started_at, completed_at, \
     sources_count, demands_count, rankings_count, error_message, created_at";

// ---------------------------------------------------------------------------
// radar_tasks operations
// ---------------------------------------------------------------------------

/// Creates a new radar task in `pending` status.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or fetch fails.
pub async fn create_radar_task(
    pool: &PgPool,
    platforms: &[String],
) -> Result<RadarTaskRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, RadarTaskRow>(&format!(
        "INSERT INTO radar_tasks (public_id, platforms, status) \
         VALUES ($1, $2, 'pending') \
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(public_id)
    .bind(platforms)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a task as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidTaskTransition`] if the task is not `pending`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn start_radar_task(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE radar_tasks \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'pending'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTaskTransition {
            id,
            expected_status: "pending",
        });
    }

    Ok(())
}

/// Marks a task as `completed`, sets `completed_at = NOW()` and the final counts.
///
/// # Errors
///
/// Returns [`DbError::InvalidTaskTransition`] if the task is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn complete_radar_task(
    pool: &PgPool,
    id: i64,
    sources_count: i32,
    demands_count: i32,
    rankings_count: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE radar_tasks \
         SET status = 'completed', completed_at = NOW(), \
             sources_count = $1, demands_count = $2, rankings_count = $3 \
         WHERE id = $4 AND status = 'running'",
    )
    .bind(sources_count)
    .bind(demands_count)
    .bind(rankings_count)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTaskTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a task as `failed`, sets `completed_at = NOW()` and `error_message`.
///
/// Counts accumulated before the failure are kept as-is.
///
/// # Errors
///
/// Returns [`DbError::InvalidTaskTransition`] if the task is not `running`,
/// or [`DbError::Sqlx`] if the update fails.
pub async fn fail_radar_task(
    pool: &PgPool,
    id: i64,
    error_message: &str,
    sources_count: i32,
    demands_count: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE radar_tasks \
         SET status = 'failed', completed_at = NOW(), error_message = $1, \
             sources_count = $2, demands_count = $3 \
         WHERE id = $4 AND status = 'running'",
    )
    .bind(error_message)
    .bind(sources_count)
    .bind(demands_count)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidTaskTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single task by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_radar_task(pool: &PgPool, id: i64) -> Result<RadarTaskRow, DbError> {
    let row = sqlx::query_as::<_, RadarTaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM radar_tasks WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` tasks, ordered by `created_at DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_radar_tasks(pool: &PgPool, limit: i64) -> Result<Vec<RadarTaskRow>, DbError> {
    let rows = sqlx::query_as::<_, RadarTaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM radar_tasks \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    ))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

// ---------------------------------------------------------------------------
// radar_task_platforms operations
// ---------------------------------------------------------------------------

/// Inserts or updates the per-platform outcome row for a task.
///
/// Conflicts on `(task_id, platform)` update `status`, the counts, and
/// `error_message` in place.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_task_platform(
    pool: &PgPool,
    task_id: i64,
    platform: &str,
    status: &str,
    sources_count: i32,
    demands_count: i32,
    error_message: Option<&str>,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO radar_task_platforms \
             (task_id, platform, status, sources_count, demands_count, error_message) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (task_id, platform) DO UPDATE SET \
             status        = EXCLUDED.status, \
             sources_count = EXCLUDED.sources_count, \
             demands_count = EXCLUDED.demands_count, \
             error_message = EXCLUDED.error_message",
    )
    .bind(task_id)
    .bind(platform)
    .bind(status)
    .bind(sources_count)
    .bind(demands_count)
    .bind(error_message)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns all platform-level outcome rows for a given task.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_task_platforms(
    pool: &PgPool,
    task_id: i64,
) -> Result<Vec<TaskPlatformRow>, DbError> {
    let rows = sqlx::query_as::<_, TaskPlatformRow>(
        "SELECT id, task_id, platform, status, sources_count, demands_count, \
                error_message, created_at \
         FROM radar_task_platforms \
         WHERE task_id = $1 \
         ORDER BY id",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
