//! Background job scheduler.
//!
//! Registers the recurring radar run on the configured cron expression and
//! starts the scheduler.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use radar_pipeline::RunOptions;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process; dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<radar_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_radar_job(&scheduler, pool, config).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the recurring radar run on the configured cron expression.
async fn register_radar_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<radar_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    let cron = config.schedule_cron.clone();

    let job = Job::new_async(cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting radar run");
            run_radar_job(&pool, &config).await;
            tracing::info!("scheduler: radar run complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Drive one scheduled radar run.
///
/// The registry file is reloaded on every run so platform enable/disable
/// edits take effect without a restart. Failures are logged, never
/// propagated: a failed run must not take the scheduler down.
async fn run_radar_job(pool: &PgPool, config: &radar_core::AppConfig) {
    let registry = match radar_core::load_platforms(&config.platforms_path) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: failed to load platform registry");
            return;
        }
    };

    let options = RunOptions {
        platforms: registry.enabled_ids(),
        hours_back: config.hours_back,
        max_results_per_platform: config.max_results_per_platform,
    };

    match radar_pipeline::run_radar_task(pool, config, &registry, options).await {
        Ok(summary) => {
            tracing::info!(
                task_id = summary.task_id,
                sources = summary.sources_count,
                demands = summary.demands_count,
                rankings = summary.rankings_count,
                "scheduler: radar task completed"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: radar task failed");
        }
    }
}
