//! Radar task orchestration: create a task, run the platforms, generate
//! the daily ranking, then mark the task completed or failed.
//!
//! One platform's failure or slowness never affects another's result. The
//! task fails only when something goes wrong outside the per-platform loop
//! (ranking generation, HTTP client construction); even a run where every
//! platform failed completes, so a transient outage of all upstreams does
//! not wedge subsequent scheduled runs.

use chrono::Utc;
use futures::stream::{self, StreamExt};
use sqlx::PgPool;

use radar_db::NewDemandSource;

use crate::daywindow::DayWindow;
use crate::error::{FetchError, PipelineError};
use crate::extractor::DemandExtractor;
use crate::ranking::generate_daily_ranking;
use crate::sources::build_fetchers;
use crate::types::{
    FetchWindow, PlatformOutcome, PlatformStatus, RawDocument, RunOptions, RunSummary,
};

/// Run one radar task end to end.
///
/// Fetches all configured platforms with bounded concurrency, persists
/// documents and their extracted demands platform by platform, generates
/// today's ranking, and records final counts on the task row.
///
/// # Errors
///
/// Returns [`PipelineError`] only for errors outside the per-platform
/// loop: task bookkeeping, HTTP client construction, or ranking
/// generation. Sources and demands persisted before such a failure are
/// retained; they remain valid input for the next ranking run.
pub async fn run_radar_task(
    pool: &PgPool,
    config: &radar_core::AppConfig,
    registry: &radar_core::PlatformsFile,
    options: RunOptions,
) -> Result<RunSummary, PipelineError> {
    let task = radar_db::create_radar_task(pool, &options.platforms).await?;
    radar_db::start_radar_task(pool, task.id).await?;

    tracing::info!(
        task_id = task.id,
        public_id = %task.public_id,
        platforms = ?options.platforms,
        hours_back = options.hours_back,
        "radar task started"
    );

    let fetchers = match build_fetchers(config, registry) {
        Ok(fetchers) => fetchers,
        Err(e) => {
            fail_task_best_effort(pool, task.id, &format!("failed to build HTTP client: {e}"), 0, 0)
                .await;
            return Err(PipelineError::HttpClient(e));
        }
    };

    let window = FetchWindow {
        hours_back: options.hours_back,
        max_results: options.max_results_per_platform,
    };
    let max_concurrent = config.max_concurrent_platforms.max(1);

    // Fetch phase: pure network I/O, bounded concurrency. Persistence
    // happens afterwards, serially, so the shared totals need no locking.
    let fetch_results: Vec<(String, Result<Vec<RawDocument>, FetchError>)> =
        stream::iter(options.platforms.clone())
            .map(|platform| {
                let fetchers = &fetchers;
                async move {
                    let result = match fetchers.get(platform.as_str()) {
                        Some(fetcher) => fetcher.fetch(window).await,
                        None => Err(FetchError::UnknownPlatform(platform.clone())),
                    };
                    (platform, result)
                }
            })
            .buffer_unordered(max_concurrent)
            .collect()
            .await;

    let extractor = DemandExtractor::new();
    let mut outcomes: Vec<PlatformOutcome> = Vec::with_capacity(fetch_results.len());

    for (platform, result) in fetch_results {
        let outcome = match result {
            Ok(documents) => {
                persist_documents(pool, task.id, &platform, documents, &extractor).await
            }
            Err(error) => {
                match &error {
                    FetchError::Unsupported(reason) => {
                        tracing::info!(platform, reason, "platform unsupported, soft skip");
                    }
                    e => {
                        tracing::warn!(platform, error = %e, "platform fetch failed");
                    }
                }
                outcome_for_fetch_error(platform, &error)
            }
        };

        if let Err(e) = radar_db::upsert_task_platform(
            pool,
            task.id,
            &outcome.platform,
            outcome.status.as_str(),
            outcome.sources,
            outcome.demands,
            outcome.error.as_deref(),
        )
        .await
        {
            tracing::warn!(
                platform = %outcome.platform,
                error = %e,
                "failed to record platform outcome"
            );
        }

        outcomes.push(outcome);
    }

    let (sources_count, demands_count) = summarize(&outcomes);

    let day_window = DayWindow::new(config.ranking_utc_offset_hours);
    let today = day_window.day_of(Utc::now());
    let rankings_count =
        match generate_daily_ranking(pool, today, day_window, config.ranking_top_n).await {
            Ok(count) => count,
            Err(e) => {
                // Fatal: ranking generation sits outside the per-platform
                // loop. Persisted sources/demands are deliberately kept.
                fail_task_best_effort(pool, task.id, &e.to_string(), sources_count, demands_count)
                    .await;
                return Err(e);
            }
        };

    radar_db::complete_radar_task(
        pool,
        task.id,
        sources_count,
        demands_count,
        i32::try_from(rankings_count).unwrap_or(i32::MAX),
    )
    .await?;

    tracing::info!(
        task_id = task.id,
        sources = sources_count,
        demands = demands_count,
        rankings = rankings_count,
        "radar task completed"
    );

    Ok(RunSummary {
        task_id: task.id,
        public_id: task.public_id,
        outcomes,
        sources_count,
        demands_count,
        rankings_count,
    })
}

/// Persist one platform's documents and the demands extracted from them.
///
/// Item-level failures (one insert) are logged and skipped; the platform
/// still counts as succeeded with whatever was persisted.
async fn persist_documents(
    pool: &PgPool,
    task_id: i64,
    platform: &str,
    documents: Vec<RawDocument>,
    extractor: &DemandExtractor,
) -> PlatformOutcome {
    let mut sources: i32 = 0;
    let mut demands: i32 = 0;

    for doc in documents {
        let text = format!("{}\n{}", doc.title, doc.content);
        let source = NewDemandSource {
            platform: platform.to_string(),
            platform_source_id: doc.platform_source_id,
            title: doc.title,
            content: doc.content,
            url: doc.url,
            author: doc.author,
            upvotes: doc.upvotes,
            comment_count: doc.comment_count,
            metadata: doc.metadata,
            posted_at: doc.posted_at,
        };

        let source_id = match radar_db::insert_demand_source(pool, task_id, &source).await {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(platform, url = %source.url, error = %e, "failed to persist document, skipping");
                continue;
            }
        };
        sources = sources.saturating_add(1);

        for candidate in extractor.extract(&text) {
            let demand = radar_db::NewDemand {
                matched_text: candidate.matched_text,
                normalized_text: candidate.normalized_text,
                keywords: candidate.keywords,
                category: candidate.category,
            };
            match radar_db::insert_extracted_demand(pool, source_id, &demand).await {
                Ok(_) => demands = demands.saturating_add(1),
                Err(e) => {
                    tracing::warn!(platform, source_id, error = %e, "failed to persist demand, skipping");
                }
            }
        }
    }

    tracing::debug!(platform, sources, demands, "platform processed");

    PlatformOutcome {
        platform: platform.to_string(),
        status: PlatformStatus::Succeeded,
        sources,
        demands,
        error: None,
    }
}

/// Map an adapter error to its platform outcome: `Unsupported` is a soft
/// skip, everything else a failure.
fn outcome_for_fetch_error(platform: String, error: &FetchError) -> PlatformOutcome {
    let status = if matches!(error, FetchError::Unsupported(_)) {
        PlatformStatus::Skipped
    } else {
        PlatformStatus::Failed
    };
    PlatformOutcome {
        platform,
        status,
        sources: 0,
        demands: 0,
        error: Some(error.to_string()),
    }
}

/// Fold per-platform outcomes into `(sources, demands)` totals.
#[must_use]
pub fn summarize(outcomes: &[PlatformOutcome]) -> (i32, i32) {
    outcomes.iter().fold((0, 0), |(sources, demands), o| {
        (
            sources.saturating_add(o.sources),
            demands.saturating_add(o.demands),
        )
    })
}

/// Mark a task failed, logging instead of propagating if even that fails.
async fn fail_task_best_effort(
    pool: &PgPool,
    task_id: i64,
    message: &str,
    sources_count: i32,
    demands_count: i32,
) {
    if let Err(e) =
        radar_db::fail_radar_task(pool, task_id, message, sources_count, demands_count).await
    {
        tracing::error!(task_id, error = %e, "failed to mark radar task as failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(platform: &str, status: PlatformStatus, sources: i32, demands: i32) -> PlatformOutcome {
        PlatformOutcome {
            platform: platform.to_string(),
            status,
            sources,
            demands,
            error: None,
        }
    }

    #[test]
    fn summarize_counts_only_what_platforms_produced() {
        // Platform A failed, platform B succeeded with 5 documents: the
        // task totals reflect B alone.
        let outcomes = vec![
            outcome("reddit", PlatformStatus::Failed, 0, 0),
            outcome("hackernews", PlatformStatus::Succeeded, 5, 3),
        ];
        assert_eq!(summarize(&outcomes), (5, 3));
    }

    #[test]
    fn summarize_adds_across_succeeded_platforms() {
        let outcomes = vec![
            outcome("hackernews", PlatformStatus::Succeeded, 5, 2),
            outcome("v2ex", PlatformStatus::Succeeded, 7, 4),
            outcome("twitter", PlatformStatus::Skipped, 0, 0),
        ];
        assert_eq!(summarize(&outcomes), (12, 6));
    }

    #[test]
    fn summarize_empty_is_zero() {
        assert_eq!(summarize(&[]), (0, 0));
    }

    #[test]
    fn unsupported_maps_to_skipped() {
        let outcome = outcome_for_fetch_error(
            "twitter".to_string(),
            &FetchError::Unsupported("paid API"),
        );
        assert_eq!(outcome.status, PlatformStatus::Skipped);
        assert_eq!(outcome.error.as_deref(), Some("unsupported: paid API"));
    }

    #[test]
    fn other_errors_map_to_failed() {
        let missing = outcome_for_fetch_error(
            "reddit".to_string(),
            &FetchError::MissingCredentials("reddit"),
        );
        assert_eq!(missing.status, PlatformStatus::Failed);

        let unknown = outcome_for_fetch_error(
            "myspace".to_string(),
            &FetchError::UnknownPlatform("myspace".to_string()),
        );
        assert_eq!(unknown.status, PlatformStatus::Failed);

        let api = outcome_for_fetch_error("v2ex".to_string(), &FetchError::Api("503".to_string()));
        assert_eq!(api.status, PlatformStatus::Failed);
        assert_eq!(api.sources, 0);
    }
}
