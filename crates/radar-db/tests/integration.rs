//! Offline unit tests for radar-db pool configuration and row types.
//! These tests do not require a live database connection.

use radar_core::{AppConfig, Environment};
use radar_db::{DemandRankingRow, NewDemandSource, PoolConfig, RadarTaskRow};
use std::path::PathBuf;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        platforms_path: PathBuf::from("./config/platforms.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        fetch_request_timeout_secs: 30,
        fetch_user_agent: "ua".to_string(),
        max_concurrent_platforms: 2,
        hours_back: 24,
        max_results_per_platform: 100,
        ranking_top_n: 20,
        ranking_utc_offset_hours: 0,
        reddit_client_id: None,
        reddit_client_secret: None,
        reddit_user_agent: "ua".to_string(),
        schedule_cron: "0 0 3 * * *".to_string(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`RadarTaskRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn radar_task_row_has_expected_fields() {
    use chrono::Utc;
    use uuid::Uuid;

    let row = RadarTaskRow {
        id: 1_i64,
        public_id: Uuid::new_v4(),
        status: "pending".to_string(),
        platforms: vec!["hackernews".to_string(), "reddit".to_string()],
        started_at: None,
        completed_at: None,
        sources_count: 0_i32,
        demands_count: 0_i32,
        rankings_count: 0_i32,
        error_message: None,
        created_at: Utc::now(),
    };

    assert_eq!(row.id, 1);
    assert_eq!(row.status, "pending");
    assert_eq!(row.platforms.len(), 2);
    assert!(row.started_at.is_none());
    assert!(row.completed_at.is_none());
    assert_eq!(row.sources_count, 0);
    assert_eq!(row.demands_count, 0);
    assert_eq!(row.rankings_count, 0);
    assert!(row.error_message.is_none());
}

/// Compile-time smoke test for the raw-document insert payload.
#[test]
fn new_demand_source_has_expected_fields() {
    use chrono::Utc;

    let source = NewDemandSource {
        platform: "hackernews".to_string(),
        platform_source_id: Some("41000000".to_string()),
        title: "Ask HN: expense tracking?".to_string(),
        content: "I need a tool that tracks expenses.".to_string(),
        url: "https://news.ycombinator.com/item?id=41000000".to_string(),
        author: Some("pg".to_string()),
        upvotes: 12,
        comment_count: 3,
        metadata: serde_json::json!({"points": 12}),
        posted_at: Utc::now(),
    };

    assert_eq!(source.platform, "hackernews");
    assert!(source.platform_source_id.is_some());
    assert_eq!(source.upvotes, 12);
}

/// Compile-time smoke test for the ranking row shape.
#[test]
fn demand_ranking_row_has_expected_fields() {
    use chrono::NaiveDate;

    let row = DemandRankingRow {
        id: 5_i64,
        demand_id: 17_i64,
        normalized_text: "tracks expenses".to_string(),
        ranking_date: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        rank: 1_i32,
        frequency: 31_i32,
        source_count: 6_i32,
        trend: "up".to_string(),
        notes: Some("strong demand".to_string()),
    };

    assert_eq!(row.rank, 1);
    assert_eq!(row.trend, "up");
    assert_eq!(row.normalized_text, "tracks expenses");
}
