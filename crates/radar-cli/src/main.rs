mod scheduler;

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use radar_pipeline::{DayWindow, RunOptions};

#[derive(Debug, Parser)]
#[command(name = "radar-cli")]
#[command(about = "Demand radar command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one radar task now: fetch, extract, rank.
    Run {
        /// Comma-separated platform ids (defaults to every enabled platform).
        #[arg(long, value_delimiter = ',')]
        platforms: Option<Vec<String>>,
        /// Trailing fetch window in hours.
        #[arg(long)]
        hours_back: Option<i64>,
        /// Per-platform result cap.
        #[arg(long)]
        max_results: Option<usize>,
    },
    /// Regenerate one day's ranking from already-persisted demands.
    Rank {
        /// Day to rank, YYYY-MM-DD (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print one day's ranking.
    Show {
        /// Day to show, YYYY-MM-DD (defaults to today).
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List recent radar tasks and their per-platform outcomes.
    Tasks {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
    /// Show one radar task by id.
    Task { id: i64 },
    /// Run the cron scheduler in the foreground until interrupted.
    Schedule,
    /// Apply pending database migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // load_app_config reads .env itself before touching the environment.
    let config = Arc::new(radar_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = radar_db::PoolConfig::from_app_config(&config);
    let pool = radar_db::connect_pool(&config.database_url, pool_config).await?;
    radar_db::ping(&pool).await?;

    match cli.command {
        Commands::Run {
            platforms,
            hours_back,
            max_results,
        } => {
            radar_db::run_migrations(&pool).await?;
            let registry = radar_core::load_platforms(&config.platforms_path)?;
            let options = build_run_options(&config, &registry, platforms, hours_back, max_results);
            let summary = radar_pipeline::run_radar_task(&pool, &config, &registry, options).await?;

            println!(
                "task {} ({}) completed: {} sources, {} demands, {} ranking entries",
                summary.task_id,
                summary.public_id,
                summary.sources_count,
                summary.demands_count,
                summary.rankings_count
            );
            for outcome in &summary.outcomes {
                match &outcome.error {
                    Some(error) => println!(
                        "  {:<12} {:<9} {}",
                        outcome.platform, outcome.status, error
                    ),
                    None => println!(
                        "  {:<12} {:<9} {} sources, {} demands",
                        outcome.platform, outcome.status, outcome.sources, outcome.demands
                    ),
                }
            }
        }
        Commands::Rank { date } => {
            let window = DayWindow::new(config.ranking_utc_offset_hours);
            let day = date.unwrap_or_else(|| window.day_of(Utc::now()));
            let count =
                radar_pipeline::generate_daily_ranking(&pool, day, window, config.ranking_top_n)
                    .await?;
            println!("{count} ranking entries for {day}");
        }
        Commands::Show { date } => {
            let window = DayWindow::new(config.ranking_utc_offset_hours);
            let day = date.unwrap_or_else(|| window.day_of(Utc::now()));
            let rows = radar_db::list_rankings_for_day(&pool, day).await?;
            if rows.is_empty() {
                println!("no ranking for {day}");
            }
            for row in rows {
                println!(
                    "{:>3}. [{:<6}] x{:<4} {}",
                    row.rank, row.trend, row.frequency, row.normalized_text
                );
                if let Some(notes) = row.notes {
                    println!("     {notes}");
                }
            }
        }
        Commands::Tasks { limit } => {
            let tasks = radar_db::list_radar_tasks(&pool, limit).await?;
            if tasks.is_empty() {
                println!("no radar tasks yet");
            }
            for task in tasks {
                print_task(&pool, &task).await?;
            }
        }
        Commands::Task { id } => {
            let task = radar_db::get_radar_task(&pool, id).await?;
            print_task(&pool, &task).await?;
        }
        Commands::Schedule => {
            radar_db::run_migrations(&pool).await?;
            let _scheduler = scheduler::build_scheduler(pool.clone(), Arc::clone(&config)).await?;
            tracing::info!(cron = %config.schedule_cron, "scheduler running, press ctrl-c to stop");
            shutdown_signal().await;
        }
        Commands::Migrate => {
            let applied = radar_db::run_migrations(&pool).await?;
            println!("{applied} migrations applied");
        }
    }

    Ok(())
}

/// Print one task line plus its per-platform outcome rows.
async fn print_task(pool: &sqlx::PgPool, task: &radar_db::RadarTaskRow) -> anyhow::Result<()> {
    println!(
        "{} [{}] {} created {} | {} sources, {} demands, {} rankings",
        task.id,
        task.status,
        task.platforms.join(","),
        task.created_at.format("%Y-%m-%d %H:%M:%S"),
        task.sources_count,
        task.demands_count,
        task.rankings_count
    );
    if let Some(error) = &task.error_message {
        println!("     error: {error}");
    }
    for platform in radar_db::list_task_platforms(pool, task.id).await? {
        match platform.error_message {
            Some(error) => println!(
                "     {:<12} {:<9} {}",
                platform.platform, platform.status, error
            ),
            None => println!(
                "     {:<12} {:<9} {} sources, {} demands",
                platform.platform, platform.status, platform.sources_count, platform.demands_count
            ),
        }
    }
    Ok(())
}

/// Resolve run options from config defaults, the platform registry, and CLI
/// overrides. An explicit `--platforms` list wins over the registry's
/// enabled set.
fn build_run_options(
    config: &radar_core::AppConfig,
    registry: &radar_core::PlatformsFile,
    platforms: Option<Vec<String>>,
    hours_back: Option<i64>,
    max_results: Option<usize>,
) -> RunOptions {
    RunOptions {
        platforms: platforms.unwrap_or_else(|| registry.enabled_ids()),
        hours_back: hours_back.unwrap_or(config.hours_back),
        max_results_per_platform: max_results.unwrap_or(config.max_results_per_platform),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, stopping scheduler");
}
