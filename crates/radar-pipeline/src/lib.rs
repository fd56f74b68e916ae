pub mod daywindow;
pub mod error;
pub mod extractor;
pub mod ranking;
pub mod sources;
pub mod task;
pub mod types;

pub use daywindow::DayWindow;
pub use error::{FetchError, PipelineError};
pub use extractor::DemandExtractor;
pub use ranking::{
    build_ranking_rows, classify_trend, generate_daily_ranking, rank_demand_groups, DemandGroup,
    Trend,
};
pub use sources::{build_fetchers, PlatformFetcher};
pub use task::{run_radar_task, summarize};
pub use types::{
    DemandCandidate, FetchWindow, PlatformOutcome, PlatformStatus, RawDocument, RunOptions,
    RunSummary,
};
