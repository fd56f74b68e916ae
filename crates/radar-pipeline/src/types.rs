use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Trailing time window and result cap handed to every platform fetcher.
#[derive(Debug, Clone, Copy)]
pub struct FetchWindow {
    pub hours_back: i64,
    pub max_results: usize,
}

/// One raw candidate document, normalized into the common record shape
/// every platform adapter produces.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Platform-native id, when the platform has one.
    pub platform_source_id: Option<String>,
    pub title: String,
    pub content: String,
    pub url: String,
    pub author: Option<String>,
    /// Popularity signal (upvotes, points).
    pub upvotes: i64,
    /// Engagement signal.
    pub comment_count: i64,
    pub metadata: serde_json::Value,
    /// When the document was published on its platform.
    pub posted_at: DateTime<Utc>,
}

/// One candidate need-statement extracted from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandCandidate {
    /// The text span the pattern matched (capture group or whole match).
    pub matched_text: String,
    /// Lowercased, punctuation-stripped, whitespace-collapsed form.
    pub normalized_text: String,
    /// Up to 10 keywords, stop-words removed, original order.
    pub keywords: Vec<String>,
    pub category: Option<String>,
}

/// Options for one radar task run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub platforms: Vec<String>,
    pub hours_back: i64,
    pub max_results_per_platform: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformStatus {
    Succeeded,
    Failed,
    Skipped,
}

impl PlatformStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PlatformStatus::Succeeded => "succeeded",
            PlatformStatus::Failed => "failed",
            PlatformStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for PlatformStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one platform within a task run.
#[derive(Debug, Clone)]
pub struct PlatformOutcome {
    pub platform: String,
    pub status: PlatformStatus,
    pub sources: i32,
    pub demands: i32,
    pub error: Option<String>,
}

/// Final summary of a completed radar task.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub task_id: i64,
    pub public_id: Uuid,
    pub outcomes: Vec<PlatformOutcome>,
    pub sources_count: i32,
    pub demands_count: i32,
    pub rankings_count: usize,
}
