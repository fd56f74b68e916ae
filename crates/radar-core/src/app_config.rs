use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    pub platforms_path: PathBuf,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub fetch_request_timeout_secs: u64,
    pub fetch_user_agent: String,
    pub max_concurrent_platforms: usize,
    pub hours_back: i64,
    pub max_results_per_platform: usize,
    pub ranking_top_n: usize,
    /// Fixed offset from UTC, in hours, used to bucket demands into ranking
    /// days. Negative values are valid (western hemisphere deployments).
    pub ranking_utc_offset_hours: i32,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: String,
    pub schedule_cron: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("platforms_path", &self.platforms_path)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "fetch_request_timeout_secs",
                &self.fetch_request_timeout_secs,
            )
            .field("fetch_user_agent", &self.fetch_user_agent)
            .field("max_concurrent_platforms", &self.max_concurrent_platforms)
            .field("hours_back", &self.hours_back)
            .field("max_results_per_platform", &self.max_results_per_platform)
            .field("ranking_top_n", &self.ranking_top_n)
            .field("ranking_utc_offset_hours", &self.ranking_utc_offset_hours)
            .field(
                "reddit_client_id",
                &self.reddit_client_id.as_ref().map(|_| "[redacted]"),
            )
            .field(
                "reddit_client_secret",
                &self.reddit_client_secret.as_ref().map(|_| "[redacted]"),
            )
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("schedule_cron", &self.schedule_cron)
            .finish()
    }
}
