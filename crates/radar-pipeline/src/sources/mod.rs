//! Platform fetcher abstraction and registry.
//!
//! One adapter per platform. Each owns its transport details (pagination,
//! auth) and must never let one malformed item abort the whole fetch:
//! per-item failures are skipped, an error is returned only when the
//! adapter as a whole cannot run.

mod hackernews;
mod reddit;
mod twitter;
mod v2ex;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

pub use hackernews::HackerNewsFetcher;
pub use reddit::RedditFetcher;
pub use twitter::TwitterFetcher;
pub use v2ex::V2exFetcher;

use crate::error::FetchError;
use crate::types::{FetchWindow, RawDocument};

/// A platform's fetch capability, looked up by id. New platforms register
/// in [`build_fetchers`] without touching the orchestrator.
#[async_trait]
pub trait PlatformFetcher: Send + Sync {
    fn id(&self) -> &'static str;

    /// Fetch documents published within `now - window.hours_back`, at most
    /// `window.max_results`.
    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RawDocument>, FetchError>;
}

/// Build the fetcher registry for all known platforms.
///
/// Platform settings come from the registry file (reddit subreddit set) and
/// the app config (credentials, timeout, user agent).
///
/// # Errors
///
/// Returns [`reqwest::Error`] if the shared HTTP client cannot be built.
pub fn build_fetchers(
    config: &radar_core::AppConfig,
    registry: &radar_core::PlatformsFile,
) -> Result<HashMap<String, Box<dyn PlatformFetcher>>, reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.fetch_request_timeout_secs))
        .user_agent(config.fetch_user_agent.clone())
        .build()?;

    let subreddits = registry
        .get("reddit")
        .map(|p| p.subreddits.clone())
        .unwrap_or_default();

    let mut fetchers: HashMap<String, Box<dyn PlatformFetcher>> = HashMap::new();
    for fetcher in [
        Box::new(HackerNewsFetcher::new(client.clone())) as Box<dyn PlatformFetcher>,
        Box::new(RedditFetcher::new(
            client.clone(),
            config.reddit_client_id.clone(),
            config.reddit_client_secret.clone(),
            config.reddit_user_agent.clone(),
            subreddits,
        )),
        Box::new(V2exFetcher::new(client)),
        Box::new(TwitterFetcher),
    ] {
        fetchers.insert(fetcher.id().to_string(), fetcher);
    }

    Ok(fetchers)
}
