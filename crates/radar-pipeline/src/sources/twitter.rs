//! Twitter/X adapter stub.
//!
//! Search requires paid API access. Until credentials and a plan exist,
//! the adapter reports `Unsupported`, which the orchestrator records as a
//! soft skip rather than a failure.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::sources::PlatformFetcher;
use crate::types::{FetchWindow, RawDocument};

pub struct TwitterFetcher;

#[async_trait]
impl PlatformFetcher for TwitterFetcher {
    fn id(&self) -> &'static str {
        "twitter"
    }

    async fn fetch(&self, _window: FetchWindow) -> Result<Vec<RawDocument>, FetchError> {
        Err(FetchError::Unsupported(
            "twitter search requires paid API access",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn twitter_reports_unsupported() {
        let result = TwitterFetcher
            .fetch(FetchWindow {
                hours_back: 24,
                max_results: 10,
            })
            .await;
        assert!(matches!(result, Err(FetchError::Unsupported(_))));
    }
}
