//! V2EX adapter (public latest-topics JSON endpoint).
//!
//! Supplies the localized (Chinese) pattern traffic. The public endpoint
//! has no pagination; one request per fetch.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::FetchError;
use crate::sources::PlatformFetcher;
use crate::types::{FetchWindow, RawDocument};

const DEFAULT_BASE_URL: &str = "https://www.v2ex.com/api";

#[derive(Debug, Deserialize)]
struct Topic {
    id: i64,
    title: Option<String>,
    content: Option<String>,
    url: Option<String>,
    replies: Option<i64>,
    created: Option<i64>,
    member: Option<Member>,
    node: Option<Node>,
}

#[derive(Debug, Deserialize)]
struct Member {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Node {
    name: Option<String>,
}

pub struct V2exFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl V2exFetcher {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[async_trait]
impl PlatformFetcher for V2exFetcher {
    fn id(&self) -> &'static str {
        "v2ex"
    }

    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RawDocument>, FetchError> {
        let cutoff = Utc::now() - Duration::hours(window.hours_back);

        let response = self
            .client
            .get(format!("{}/topics/latest.json", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Api(format!(
                "V2EX latest topics failed with status {}",
                response.status()
            )));
        }

        let topics: Vec<Topic> = response
            .json()
            .await
            .map_err(|e| FetchError::Api(format!("V2EX response parse error: {e}")))?;

        let mut documents: Vec<RawDocument> = topics
            .iter()
            .filter_map(|topic| topic_to_document(topic, cutoff))
            .collect();
        documents.truncate(window.max_results);

        tracing::debug!(count = documents.len(), "collected V2EX documents");
        Ok(documents)
    }
}

/// Convert one topic into the common record shape.
///
/// Returns `None` for topics missing title/timestamp or created before
/// `cutoff`.
fn topic_to_document(topic: &Topic, cutoff: DateTime<Utc>) -> Option<RawDocument> {
    let posted_at = DateTime::from_timestamp(topic.created?, 0)?;
    if posted_at < cutoff {
        return None;
    }
    let title = topic.title.clone()?;

    Some(RawDocument {
        platform_source_id: Some(topic.id.to_string()),
        title,
        content: topic.content.clone().unwrap_or_default(),
        url: topic
            .url
            .clone()
            .unwrap_or_else(|| format!("https://www.v2ex.com/t/{}", topic.id)),
        author: topic.member.as_ref().and_then(|m| m.username.clone()),
        upvotes: 0,
        comment_count: topic.replies.unwrap_or(0),
        metadata: serde_json::json!({
            "node": topic.node.as_ref().and_then(|n| n.name.clone()),
        }),
        posted_at,
    })
}
