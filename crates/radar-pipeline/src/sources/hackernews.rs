//! Hacker News adapter (Algolia search API, `Ask HN` stories).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::FetchError;
use crate::sources::PlatformFetcher;
use crate::types::{FetchWindow, RawDocument};

const DEFAULT_BASE_URL: &str = "https://hn.algolia.com/api/v1";
const HITS_PER_PAGE: usize = 100;
const MAX_PAGES: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<Hit>,
    #[serde(rename = "nbPages")]
    nb_pages: i64,
    page: i64,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "objectID")]
    object_id: String,
    title: Option<String>,
    story_text: Option<String>,
    author: Option<String>,
    points: Option<i64>,
    num_comments: Option<i64>,
    created_at_i: Option<i64>,
}

pub struct HackerNewsFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HackerNewsFetcher {
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
impl PlatformFetcher for HackerNewsFetcher {
    fn id(&self) -> &'static str {
        "hackernews"
    }

    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RawDocument>, FetchError> {
        let cutoff = Utc::now() - Duration::hours(window.hours_back);
        let mut documents = Vec::new();

        for page in 0..MAX_PAGES {
            let response = self
                .client
                .get(format!("{}/search_by_date", self.base_url))
                .query(&[
                    ("tags", "ask_hn".to_string()),
                    ("hitsPerPage", HITS_PER_PAGE.to_string()),
                    ("page", page.to_string()),
                    (
                        "numericFilters",
                        format!("created_at_i>{}", cutoff.timestamp()),
                    ),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(FetchError::Api(format!(
                    "HN search failed with status {}",
                    response.status()
                )));
            }

            let body: SearchResponse = response
                .json()
                .await
                .map_err(|e| FetchError::Api(format!("HN response parse error: {e}")))?;

            documents.extend(
                body.hits
                    .iter()
                    .filter_map(|hit| hit_to_document(hit, cutoff)),
            );

            if documents.len() >= window.max_results || body.page + 1 >= body.nb_pages {
                break;
            }
        }

        documents.truncate(window.max_results);

        tracing::debug!(count = documents.len(), "collected Hacker News documents");
        Ok(documents)
    }
}

/// Convert one search hit into the common record shape.
///
/// Returns `None` for hits missing a title or timestamp, or published
/// before `cutoff`; malformed items are skipped, never fatal.
fn hit_to_document(hit: &Hit, cutoff: DateTime<Utc>) -> Option<RawDocument> {
    let created_at_i = hit.created_at_i?;
    let posted_at = DateTime::from_timestamp(created_at_i, 0)?;
    if posted_at < cutoff {
        tracing::debug!(id = %hit.object_id, "HN hit outside window, skipping");
        return None;
    }

    let title = hit.title.clone()?;
    let content = hit.story_text.as_deref().map(strip_html).unwrap_or_default();

    Some(RawDocument {
        platform_source_id: Some(hit.object_id.clone()),
        title,
        content,
        url: format!("https://news.ycombinator.com/item?id={}", hit.object_id),
        author: hit.author.clone(),
        upvotes: hit.points.unwrap_or(0),
        comment_count: hit.num_comments.unwrap_or(0),
        metadata: serde_json::json!({ "tags": "ask_hn" }),
        posted_at,
    })
}

/// Strip HTML tags from a string, returning plain text. HN story text
/// arrives with `<p>` markup.
fn strip_html(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.trim().to_string()
}
