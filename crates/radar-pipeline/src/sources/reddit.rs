//! Reddit adapter (client-credentials OAuth, subreddit `new` listings).

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::error::FetchError;
use crate::sources::PlatformFetcher;
use crate::types::{FetchWindow, RawDocument};

const DEFAULT_AUTH_BASE_URL: &str = "https://www.reddit.com";
const DEFAULT_API_BASE_URL: &str = "https://oauth.reddit.com";
const PAGE_LIMIT: usize = 100;
const MAX_PAGES: usize = 5;
const DEFAULT_SUBREDDITS: &[&str] = &["SideProject", "somebodymakethis"];

/// Reddit OAuth token response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Reddit listing wrapper.
#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Post>,
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Post {
    data: PostData,
}

#[derive(Debug, Deserialize)]
struct PostData {
    id: Option<String>,
    title: Option<String>,
    selftext: Option<String>,
    permalink: Option<String>,
    author: Option<String>,
    subreddit: Option<String>,
    ups: Option<i64>,
    num_comments: Option<i64>,
    created_utc: Option<f64>,
}

pub struct RedditFetcher {
    client: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    user_agent: String,
    subreddits: Vec<String>,
    auth_base_url: String,
    api_base_url: String,
}

impl RedditFetcher {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        client_id: Option<String>,
        client_secret: Option<String>,
        user_agent: String,
        subreddits: Vec<String>,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            user_agent,
            subreddits,
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    fn with_base_url(
        client: reqwest::Client,
        client_id: Option<String>,
        client_secret: Option<String>,
        subreddits: Vec<String>,
        base_url: String,
    ) -> Self {
        Self {
            client,
            client_id,
            client_secret,
            user_agent: "test-agent".to_string(),
            subreddits,
            auth_base_url: base_url.clone(),
            api_base_url: base_url,
        }
    }

    async fn fetch_token(&self, client_id: &str, client_secret: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_base_url))
            .header("User-Agent", &self.user_agent)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Api(format!(
                "Reddit token exchange failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Api(format!("Reddit token parse error: {e}")))?;

        Ok(token.access_token)
    }

    fn subreddit_path(&self) -> String {
        if self.subreddits.is_empty() {
            DEFAULT_SUBREDDITS.join("+")
        } else {
            self.subreddits.join("+")
        }
    }
}

#[async_trait]
impl PlatformFetcher for RedditFetcher {
    fn id(&self) -> &'static str {
        "reddit"
    }

    async fn fetch(&self, window: FetchWindow) -> Result<Vec<RawDocument>, FetchError> {
        let (Some(client_id), Some(client_secret)) = (&self.client_id, &self.client_secret) else {
            return Err(FetchError::MissingCredentials("reddit"));
        };

        let token = self.fetch_token(client_id, client_secret).await?;
        let cutoff = Utc::now() - Duration::hours(window.hours_back);
        let endpoint = format!("{}/r/{}/new", self.api_base_url, self.subreddit_path());

        let mut documents = Vec::new();
        let mut after: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let mut params: Vec<(&str, String)> = vec![("limit", PAGE_LIMIT.to_string())];
            if let Some(cursor) = &after {
                params.push(("after", cursor.clone()));
            }

            let response = self
                .client
                .get(&endpoint)
                .header("Authorization", format!("Bearer {token}"))
                .header("User-Agent", &self.user_agent)
                .query(&params)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(FetchError::Api(format!(
                    "Reddit listing failed with status {}",
                    response.status()
                )));
            }

            let listing: Listing = response
                .json()
                .await
                .map_err(|e| FetchError::Api(format!("Reddit response parse error: {e}")))?;

            // `new` listings are newest-first; the page that crosses the
            // cutoff is the last page worth fetching. Only a parsed
            // timestamp older than the cutoff counts as crossing it:
            // malformed posts (deleted/removed, fields missing) are
            // skipped without ending pagination.
            let page_len = listing.data.children.len();
            let mut crossed_cutoff = false;
            for post in &listing.data.children {
                let Some(posted_at) = post_timestamp(&post.data) else {
                    tracing::debug!("reddit post missing timestamp, skipping");
                    continue;
                };
                if posted_at < cutoff {
                    crossed_cutoff = true;
                    continue;
                }
                match post_to_document(&post.data, posted_at) {
                    Some(doc) => documents.push(doc),
                    None => tracing::debug!("reddit post missing id or title, skipping"),
                }
            }

            if documents.len() >= window.max_results || crossed_cutoff || page_len == 0 {
                break;
            }

            after = listing.data.after;
            if after.is_none() {
                break;
            }
        }

        documents.truncate(window.max_results);

        tracing::debug!(count = documents.len(), "collected Reddit documents");
        Ok(documents)
    }
}

/// The post's publication time, when present and parseable.
fn post_timestamp(post: &PostData) -> Option<DateTime<Utc>> {
    #[allow(clippy::cast_possible_truncation)]
    let secs = post.created_utc? as i64;
    DateTime::from_timestamp(secs, 0)
}

/// Convert one listing post into the common record shape.
///
/// Returns `None` for posts missing an id or title; the window check
/// happens in the fetch loop, which needs the timestamp separately to
/// decide when to stop paginating.
fn post_to_document(post: &PostData, posted_at: DateTime<Utc>) -> Option<RawDocument> {
    let id = post.id.clone()?;
    let title = post.title.clone()?;

    let url = post
        .permalink
        .as_deref()
        .map_or_else(String::new, |p| format!("https://www.reddit.com{p}"));

    Some(RawDocument {
        platform_source_id: Some(id),
        title,
        content: post.selftext.clone().unwrap_or_default(),
        url,
        author: post.author.clone(),
        upvotes: post.ups.unwrap_or(0),
        comment_count: post.num_comments.unwrap_or(0),
        metadata: serde_json::json!({ "subreddit": post.subreddit }),
        posted_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[allow(clippy::cast_precision_loss)]
    fn sample_post(id: &str, created_at: DateTime<Utc>) -> serde_json::Value {
        serde_json::json!({ "data": {
            "id": id,
            "title": "Somebody make a tool that merges calendars",
            "selftext": "I need a tool that merges calendars across accounts.",
            "permalink": format!("/r/somebodymakethis/comments/{id}/"),
            "author": "tester",
            "subreddit": "somebodymakethis",
            "ups": 15,
            "num_comments": 2,
            "created_utc": created_at.timestamp() as f64,
        }})
    }

    async fn mount_token_endpoint(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "tok" })),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn missing_credentials_is_adapter_failure() {
        let fetcher = RedditFetcher::new(
            reqwest::Client::new(),
            None,
            None,
            "test-agent".to_string(),
            Vec::new(),
        );
        let result = fetcher
            .fetch(FetchWindow {
                hours_back: 24,
                max_results: 10,
            })
            .await;
        assert!(matches!(
            result,
            Err(FetchError::MissingCredentials("reddit"))
        ));
    }

    #[test]
    fn subreddit_path_joins_configured_set() {
        let fetcher = RedditFetcher::new(
            reqwest::Client::new(),
            None,
            None,
            "ua".to_string(),
            vec!["SideProject".to_string(), "productivity".to_string()],
        );
        assert_eq!(fetcher.subreddit_path(), "SideProject+productivity");
    }

    #[test]
    fn subreddit_path_falls_back_to_defaults() {
        let fetcher =
            RedditFetcher::new(reqwest::Client::new(), None, None, "ua".to_string(), vec![]);
        assert_eq!(fetcher.subreddit_path(), "SideProject+somebodymakethis");
    }

    #[test]
    fn listing_json_parses() {
        let json = r#"{
            "data": {
                "children": [
                    { "data": {
                        "id": "abc123",
                        "title": "Somebody make a tool that merges calendars",
                        "selftext": "I need a tool that merges calendars across accounts.",
                        "permalink": "/r/somebodymakethis/comments/abc123/",
                        "author": "tester",
                        "subreddit": "somebodymakethis",
                        "ups": 15,
                        "num_comments": 2,
                        "created_utc": 1700000000.0
                    }}
                ],
                "after": null
            }
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.data.children.len(), 1);
        assert!(listing.data.after.is_none());
    }

    #[test]
    fn post_converts_to_document() {
        let now = Utc::now();
        let post = PostData {
            id: Some("abc".to_string()),
            title: Some("title".to_string()),
            selftext: Some("body".to_string()),
            permalink: Some("/r/test/comments/abc/".to_string()),
            author: Some("tester".to_string()),
            subreddit: Some("test".to_string()),
            ups: Some(3),
            num_comments: Some(1),
            created_utc: Some(1_700_000_000.0),
        };
        let doc = post_to_document(&post, now).unwrap();
        assert_eq!(doc.url, "https://www.reddit.com/r/test/comments/abc/");
        assert_eq!(doc.platform_source_id.as_deref(), Some("abc"));
        assert_eq!(doc.posted_at, now);
    }

    #[test]
    fn post_without_title_is_skipped() {
        let post = PostData {
            id: Some("abc".to_string()),
            title: None,
            selftext: None,
            permalink: None,
            author: None,
            subreddit: None,
            ups: None,
            num_comments: None,
            created_utc: Some(1_700_000_000.0),
        };
        assert!(post_to_document(&post, Utc::now()).is_none());
    }

    #[test]
    fn post_timestamp_missing_is_none() {
        let post = PostData {
            id: Some("abc".to_string()),
            title: Some("title".to_string()),
            selftext: None,
            permalink: None,
            author: None,
            subreddit: None,
            ups: None,
            num_comments: None,
            created_utc: None,
        };
        assert!(post_timestamp(&post).is_none());
    }

    #[tokio::test]
    async fn malformed_post_does_not_stop_pagination() {
        let server = MockServer::start().await;
        let now = Utc::now();
        mount_token_endpoint(&server).await;

        // Page 1 carries a deleted post (timestamp but no id/title)
        // between two valid in-window posts and points at page 2.
        #[allow(clippy::cast_precision_loss)]
        let page1 = serde_json::json!({ "data": {
            "children": [
                sample_post("aaa", now),
                { "data": { "created_utc": now.timestamp() as f64 } },
                sample_post("bbb", now),
            ],
            "after": "t3_bbb",
        }});
        Mock::given(method("GET"))
            .and(path("/r/SideProject/new"))
            .and(query_param_is_missing("after"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page1))
            .mount(&server)
            .await;

        let page2 = serde_json::json!({ "data": {
            "children": [sample_post("ccc", now)],
            "after": null,
        }});
        Mock::given(method("GET"))
            .and(path("/r/SideProject/new"))
            .and(query_param("after", "t3_bbb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page2))
            .mount(&server)
            .await;

        let fetcher = RedditFetcher::with_base_url(
            reqwest::Client::new(),
            Some("id".to_string()),
            Some("secret".to_string()),
            vec!["SideProject".to_string()],
            server.uri(),
        );
        let docs = fetcher
            .fetch(FetchWindow {
                hours_back: 24,
                max_results: 10,
            })
            .await
            .unwrap();

        let ids: Vec<_> = docs
            .iter()
            .filter_map(|d| d.platform_source_id.as_deref())
            .collect();
        assert_eq!(ids, vec!["aaa", "bbb", "ccc"], "page 2 must still be fetched");
    }

    #[tokio::test]
    async fn old_post_stops_pagination() {
        let server = MockServer::start().await;
        let now = Utc::now();
        mount_token_endpoint(&server).await;

        let page1 = serde_json::json!({ "data": {
            "children": [
                sample_post("aaa", now),
                sample_post("old", now - Duration::hours(48)),
            ],
            "after": "t3_old",
        }});
        Mock::given(method("GET"))
            .and(path("/r/SideProject/new"))
            .and(query_param_is_missing("after"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page1))
            .mount(&server)
            .await;

        let fetcher = RedditFetcher::with_base_url(
            reqwest::Client::new(),
            Some("id".to_string()),
            Some("secret".to_string()),
            vec!["SideProject".to_string()],
            server.uri(),
        );
        let docs = fetcher
            .fetch(FetchWindow {
                hours_back: 24,
                max_results: 10,
            })
            .await
            .unwrap();

        // Only the in-window post survives; no page-2 mock exists, so the
        // test also proves the loop stopped after the crossing page.
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].platform_source_id.as_deref(), Some("aaa"));
    }
}
