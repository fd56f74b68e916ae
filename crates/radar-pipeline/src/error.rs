use thiserror::Error;

/// Adapter-level fetch outcome classification.
///
/// `Unsupported` is a soft skip: the platform has no working strategy (e.g.
/// paid API access not configured) and the orchestrator records it as
/// `skipped`, never `failed`. Every other variant is an adapter failure,
/// isolated to its platform.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("missing credentials for {0}")]
    MissingCredentials(&'static str),

    #[error("no fetcher registered for platform '{0}'")]
    UnknownPlatform(String),

    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Db(#[from] radar_db::DbError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
