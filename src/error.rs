use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure taxonomy for the pipeline. Fetch, store and render failures are
/// scoped to a single (body, session, category) unit or a single page so
/// the surrounding run can keep going.
#[derive(Error, Debug)]
pub enum Error {
    /// Retries exhausted, or a non-retryable response, for one URL.
    #[error("fetch failed after {attempts} attempt(s) for {url}: {source}")]
    FetchFailed {
        url: String,
        attempts: u32,
        source: reqwest::Error,
    },

    /// No data has been scraped for the requested unit.
    #[error("no data at {}", .path.display())]
    NotFound { path: PathBuf },

    /// The stored JSON for a unit cannot be interpreted.
    #[error("corrupt data at {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// A single page failed to render.
    #[error("failed to render {page}: {source}")]
    Render { page: String, source: askama::Error },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
