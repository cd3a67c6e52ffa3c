// Secondary metadata lookup (publish date, description, tags)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Endpoint for the auxiliary snippet lookup
pub const GDATA_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// Secondary metadata for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    #[serde(rename = "publishedAt")]
    pub published_at: String,
    #[serde(default)]
    pub description: String,
    /// Keyword tags; some videos have no tags object at all
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GdataItem {
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
struct GdataResponse {
    #[serde(default)]
    items: Vec<GdataItem>,
}

/// The items list is required; the tags field inside a snippet is optional.
/// This asymmetry is deliberate and preserved from the original behavior.
fn first_snippet(response: GdataResponse, videoid: &str) -> Result<Snippet> {
    response
        .items
        .into_iter()
        .next()
        .map(|item| item.snippet)
        .ok_or_else(|| Error::Resolution(format!("no metadata item for video {}", videoid)))
}

/// Trait for secondary metadata providers
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn lookup(&self, videoid: &str) -> Result<Snippet>;
}

/// Provider backed by the YouTube Data API v3 snippet endpoint
pub struct ApiMetadataProvider {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl ApiMetadataProvider {
    /// Use the given API key, or fall back to the YOUTUBE_API_KEY env var
    pub fn new(api_key: Option<String>) -> Self {
        let api_key = api_key.or_else(|| std::env::var("YOUTUBE_API_KEY").ok());
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

impl Default for ApiMetadataProvider {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl MetadataProvider for ApiMetadataProvider {
    async fn lookup(&self, videoid: &str) -> Result<Snippet> {
        let key = self.api_key.as_deref().ok_or_else(|| {
            Error::Resolution("no API key configured (set YOUTUBE_API_KEY)".to_string())
        })?;

        let response: GdataResponse = self
            .client
            .get(GDATA_URL)
            .query(&[("part", "snippet"), ("id", videoid), ("key", key)])
            .send()
            .await
            .map_err(|e| Error::Resolution(format!("metadata lookup failed: {}", e)))?
            .json()
            .await
            .map_err(|e| Error::Parse(format!("bad metadata response: {}", e)))?;

        first_snippet(response, videoid)
    }
}
