// Video facade with lazy metadata population

use std::collections::HashMap;

use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use crate::errors::{Error, Result};
use crate::extractors::{CliInfoExtractor, ExtractorConfig, InfoExtractor};
use crate::metadata::{ApiMetadataProvider, MetadataProvider};
use crate::models::{RawFormat, RawVideoInfo};
use crate::stream::{Stream, StreamCatalog};

/// How long fetched metadata is considered fresh. Informational only: expiry
/// is stamped but never enforced, there is no background refresh.
pub const METADATA_LIFESPAN_SECS: i64 = 60 * 60 * 5;

/// Sentinel for optional textual fields the backend did not report
pub const NOT_AVAILABLE: &str = "NA";

/// Optional informational callback, invoked after a successful basic fetch
pub type InfoCallback = dyn Fn(&str) + Send + Sync;

/// Lazy-population state of a video handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchState {
    /// Nothing fetched yet
    #[default]
    Unresolved,
    /// Basic metadata and formats cached
    BasicReady,
    /// Basic plus secondary metadata cached
    FullyReady,
}

/// Facade over one remote video: owns cached metadata and the stream
/// catalog, populated on demand through the extraction backend and the
/// secondary metadata provider. Each instance is independent; nothing is
/// shared across handles.
pub struct Video {
    videoid: String,
    state: FetchState,
    config: ExtractorConfig,
    extractor: Box<dyn InfoExtractor>,
    provider: Box<dyn MetadataProvider>,
    callback: Option<Box<InfoCallback>>,

    title: String,
    author: String,
    rating: Option<f64>,
    length: u64,
    viewcount: u64,
    likes: u64,
    username: String,
    subtitles: HashMap<String, serde_json::Value>,
    category: String,
    bestthumb: String,
    bigthumb: String,
    bigthumbhd: String,
    expiry: OffsetDateTime,

    published: OffsetDateTime,
    description: String,
    keywords: Vec<String>,

    formats: Vec<RawFormat>,
    catalog: Option<StreamCatalog>,
}

impl Video {
    /// Create an empty handle with the default collaborators. Nothing is
    /// fetched until an accessor needs it.
    pub fn new(videoid: impl Into<String>) -> Self {
        Self::with_collaborators(
            videoid,
            Box::new(CliInfoExtractor::new()),
            Box::new(ApiMetadataProvider::default()),
        )
    }

    /// Create a handle with explicit collaborators (used for alternative
    /// backends and in tests)
    pub fn with_collaborators(
        videoid: impl Into<String>,
        extractor: Box<dyn InfoExtractor>,
        provider: Box<dyn MetadataProvider>,
    ) -> Self {
        Self {
            videoid: videoid.into(),
            state: FetchState::default(),
            config: ExtractorConfig::default(),
            extractor,
            provider,
            callback: None,
            title: String::new(),
            author: String::new(),
            rating: None,
            length: 0,
            viewcount: 0,
            likes: 0,
            username: String::new(),
            subtitles: HashMap::new(),
            category: String::new(),
            bestthumb: String::new(),
            bigthumb: String::new(),
            bigthumbhd: String::new(),
            expiry: OffsetDateTime::UNIX_EPOCH,
            published: OffsetDateTime::UNIX_EPOCH,
            description: String::new(),
            keywords: Vec::new(),
            formats: Vec::new(),
            catalog: None,
        }
    }

    /// Override the extraction configuration for this handle
    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach an informational callback fired after the basic fetch
    pub fn with_callback(mut self, callback: Box<InfoCallback>) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn videoid(&self) -> &str {
        &self.videoid
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// Fetch basic metadata and the raw format list if not already cached.
    ///
    /// Optional fields absent from the backend result get defined defaults
    /// (title/author "NA", rating None, duration/likes 0); view count and
    /// uploader id are required and their absence is a `MissingField` error.
    pub async fn ensure_basic(&mut self) -> Result<()> {
        if self.state != FetchState::Unresolved {
            return Ok(());
        }

        let info = self
            .extractor
            .extract(&self.videoid, &self.config)
            .await
            .map_err(|e| match e {
                // fixed phrasing substitution applied to backend messages
                Error::Resolution(msg) => {
                    Error::Resolution(msg.replace("YouTube said", "Youtube says"))
                }
                other => other,
            })?;

        self.populate_basic(info)?;
        self.state = FetchState::BasicReady;

        if let Some(callback) = &self.callback {
            callback("Fetched video info");
        }
        Ok(())
    }

    fn populate_basic(&mut self, info: RawVideoInfo) -> Result<()> {
        self.viewcount = info.view_count.ok_or(Error::MissingField("view_count"))?;
        self.username = info.uploader_id.ok_or(Error::MissingField("uploader_id"))?;

        self.title = info.title.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        self.author = info.uploader.unwrap_or_else(|| NOT_AVAILABLE.to_string());
        self.rating = info.average_rating;
        self.length = info.duration.unwrap_or(0.0) as u64;
        self.likes = info.like_count.unwrap_or(0);
        self.subtitles = info.subtitles;
        self.category = info.categories.first().cloned().unwrap_or_default();
        self.bestthumb = info
            .thumbnails
            .first()
            .map(|t| t.url.clone())
            .unwrap_or_default();
        self.bigthumb = format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", self.videoid);
        self.bigthumbhd = format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.videoid);
        self.expiry = OffsetDateTime::now_utc() + Duration::seconds(METADATA_LIFESPAN_SECS);
        self.formats = info.formats;
        Ok(())
    }

    /// Fetch secondary metadata (publish date, description, tags) if not
    /// already cached. Ensures basic metadata first, so the state machine is
    /// strictly Unresolved -> BasicReady -> FullyReady.
    pub async fn ensure_secondary(&mut self) -> Result<()> {
        if self.state == FetchState::FullyReady {
            return Ok(());
        }
        self.ensure_basic().await?;

        let snippet = self.provider.lookup(&self.videoid).await?;
        self.published = OffsetDateTime::parse(&snippet.published_at, &Rfc3339)
            .map_err(|e| Error::Parse(format!("bad publish timestamp: {}", e)))?;
        self.description = snippet.description;
        self.keywords = snippet.tags;
        self.state = FetchState::FullyReady;
        Ok(())
    }

    fn built_catalog(&mut self) -> Result<&StreamCatalog> {
        if self.catalog.is_none() {
            self.catalog = Some(StreamCatalog::build(
                &self.formats,
                &self.title,
                &self.videoid,
            ));
        }
        match &self.catalog {
            Some(catalog) => Ok(catalog),
            None => Err(Error::Resolution("stream catalog unavailable".to_string())),
        }
    }

    /// The full stream catalog, built once from the raw format list
    pub async fn catalog(&mut self) -> Result<&StreamCatalog> {
        self.ensure_basic().await?;
        self.built_catalog()
    }

    /// Every stream, in backend order
    pub async fn allstreams(&mut self) -> Result<&[Stream]> {
        Ok(self.catalog().await?.allstreams())
    }

    /// Muxed (normal) streams
    pub async fn streams(&mut self) -> Result<Vec<&Stream>> {
        Ok(self.catalog().await?.streams())
    }

    /// Audio-only streams
    pub async fn audiostreams(&mut self) -> Result<Vec<&Stream>> {
        Ok(self.catalog().await?.audiostreams())
    }

    /// Video-only streams
    pub async fn videostreams(&mut self) -> Result<Vec<&Stream>> {
        Ok(self.catalog().await?.videostreams())
    }

    /// Streams in the m4a container
    pub async fn m4astreams(&mut self) -> Result<Vec<&Stream>> {
        Ok(self.catalog().await?.m4astreams())
    }

    /// Streams in the ogg container
    pub async fn oggstreams(&mut self) -> Result<Vec<&Stream>> {
        Ok(self.catalog().await?.oggstreams())
    }

    pub async fn title(&mut self) -> Result<&str> {
        self.ensure_basic().await?;
        Ok(&self.title)
    }

    pub async fn author(&mut self) -> Result<&str> {
        self.ensure_basic().await?;
        Ok(&self.author)
    }

    /// Average rating; None when the backend does not report one
    pub async fn rating(&mut self) -> Result<Option<f64>> {
        self.ensure_basic().await?;
        Ok(self.rating)
    }

    /// Duration in seconds (0 when unreported)
    pub async fn length(&mut self) -> Result<u64> {
        self.ensure_basic().await?;
        Ok(self.length)
    }

    pub async fn viewcount(&mut self) -> Result<u64> {
        self.ensure_basic().await?;
        Ok(self.viewcount)
    }

    pub async fn likes(&mut self) -> Result<u64> {
        self.ensure_basic().await?;
        Ok(self.likes)
    }

    /// Uploader id
    pub async fn username(&mut self) -> Result<&str> {
        self.ensure_basic().await?;
        Ok(&self.username)
    }

    /// Subtitle availability keyed by language code
    pub async fn subtitles(&mut self) -> Result<&HashMap<String, serde_json::Value>> {
        self.ensure_basic().await?;
        Ok(&self.subtitles)
    }

    /// First category, possibly empty
    pub async fn category(&mut self) -> Result<&str> {
        self.ensure_basic().await?;
        Ok(&self.category)
    }

    /// Best thumbnail URL as reported by the backend
    pub async fn bestthumb(&mut self) -> Result<&str> {
        self.ensure_basic().await?;
        Ok(&self.bestthumb)
    }

    /// Medium-quality thumbnail URL, derived from the id without a network
    /// call
    pub fn bigthumb(&self) -> String {
        format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", self.videoid)
    }

    /// High-quality thumbnail URL, derived from the id without a network
    /// call
    pub fn bigthumbhd(&self) -> String {
        format!("https://i.ytimg.com/vi/{}/hqdefault.jpg", self.videoid)
    }

    /// When the cached metadata goes stale (informational)
    pub async fn expiry(&mut self) -> Result<OffsetDateTime> {
        self.ensure_basic().await?;
        Ok(self.expiry)
    }

    pub async fn published(&mut self) -> Result<OffsetDateTime> {
        self.ensure_secondary().await?;
        Ok(self.published)
    }

    pub async fn description(&mut self) -> Result<&str> {
        self.ensure_secondary().await?;
        Ok(&self.description)
    }

    /// Keyword tags, possibly empty
    pub async fn keywords(&mut self) -> Result<&[String]> {
        self.ensure_secondary().await?;
        Ok(&self.keywords)
    }
}
