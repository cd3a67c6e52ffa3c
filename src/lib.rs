//! Resolve a video id into classified, downloadable media streams and fetch
//! them with progress reporting and optional audio remuxing.
//!
//! Extraction, secondary metadata lookup and remuxing are external
//! collaborators behind traits; this crate owns the stream model and the
//! download pipeline.
//!
//! ```no_run
//! use tubefetch::{DownloadOptions, Downloader, Video};
//!
//! # async fn run() -> tubefetch::Result<()> {
//! let mut video = Video::new("dQw4w9WgXcQ");
//! let streams = video.audiostreams().await?;
//! let best = streams
//!     .into_iter()
//!     .max_by_key(|s| s.rawbitrate())
//!     .expect("no audio streams");
//!
//! let path = Downloader::new()
//!     .download(best, DownloadOptions::default(), None)
//!     .await?;
//! println!("saved to {}", path.display());
//! # Ok(())
//! # }
//! ```

mod download;
mod errors;
mod metadata;
mod models;
mod progress;
mod remux;
mod stream;
mod util;
mod video;

pub mod extractors;

pub use download::{generate_filename, Downloader, CHUNK_SIZE, MAX_PATH_LENGTH, TEMP_SUFFIX};
pub use errors::{Error, Result};
pub use extractors::{CliInfoExtractor, ExtractorConfig, InfoExtractor};
pub use metadata::{ApiMetadataProvider, MetadataProvider, Snippet};
pub use models::{DownloadOptions, DownloadProgress, RawFormat, RawVideoInfo, Thumbnail};
pub use progress::{size_done, status_line, ProgressCallback, ProgressUnit};
pub use remux::{FfmpegRemuxer, Remuxer};
pub use stream::{
    MediaKind, Stream, StreamCatalog, AUDIO_CONTAINER_M4A, AUDIO_CONTAINER_OGG,
    MANIFEST_URL_PREFIX,
};
pub use video::{FetchState, InfoCallback, Video, METADATA_LIFESPAN_SECS, NOT_AVAILABLE};
