// Chunked download pipeline with progress instrumentation
//
// Fetches a stream's resolved URL in bounded ranged chunks, writing
// sequentially to the target file and reporting progress between chunk
// writes. Failures leave the partial file on disk: the posture is
// resume-friendly and retry policy belongs to the caller.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::Instant;

use lazy_static::lazy_static;
use regex::Regex;
use tokio::io::AsyncWriteExt;

use crate::errors::{Error, Result};
use crate::models::{DownloadOptions, DownloadProgress};
use crate::progress::{size_done, status_line, ProgressCallback};
use crate::remux::{FfmpegRemuxer, Remuxer};
use crate::stream::{MediaKind, Stream};

/// Transfer chunk size: 10 MiB
pub const CHUNK_SIZE: u64 = 10 * 1024 * 1024;

/// Suffix reserved for in-progress temp files; filename synthesis keeps the
/// total path length within MAX_PATH_LENGTH even after appending it
pub const TEMP_SUFFIX: &str = ".temp";

/// Maximum length of a synthesized target path, including the temp suffix
pub const MAX_PATH_LENGTH: usize = 256;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r#"[\\/?*"><:|]"#).unwrap();
}

/// Build a filesystem-safe filename from a video title.
///
/// Deterministic in its inputs; the result never exceeds `max_length`
/// characters, for any title or extension.
pub fn generate_filename(
    title: &str,
    extension: &str,
    videoid: &str,
    include_id: bool,
    max_length: usize,
) -> String {
    let safe = UNSAFE_CHARS.replace_all(title, "");
    let safe = safe.trim();

    let suffix = if include_id {
        format!(" - {}.{}", videoid, extension)
    } else {
        format!(".{}", extension)
    };

    let budget = max_length.saturating_sub(suffix.chars().count());
    let stem: String = safe.chars().take(budget).collect();

    let name = format!("{}{}", stem.trim_end(), suffix);
    name.chars().take(max_length).collect()
}

/// Inclusive byte ranges covering `total` bytes in `chunk`-sized pieces
fn chunk_spans(total: u64, chunk: u64) -> Vec<(u64, u64)> {
    let mut spans = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + chunk - 1).min(total - 1);
        spans.push((start, end));
        start = end + 1;
    }
    spans
}

/// Remux runs only when a container was requested and the stream is
/// audio-only; video and muxed streams never trigger it
fn wants_remux(stream: &Stream, options: &DownloadOptions) -> bool {
    options.remux_audio.is_some() && stream.mediatype() == MediaKind::Audio
}

/// Resolve the target path: an existing directory gets a synthesized
/// filename inside it, an explicit file path is used verbatim, and no path
/// synthesizes a filename in the current directory
fn resolve_target(stream: &Stream, options: &DownloadOptions) -> PathBuf {
    let max_length = MAX_PATH_LENGTH - TEMP_SUFFIX.len();
    let synthesized = || {
        generate_filename(
            stream.title(),
            stream.extension(),
            stream.videoid(),
            options.include_id,
            max_length,
        )
    };

    match &options.filepath {
        Some(path) if path.is_dir() => path.join(synthesized()),
        Some(path) => path.clone(),
        None => PathBuf::from(synthesized()),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(TEMP_SUFFIX);
    PathBuf::from(os)
}

fn transfer_err(e: impl std::fmt::Display) -> Error {
    Error::Transfer(e.to_string())
}

/// Downloads a stream to disk, driving progress reporting and the optional
/// remux hand-off. Holds no per-download state; one instance can serve many
/// sequential downloads.
pub struct Downloader {
    client: reqwest::Client,
    remuxer: Box<dyn Remuxer>,
}

impl Downloader {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            remuxer: Box::new(FfmpegRemuxer::new()),
        }
    }

    /// Use a preconfigured HTTP client (proxies, timeouts)
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Substitute the remux collaborator
    pub fn with_remuxer(mut self, remuxer: Box<dyn Remuxer>) -> Self {
        self.remuxer = remuxer;
        self
    }

    /// Download `stream` per `options`, blocking the caller for the whole
    /// transfer. The callback, when supplied, runs synchronously on this
    /// call stack between chunk writes. Returns the final file path.
    pub async fn download(
        &self,
        stream: &Stream,
        options: DownloadOptions,
        callback: Option<&ProgressCallback>,
    ) -> Result<PathBuf> {
        let filepath = resolve_target(stream, &options);

        // Two-tier size lookup: cached descriptor field, else HEAD probe.
        // An unknown total degrades to an unranged transfer with reporting
        // suppressed.
        let total = stream.get_filesize(&self.client).await.ok();

        self.transfer(stream.url(), &filepath, total, &options, callback)
            .await?;

        if !options.quiet {
            println!();
        }

        if wants_remux(stream, &options) {
            // remux_audio checked by wants_remux
            let container = options.remux_audio.as_deref().unwrap_or_default();
            let temp = temp_path(&filepath);
            tokio::fs::rename(&filepath, &temp)
                .await
                .map_err(transfer_err)?;
            self.remuxer
                .remux(&temp, &filepath, options.quiet, container)
                .await?;
        }

        Ok(filepath)
    }

    async fn transfer(
        &self,
        url: &str,
        filepath: &Path,
        total: Option<u64>,
        options: &DownloadOptions,
        callback: Option<&ProgressCallback>,
    ) -> Result<()> {
        let mut file = tokio::fs::File::create(filepath)
            .await
            .map_err(transfer_err)?;
        let started = Instant::now();
        let mut bytes_done: u64 = 0;

        match total {
            Some(total) if total > 0 => {
                for (start, end) in chunk_spans(total, CHUNK_SIZE) {
                    let mut response = self
                        .client
                        .get(url)
                        .header(reqwest::header::RANGE, format!("bytes={}-{}", start, end))
                        .send()
                        .await
                        .map_err(transfer_err)?
                        .error_for_status()
                        .map_err(transfer_err)?;

                    // a 200 here means the server ignored the range and is
                    // sending the whole resource; writing it would corrupt
                    // the file
                    if response.status() != reqwest::StatusCode::PARTIAL_CONTENT {
                        return Err(Error::Transfer(format!(
                            "server ignored range request bytes={}-{} (got {})",
                            start,
                            end,
                            response.status()
                        )));
                    }

                    let mut span_done: u64 = 0;
                    while let Some(chunk) = response.chunk().await.map_err(transfer_err)? {
                        file.write_all(&chunk).await.map_err(transfer_err)?;
                        span_done += chunk.len() as u64;
                        bytes_done += chunk.len() as u64;
                        report(total, bytes_done, &started, options, callback);
                    }

                    let expected = end - start + 1;
                    if span_done != expected {
                        return Err(Error::Transfer(format!(
                            "range bytes={}-{} returned {} bytes, expected {}",
                            start, end, span_done, expected
                        )));
                    }
                }
            }
            _ => {
                // total unknown or zero: no percentage is computable, so
                // every update is skipped rather than dividing by zero
                let mut response = self
                    .client
                    .get(url)
                    .send()
                    .await
                    .map_err(transfer_err)?
                    .error_for_status()
                    .map_err(transfer_err)?;

                while let Some(chunk) = response.chunk().await.map_err(transfer_err)? {
                    file.write_all(&chunk).await.map_err(transfer_err)?;
                }
            }
        }

        file.flush().await.map_err(transfer_err)?;
        Ok(())
    }
}

impl Default for Downloader {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot the transfer state: rate from overall elapsed time, ETA from the
/// remaining bytes at that rate (both 0 when not yet computable)
fn snapshot(total: u64, bytes_done: u64, started: &Instant) -> DownloadProgress {
    let elapsed = started.elapsed().as_secs_f64();
    let rate = if elapsed > 0.0 {
        bytes_done as f64 / elapsed
    } else {
        0.0
    };
    let eta = if rate > 0.0 {
        ((total.saturating_sub(bytes_done)) as f64 / rate).round() as u64
    } else {
        0
    };
    DownloadProgress {
        bytes_done,
        total: Some(total),
        rate,
        eta,
    }
}

/// One progress update: emit the stdout line unless quiet, and invoke the
/// callback with the raw numeric tuple
fn report(
    total: u64,
    bytes_done: u64,
    started: &Instant,
    options: &DownloadOptions,
    callback: Option<&ProgressCallback>,
) {
    let progress = snapshot(total, bytes_done, started);
    let done = size_done(progress.bytes_done, options.progress);
    let fraction = progress.bytes_done as f64 / total as f64;

    if !options.quiet {
        let status = status_line(options.progress, done, fraction, progress.rate, progress.eta);
        // overwrite the same terminal line; trailing spaces erase longer
        // previous text
        print!("\r{}    \r", status);
        let _ = io::stdout().flush();
    }

    if let Some(callback) = callback {
        callback(total, done, fraction, progress.rate, progress.eta);
    }
}
