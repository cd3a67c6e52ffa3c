// Wire models shared across extraction and download

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::progress::ProgressUnit;

/// One raw format descriptor as reported by the extraction backend.
///
/// Every field except the format tag and the container may be absent;
/// classification and quality derivation handle the gaps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFormat {
    /// Format tag, unique within one video's format list (e.g., "137", "251")
    pub format_id: String,
    /// Container / file extension (mp4, webm, m4a, ogg)
    pub ext: String,
    /// Audio codec ("none" when the format carries no audio)
    #[serde(default)]
    pub acodec: Option<String>,
    /// Video codec ("none" when the format carries no video)
    #[serde(default)]
    pub vcodec: Option<String>,
    /// Audio bitrate in kbps
    #[serde(default)]
    pub abr: Option<f64>,
    /// Video width in pixels
    #[serde(default)]
    pub width: Option<u32>,
    /// Video height in pixels
    #[serde(default)]
    pub height: Option<u32>,
    /// Exact file size in bytes, when the backend knows it
    #[serde(default)]
    pub filesize: Option<u64>,
    /// Freeform note (e.g., "1080p", "3D", "tiny")
    #[serde(default)]
    pub format_note: Option<String>,
    /// Resolved playable URL
    #[serde(default)]
    pub url: Option<String>,
    /// Base URL substituted when `url` points at a streaming manifest
    #[serde(default)]
    pub fragment_base_url: Option<String>,
}

/// Thumbnail entry from the extraction backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thumbnail {
    #[serde(default)]
    pub url: String,
}

/// Full extraction result: structured metadata plus the ordered format list.
///
/// Optional fields here follow the defaults table in `Video::ensure_basic`;
/// `view_count` and `uploader_id` are required and their absence is reported
/// as `Error::MissingField` rather than defaulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawVideoInfo {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub uploader_id: Option<String>,
    /// Subtitle availability keyed by language code
    #[serde(default)]
    pub subtitles: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
    /// Raw format descriptors in backend order (order reflects source
    /// preference and is preserved by the catalog)
    #[serde(default)]
    pub formats: Vec<RawFormat>,
}

/// Options for one download call
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Target file path or existing directory; None synthesizes a filename
    /// from the video title in the current directory
    pub filepath: Option<PathBuf>,
    /// Suppress the stdout progress line
    pub quiet: bool,
    /// Display unit for the bytes-done figure
    pub progress: ProgressUnit,
    /// Remux container requested for audio streams (e.g., "mp4", "ogg").
    /// Ignored for video and muxed streams.
    pub remux_audio: Option<String>,
    /// Embed the video id in synthesized filenames
    pub include_id: bool,
}

/// One transient progress snapshot during a transfer
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DownloadProgress {
    /// Bytes written so far
    pub bytes_done: u64,
    /// Total transfer size, when known
    pub total: Option<u64>,
    /// Instantaneous rate in bytes/sec, 0.0 when unavailable
    pub rate: f64,
    /// Estimated seconds remaining, 0 when unavailable
    pub eta: u64,
}
