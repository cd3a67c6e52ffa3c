// Stream classification and the per-video catalog

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::models::RawFormat;

/// URL prefix identifying a streaming-manifest origin; such URLs are not
/// directly fetchable and get substituted with the fragment base URL
pub const MANIFEST_URL_PREFIX: &str = "https://manifest.googlevideo.com";

/// Container partitioned into its own catalog view
pub const AUDIO_CONTAINER_M4A: &str = "m4a";
/// Container partitioned into its own catalog view
pub const AUDIO_CONTAINER_OGG: &str = "ogg";

/// Media kind of a stream.
///
/// Classification is total and mutually exclusive: every raw descriptor
/// yields exactly one kind. A codec field equal to the literal "none" means
/// the track is absent; a missing codec field counts as present-but-unknown,
/// so descriptors with both fields missing classify as Normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    /// Audio track only
    Audio,
    /// Video track only
    Video,
    /// Muxed audio+video (or both codecs unknown)
    Normal,
}

impl MediaKind {
    pub fn classify(format: &RawFormat) -> Self {
        let audio_absent = format.acodec.as_deref() == Some("none");
        let video_absent = format.vcodec.as_deref() == Some("none");
        match (audio_absent, video_absent) {
            (false, true) => Self::Audio,
            (true, false) => Self::Video,
            _ => Self::Normal,
        }
    }
}

/// One classified, enriched stream derived from a raw format descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stream {
    itag: String,
    mediatype: MediaKind,
    extension: String,
    resolution: String,
    dimensions: (u32, u32),
    rawbitrate: u64,
    bitrate: String,
    quality: String,
    threed: bool,
    notes: String,
    url: String,
    filesize: Option<u64>,
    title: String,
    videoid: String,
}

impl Stream {
    /// Derive a stream from one raw descriptor. `title` and `videoid` come
    /// from the owning video and are carried for filename synthesis.
    pub fn new(format: &RawFormat, title: &str, videoid: &str) -> Self {
        let mediatype = MediaKind::classify(format);

        let width = format.width.unwrap_or(0);
        let height = format.height.unwrap_or(0);
        let resolution = format!("{}x{}", width, height);

        let abr = format.abr.unwrap_or(0.0);
        let rawbitrate = (abr * 1024.0) as u64;
        let bitrate = if abr.fract() == 0.0 {
            format!("{:.0}k", abr)
        } else {
            format!("{}k", abr)
        };

        let quality = if mediatype == MediaKind::Audio {
            bitrate.clone()
        } else {
            resolution.clone()
        };

        let mut url = format.url.clone().unwrap_or_default();
        if url.starts_with(MANIFEST_URL_PREFIX) {
            if let Some(base) = &format.fragment_base_url {
                url = base.clone();
            }
        }

        Self {
            itag: format.format_id.clone(),
            mediatype,
            extension: format.ext.clone(),
            resolution,
            dimensions: (width, height),
            rawbitrate,
            bitrate,
            quality,
            threed: format.format_note.as_deref() == Some("3D"),
            notes: format.format_note.clone().unwrap_or_default(),
            url,
            filesize: format.filesize,
            title: title.to_string(),
            videoid: videoid.to_string(),
        }
    }

    pub fn itag(&self) -> &str {
        &self.itag
    }

    pub fn mediatype(&self) -> MediaKind {
        self.mediatype
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Resolution as "<width>x<height>", 0 substituted for missing sides
    pub fn resolution(&self) -> &str {
        &self.resolution
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Audio bitrate in bytes (kbps x 1024), 0 when unreported
    pub fn rawbitrate(&self) -> u64 {
        self.rawbitrate
    }

    /// Display bitrate, e.g. "160k"
    pub fn bitrate(&self) -> &str {
        &self.bitrate
    }

    /// Display quality: the bitrate for audio streams, the resolution
    /// otherwise
    pub fn quality(&self) -> &str {
        &self.quality
    }

    pub fn threed(&self) -> bool {
        self.threed
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Resolved playable URL (manifest fallback already applied)
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn videoid(&self) -> &str {
        &self.videoid
    }

    /// File size in bytes: the descriptor's cached field when present,
    /// otherwise a HEAD probe of the resolved URL
    pub async fn get_filesize(&self, client: &reqwest::Client) -> Result<u64> {
        if let Some(size) = self.filesize {
            return Ok(size);
        }
        let response = client
            .head(&self.url)
            .send()
            .await
            .map_err(|e| Error::Transfer(format!("filesize probe failed: {}", e)))?;
        response
            .content_length()
            .ok_or_else(|| Error::Transfer("no content length reported".to_string()))
    }

    /// Cached file size without the network fallback
    pub fn cached_filesize(&self) -> Option<u64> {
        self.filesize
    }
}

/// All streams of one video plus derived filtered views.
///
/// Built in a single linear pass over the raw descriptor list; insertion
/// order is preserved in every view (it reflects source preference). No
/// sorting is applied; callers wanting "best quality" bring their own
/// comparator over resolution/bitrate.
#[derive(Debug, Clone, Default)]
pub struct StreamCatalog {
    streams: Vec<Stream>,
    normal: Vec<usize>,
    audio: Vec<usize>,
    video: Vec<usize>,
    m4a: Vec<usize>,
    ogg: Vec<usize>,
}

impl StreamCatalog {
    /// Build the catalog from the ordered raw format list. Deterministic:
    /// rebuilding from the same list yields the same catalog.
    pub fn build(formats: &[RawFormat], title: &str, videoid: &str) -> Self {
        let mut catalog = Self::default();
        for format in formats {
            let stream = Stream::new(format, title, videoid);
            let index = catalog.streams.len();
            match stream.mediatype() {
                MediaKind::Normal => catalog.normal.push(index),
                MediaKind::Audio => catalog.audio.push(index),
                MediaKind::Video => catalog.video.push(index),
            }
            if stream.extension() == AUDIO_CONTAINER_M4A {
                catalog.m4a.push(index);
            }
            if stream.extension() == AUDIO_CONTAINER_OGG {
                catalog.ogg.push(index);
            }
            catalog.streams.push(stream);
        }
        catalog
    }

    fn select(&self, indices: &[usize]) -> Vec<&Stream> {
        indices.iter().map(|&i| &self.streams[i]).collect()
    }

    /// Every stream, in descriptor order
    pub fn allstreams(&self) -> &[Stream] {
        &self.streams
    }

    /// Muxed (normal) streams
    pub fn streams(&self) -> Vec<&Stream> {
        self.select(&self.normal)
    }

    /// Audio-only streams
    pub fn audiostreams(&self) -> Vec<&Stream> {
        self.select(&self.audio)
    }

    /// Video-only streams
    pub fn videostreams(&self) -> Vec<&Stream> {
        self.select(&self.video)
    }

    /// Streams in the m4a container
    pub fn m4astreams(&self) -> Vec<&Stream> {
        self.select(&self.m4a)
    }

    /// Streams in the ogg container
    pub fn oggstreams(&self) -> Vec<&Stream> {
        self.select(&self.ogg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(acodec: Option<&str>, vcodec: Option<&str>) -> RawFormat {
        RawFormat {
            format_id: "22".to_string(),
            ext: "mp4".to_string(),
            acodec: acodec.map(|s| s.to_string()),
            vcodec: vcodec.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_classification_is_total_and_exclusive() {
        // audio codec present, video codec absent
        assert_eq!(
            MediaKind::classify(&descriptor(Some("opus"), Some("none"))),
            MediaKind::Audio
        );
        // video codec present, audio codec absent
        assert_eq!(
            MediaKind::classify(&descriptor(Some("none"), Some("vp9"))),
            MediaKind::Video
        );
        // both present
        assert_eq!(
            MediaKind::classify(&descriptor(Some("mp4a.40.2"), Some("avc1"))),
            MediaKind::Normal
        );
        // both "none"
        assert_eq!(
            MediaKind::classify(&descriptor(Some("none"), Some("none"))),
            MediaKind::Normal
        );
        // both fields missing counts as present-but-unknown
        assert_eq!(MediaKind::classify(&descriptor(None, None)), MediaKind::Normal);
    }

    #[test]
    fn test_video_descriptor_scenario() {
        let format = RawFormat {
            format_id: "248".to_string(),
            ext: "webm".to_string(),
            acodec: Some("none".to_string()),
            vcodec: Some("vp9".to_string()),
            width: Some(1920),
            height: Some(1080),
            ..Default::default()
        };
        let stream = Stream::new(&format, "title", "id");
        assert_eq!(stream.mediatype(), MediaKind::Video);
        assert_eq!(stream.resolution(), "1920x1080");
        assert_eq!(stream.extension(), "webm");
        assert_eq!(stream.quality(), "1920x1080");
    }

    #[test]
    fn test_audio_descriptor_scenario() {
        let format = RawFormat {
            format_id: "251".to_string(),
            ext: "ogg".to_string(),
            acodec: Some("opus".to_string()),
            vcodec: Some("none".to_string()),
            abr: Some(160.0),
            ..Default::default()
        };
        let stream = Stream::new(&format, "title", "id");
        assert_eq!(stream.mediatype(), MediaKind::Audio);
        assert_eq!(stream.bitrate(), "160k");
        assert_eq!(stream.quality(), "160k");
        assert_eq!(stream.rawbitrate(), 160 * 1024);
        assert_eq!(stream.extension(), "ogg");
    }

    #[test]
    fn test_quality_is_bitrate_iff_audio() {
        let audio = Stream::new(&descriptor(Some("opus"), Some("none")), "t", "v");
        assert_eq!(audio.quality(), audio.bitrate());

        let muxed = Stream::new(&descriptor(Some("mp4a"), Some("avc1")), "t", "v");
        assert_eq!(muxed.quality(), muxed.resolution());

        let video = Stream::new(&descriptor(Some("none"), Some("vp9")), "t", "v");
        assert_eq!(video.quality(), video.resolution());
    }

    #[test]
    fn test_resolution_zero_substitution() {
        let stream = Stream::new(&descriptor(Some("mp4a"), Some("avc1")), "t", "v");
        assert_eq!(stream.resolution(), "0x0");
        assert_eq!(stream.dimensions(), (0, 0));
    }

    #[test]
    fn test_threed_flag_from_note() {
        let mut format = descriptor(Some("mp4a"), Some("avc1"));
        format.format_note = Some("3D".to_string());
        assert!(Stream::new(&format, "t", "v").threed());

        format.format_note = Some("1080p".to_string());
        let stream = Stream::new(&format, "t", "v");
        assert!(!stream.threed());
        assert_eq!(stream.notes(), "1080p");
    }

    #[test]
    fn test_manifest_url_fallback() {
        let mut format = descriptor(Some("opus"), Some("none"));
        format.url = Some("https://manifest.googlevideo.com/api/manifest/x".to_string());
        format.fragment_base_url = Some("https://rr1.googlevideo.com/frag".to_string());
        let stream = Stream::new(&format, "t", "v");
        assert_eq!(stream.url(), "https://rr1.googlevideo.com/frag");

        // without a fragment base the manifest URL is kept unchanged
        format.fragment_base_url = None;
        let stream = Stream::new(&format, "t", "v");
        assert_eq!(stream.url(), "https://manifest.googlevideo.com/api/manifest/x");

        // non-manifest URLs are never substituted
        format.url = Some("https://rr2.googlevideo.com/direct".to_string());
        format.fragment_base_url = Some("https://rr1.googlevideo.com/frag".to_string());
        let stream = Stream::new(&format, "t", "v");
        assert_eq!(stream.url(), "https://rr2.googlevideo.com/direct");
    }

    #[test]
    fn test_catalog_partitions_and_order() {
        let formats = vec![
            RawFormat {
                format_id: "18".to_string(),
                ext: "mp4".to_string(),
                acodec: Some("mp4a.40.2".to_string()),
                vcodec: Some("avc1".to_string()),
                ..Default::default()
            },
            RawFormat {
                format_id: "251".to_string(),
                ext: "ogg".to_string(),
                acodec: Some("opus".to_string()),
                vcodec: Some("none".to_string()),
                abr: Some(160.0),
                ..Default::default()
            },
            RawFormat {
                format_id: "140".to_string(),
                ext: "m4a".to_string(),
                acodec: Some("mp4a.40.2".to_string()),
                vcodec: Some("none".to_string()),
                abr: Some(128.0),
                ..Default::default()
            },
            RawFormat {
                format_id: "248".to_string(),
                ext: "webm".to_string(),
                acodec: Some("none".to_string()),
                vcodec: Some("vp9".to_string()),
                width: Some(1920),
                height: Some(1080),
                ..Default::default()
            },
        ];

        let catalog = StreamCatalog::build(&formats, "title", "id");
        assert_eq!(catalog.allstreams().len(), 4);
        assert_eq!(catalog.streams().len(), 1);
        assert_eq!(catalog.audiostreams().len(), 2);
        assert_eq!(catalog.videostreams().len(), 1);
        assert_eq!(catalog.m4astreams().len(), 1);
        assert_eq!(catalog.oggstreams().len(), 1);

        // the opus stream appears in both the audio and the ogg views
        assert_eq!(catalog.oggstreams()[0].itag(), "251");
        assert_eq!(catalog.audiostreams()[0].itag(), "251");

        // descriptor order preserved in the audio view
        assert_eq!(catalog.audiostreams()[1].itag(), "140");
    }

    #[test]
    fn test_catalog_rebuild_is_deterministic() {
        let formats = vec![
            descriptor(Some("opus"), Some("none")),
            descriptor(Some("none"), Some("vp9")),
        ];
        let a = StreamCatalog::build(&formats, "t", "v");
        let b = StreamCatalog::build(&formats, "t", "v");
        assert_eq!(a.allstreams().len(), b.allstreams().len());
        for (x, y) in a.allstreams().iter().zip(b.allstreams()) {
            assert_eq!(x.itag(), y.itag());
            assert_eq!(x.mediatype(), y.mediatype());
            assert_eq!(x.quality(), y.quality());
        }
    }
}
