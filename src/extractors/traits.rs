// InfoExtractor trait and extraction configuration

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::RawVideoInfo;

/// Configuration for one extraction call.
///
/// Typed fields cover the common knobs; `with_option` appends free-form
/// backend options that are merged over the defaults at invocation time.
/// The config is a plain value threaded into each call; there is no shared
/// mutable process-wide default, so concurrent videos never interfere.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Suppress backend warnings/noise
    pub quiet: bool,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Socket timeout in seconds (also bounds the whole invocation)
    pub timeout_seconds: u64,
    /// Free-form backend option overrides, applied in order after the
    /// defaults
    pub options: Vec<(String, String)>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            quiet: true,
            proxy: None,
            timeout_seconds: 30,
            options: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), value.into()));
        self
    }
}

/// Trait for extraction backends: resolve a video id into raw metadata and
/// the ordered raw format list
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Check if this extractor is available on the system
    fn is_available(&self) -> bool;

    /// Extract raw video info with formats
    async fn extract(&self, videoid: &str, config: &ExtractorConfig) -> Result<RawVideoInfo>;
}
