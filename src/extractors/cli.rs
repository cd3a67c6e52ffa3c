// CLI InfoExtractor - uses the native `yt-dlp` binary
//
// Resolves a video id into raw metadata by invoking yt-dlp with --dump-json
// and deserializing its stdout. Site-specific parsing, authentication and
// bot-detection workarounds all live in the backend, not here.

use std::process::Command as StdCommand;

use async_trait::async_trait;

use super::traits::{ExtractorConfig, InfoExtractor};
use crate::errors::{Error, Result};
use crate::models::RawVideoInfo;
use crate::util::run_output_with_timeout;

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// CLI-based info extractor using the yt-dlp binary
pub struct CliInfoExtractor {
    ytdlp_path: String,
}

impl CliInfoExtractor {
    pub fn new() -> Self {
        Self {
            ytdlp_path: Self::find_ytdlp(),
        }
    }

    /// Find the yt-dlp binary in common install locations, then PATH
    fn find_ytdlp() -> String {
        let common_paths = [
            "/opt/homebrew/bin/yt-dlp",
            "/usr/local/bin/yt-dlp",
            "/usr/bin/yt-dlp",
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "yt-dlp".to_string()
    }

    /// Build the invocation: fixed defaults first, then config overrides in
    /// order, then the watch URL
    fn build_args(videoid: &str, config: &ExtractorConfig) -> Vec<String> {
        let mut args = vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--socket-timeout".to_string(),
            config.timeout_seconds.to_string(),
        ];

        if config.quiet {
            args.push("--no-warnings".to_string());
        }

        if let Some(proxy) = &config.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }

        for (name, value) in &config.options {
            if name.starts_with('-') {
                args.push(name.clone());
            } else {
                args.push(format!("--{}", name));
            }
            if !value.is_empty() {
                args.push(value.clone());
            }
        }

        args.push(format!("{}{}", WATCH_URL, videoid));
        args
    }

    fn parse_output(stdout: &[u8]) -> Result<RawVideoInfo> {
        serde_json::from_slice(stdout).map_err(|e| Error::Parse(format!("invalid JSON: {}", e)))
    }
}

impl Default for CliInfoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InfoExtractor for CliInfoExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    fn is_available(&self) -> bool {
        match StdCommand::new(&self.ytdlp_path).arg("--version").output() {
            Ok(out) => out.status.success(),
            Err(_) => false,
        }
    }

    async fn extract(&self, videoid: &str, config: &ExtractorConfig) -> Result<RawVideoInfo> {
        let args = Self::build_args(videoid, config);

        let output = run_output_with_timeout(&self.ytdlp_path, &args, config.timeout_seconds)
            .await
            .map_err(Error::Resolution)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eprintln!("[CliExtractor] extraction failed for {}: {}", videoid, stderr.trim());
            return Err(Error::Resolution(stderr.trim().to_string()));
        }

        Self::parse_output(&output.stdout)
    }
}
