// External remux collaborator (ffmpeg)
//
// Repackages already-downloaded audio into another container without
// re-encoding. On success the temp input is deleted; on failure it is kept
// on disk so the caller can recover the bytes.

use std::path::Path;
use std::process::Command as StdCommand;

use async_trait::async_trait;
use tokio::process::Command;

use crate::errors::{Error, Result};

/// Trait for the out-of-process remux tool
#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Name of the tool (for logging)
    fn name(&self) -> &'static str;

    /// Repackage `input` into `output` using the requested container
    async fn remux(&self, input: &Path, output: &Path, quiet: bool, container: &str)
        -> Result<()>;
}

/// ffmpeg-based remuxer
pub struct FfmpegRemuxer {
    ffmpeg_path: String,
}

impl FfmpegRemuxer {
    pub fn new() -> Self {
        Self {
            ffmpeg_path: Self::find_ffmpeg(),
        }
    }

    fn find_ffmpeg() -> String {
        let common_paths = [
            "/opt/homebrew/bin/ffmpeg",
            "/usr/local/bin/ffmpeg",
            "/usr/bin/ffmpeg",
        ];

        for path in common_paths {
            if std::path::Path::new(path).exists() {
                return path.to_string();
            }
        }

        if let Ok(output) = StdCommand::new("which").arg("ffmpeg").output() {
            if output.status.success() {
                if let Ok(path) = String::from_utf8(output.stdout) {
                    let trimmed = path.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }

        "ffmpeg".to_string()
    }
}

impl Default for FfmpegRemuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn remux(
        &self,
        input: &Path,
        output: &Path,
        quiet: bool,
        container: &str,
    ) -> Result<()> {
        let mut command = Command::new(&self.ffmpeg_path);
        command.arg("-y");
        if quiet {
            command.args(["-loglevel", "quiet"]);
        }
        command
            .arg("-i")
            .arg(input)
            .args(["-bsf:a", "aac_adtstoasc", "-acodec", "copy", "-vn", "-f"])
            .arg(container)
            .arg(output);

        let result = command
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Remux(format!("failed to run {}: {}", self.ffmpeg_path, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            // temp input intentionally left on disk for caller recovery
            return Err(Error::Remux(format!(
                "{} exited with {}: {}",
                self.name(),
                result.status,
                stderr.trim()
            )));
        }

        tokio::fs::remove_file(input)
            .await
            .map_err(|e| Error::Remux(format!("could not remove temp file: {}", e)))?;
        Ok(())
    }
}
