/*!
 * Subtitle rendering collaborators.
 *
 * A `Renderer` takes the source media and the finalized cues and produces a
 * captioned media file, either with the text burned into the picture or
 * with a separate, toggleable subtitle stream.
 */

use async_trait::async_trait;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::errors::RenderError;
use crate::media::{self, ToolRun};
use crate::segment::SubtitleCue;
use crate::subtitle_processor::serialize_subtitle_track;

/// How subtitles end up in the output media
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Drawn into the video frames, always visible
    #[default]
    Burned,
    /// Muxed as a separate subtitle stream
    Soft,
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Burned => write!(f, "burned"),
            RenderMode::Soft => write!(f, "soft"),
        }
    }
}

/// Subtitle renderer interface
#[async_trait]
pub trait Renderer: Send + Sync + Debug {
    /// Produce a captioned copy of `media` and return its path
    async fn render(&self, media: &Path, cues: &[SubtitleCue], mode: RenderMode) -> Result<PathBuf, RenderError>;
}

/// Escape a path for use inside ffmpeg's `subtitles='...'` filter argument
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy().replace(':', "\\:").replace('\'', "\\'")
}

/// Name of the captioned output for a source file
pub fn captioned_file_name(media: &Path, mode: RenderMode) -> String {
    let stem = media
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    match mode {
        RenderMode::Burned => format!("{}_captioned.mp4", stem),
        RenderMode::Soft => format!("{}_captioned_soft.mp4", stem),
    }
}

/// Renderer driving the `ffmpeg` command line tool
#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    output_dir: PathBuf,
    ffmpeg_command: String,
    timeout: Duration,
}

impl FfmpegRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ffmpeg_command: "ffmpeg".to_string(),
            timeout: Duration::from_secs(3600),
        }
    }

    pub fn with_ffmpeg_command(mut self, ffmpeg_command: impl Into<String>) -> Self {
        self.ffmpeg_command = ffmpeg_command.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// ffmpeg arguments for one render
    pub fn build_args(&self, media: &Path, subtitle_path: &Path, output: &Path, mode: RenderMode) -> Vec<String> {
        let media = media.to_string_lossy().to_string();
        let output = output.to_string_lossy().to_string();
        match mode {
            RenderMode::Burned => vec![
                "-y".to_string(),
                "-i".to_string(),
                media,
                "-vf".to_string(),
                format!("subtitles='{}'", escape_filter_path(subtitle_path)),
                "-c:a".to_string(),
                "copy".to_string(),
                output,
            ],
            RenderMode::Soft => vec![
                "-y".to_string(),
                "-i".to_string(),
                media,
                "-i".to_string(),
                subtitle_path.to_string_lossy().to_string(),
                "-c:v".to_string(),
                "copy".to_string(),
                "-c:a".to_string(),
                "copy".to_string(),
                "-c:s".to_string(),
                "mov_text".to_string(),
                output,
            ],
        }
    }
}

#[async_trait]
impl Renderer for FfmpegRenderer {
    async fn render(&self, media: &Path, cues: &[SubtitleCue], mode: RenderMode) -> Result<PathBuf, RenderError> {
        if !media.exists() {
            return Err(RenderError::MediaNotFound(media.display().to_string()));
        }

        std::fs::create_dir_all(&self.output_dir)?;
        let subtitle_file = tempfile::Builder::new().prefix("autocaption").suffix(".srt").tempfile()?;
        std::fs::write(subtitle_file.path(), serialize_subtitle_track(cues))?;

        let output = self.output_dir.join(captioned_file_name(media, mode));
        match mode {
            RenderMode::Burned => info!("🎬 Creating video with burned-in subtitles..."),
            RenderMode::Soft => info!("🎬 Creating video with soft subtitles..."),
        }

        let mut command = Command::new(&self.ffmpeg_command);
        command.args(self.build_args(media, subtitle_file.path(), &output, mode));

        match media::run_with_timeout(&mut command, self.timeout).await {
            ToolRun::Finished(result) if result.status.success() => {
                info!("   → {}", output.display());
                Ok(output)
            }
            ToolRun::Finished(result) => {
                let filtered = media::filter_ffmpeg_stderr(&String::from_utf8_lossy(&result.stderr));
                error!("Rendering failed: {}", filtered);
                Err(RenderError::RendererFailed(filtered))
            }
            ToolRun::LaunchFailed(e) => Err(RenderError::Launch(format!("{}: {}", self.ffmpeg_command, e))),
            ToolRun::TimedOut => Err(RenderError::Timeout(self.timeout.as_secs())),
        }
    }
}
