/*!
 * Stub engines for pipeline tests
 */

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use autocaption::errors::{RenderError, TranscriptionError};
use autocaption::renderer::{RenderMode, Renderer, captioned_file_name};
use autocaption::segment::{SubtitleCue, TranscriptSegment};
use autocaption::transcription::{Transcriber, Transcript};

/// Returns the same transcript for every input
#[derive(Debug)]
pub struct StubTranscriber {
    transcript: Transcript,
}

impl StubTranscriber {
    pub fn new(language: Option<&str>, segments: Vec<TranscriptSegment>) -> Self {
        Self {
            transcript: Transcript {
                language: language.map(str::to_string),
                segments,
            },
        }
    }
}

#[async_trait]
impl Transcriber for StubTranscriber {
    async fn transcribe(&self, media: &Path) -> Result<Transcript, TranscriptionError> {
        if media.as_os_str().is_empty() {
            return Err(TranscriptionError::MediaNotFound("empty media path".to_string()));
        }
        Ok(self.transcript.clone())
    }
}

/// Records every render request instead of invoking ffmpeg
#[derive(Debug)]
pub struct RecordingRenderer {
    output_dir: PathBuf,
    calls: Mutex<Vec<(PathBuf, usize, RenderMode)>>,
}

impl RecordingRenderer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// (media, cue count, mode) of each call
    pub fn calls(&self) -> Vec<(PathBuf, usize, RenderMode)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn render(&self, media: &Path, cues: &[SubtitleCue], mode: RenderMode) -> Result<PathBuf, RenderError> {
        self.calls.lock().unwrap().push((media.to_path_buf(), cues.len(), mode));
        Ok(self.output_dir.join(captioned_file_name(media, mode)))
    }
}

/// Fails every render request like a crashing ffmpeg
#[derive(Debug)]
pub struct FailingRenderer;

#[async_trait]
impl Renderer for FailingRenderer {
    async fn render(&self, _media: &Path, _cues: &[SubtitleCue], _mode: RenderMode) -> Result<PathBuf, RenderError> {
        Err(RenderError::RendererFailed("encoder exited with status 1".to_string()))
    }
}
