use async_trait::async_trait;
use log::{debug, error, info};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::errors::TranscriptionError;
use crate::media::{self, ToolRun};
use crate::transcription::{Transcriber, Transcript};

/// Transcriber backed by the `whisper` command line tool
///
/// Audio is first extracted to 16 kHz mono WAV with ffmpeg, then whisper
/// writes `<stem>.json` into a scratch directory that is removed afterwards.
#[derive(Debug, Clone)]
pub struct WhisperCli {
    command: String,
    model: String,
    language: Option<String>,
    ffmpeg_command: String,
    timeout: Duration,
}

impl WhisperCli {
    pub fn new(command: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            model: model.into(),
            language: None,
            ffmpeg_command: "ffmpeg".to_string(),
            timeout: Duration::from_secs(3600),
        }
    }

    /// Force the spoken language instead of letting whisper detect it
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_ffmpeg_command(mut self, ffmpeg_command: impl Into<String>) -> Self {
        self.ffmpeg_command = ffmpeg_command.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Command line arguments for one run
    pub fn build_args(&self, audio: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            audio.to_string_lossy().to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--verbose".to_string(),
            "False".to_string(),
        ];
        if let Some(language) = &self.language {
            args.push("--language".to_string());
            args.push(language.clone());
        }
        args
    }

    fn output_json_path(audio: &Path, output_dir: &Path) -> PathBuf {
        let stem = audio
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        output_dir.join(format!("{}.json", stem))
    }
}

#[async_trait]
impl Transcriber for WhisperCli {
    async fn transcribe(&self, media_path: &Path) -> Result<Transcript, TranscriptionError> {
        if !media_path.exists() {
            return Err(TranscriptionError::MediaNotFound(media_path.display().to_string()));
        }

        let scratch = tempfile::tempdir()
            .map_err(|e| TranscriptionError::Launch(format!("failed to create scratch directory: {}", e)))?;
        let audio_path = scratch.path().join("audio.wav");

        info!("📢 Extracting audio...");
        media::extract_audio(&self.ffmpeg_command, media_path, &audio_path, self.timeout).await?;

        info!("🎙️  Transcribing with Whisper ({})...", self.model);
        let args = self.build_args(&audio_path, scratch.path());
        debug!("Running {} {}", self.command, args.join(" "));

        let mut command = Command::new(&self.command);
        command.args(&args);

        let output = match media::run_with_timeout(&mut command, self.timeout).await {
            ToolRun::Finished(output) => output,
            ToolRun::LaunchFailed(e) => {
                return Err(TranscriptionError::Launch(format!("{}: {}", self.command, e)));
            }
            ToolRun::TimedOut => return Err(TranscriptionError::Timeout(self.timeout.as_secs())),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!("Whisper failed: {}", stderr);
            return Err(TranscriptionError::EngineFailed(stderr));
        }

        let json_path = Self::output_json_path(&audio_path, scratch.path());
        let content = tokio::fs::read_to_string(&json_path).await.map_err(|e| {
            TranscriptionError::ParseError(format!("missing whisper output {}: {}", json_path.display(), e))
        })?;

        let transcript = Transcript::from_whisper_json(&content)?;
        info!(
            "   → Language: {} | Segments: {}",
            transcript.language.as_deref().unwrap_or("??"),
            transcript.segments.len()
        );
        Ok(transcript)
    }
}
