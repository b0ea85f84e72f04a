use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::file_utils::{FileManager, FileType};
use crate::grammar::GrammarRealigner;
use crate::grammar::languagetool::LanguageTool;
use crate::language_utils;
use crate::media;
use crate::pipeline::Pipeline;
use crate::renderer::FfmpegRenderer;
use crate::transcription::{JsonTranscript, Transcriber, WhisperCli};

// @module: Application controller for the captioning workflow

/// Availability of the external tools
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyReport {
    /// ffmpeg can be started (required)
    pub ffmpeg: bool,
    /// whisper can be started (required)
    pub whisper: bool,
    /// The LanguageTool server answers (optional)
    pub languagetool: bool,
}

impl DependencyReport {
    /// True when every required tool is present
    pub fn required_ok(&self) -> bool {
        self.ffmpeg && self.whisper
    }
}

/// Main application controller for subtitle generation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Probe ffmpeg, whisper and the LanguageTool server
    pub async fn check_dependencies(&self) -> DependencyReport {
        let ffmpeg = media::probe_tool(&self.config.render.ffmpeg_command, "-version").await;
        if ffmpeg {
            info!("✅ FFmpeg found");
        } else {
            error!("FFmpeg not found ({}). Install it and make sure it is on PATH", self.config.render.ffmpeg_command);
        }

        let whisper = media::probe_tool(&self.config.transcription.command, "--help").await;
        if whisper {
            info!("✅ Whisper found");
        } else {
            error!(
                "Whisper not found ({}). Install with: pip install openai-whisper",
                self.config.transcription.command
            );
        }

        let languagetool = self.connect_languagetool("en-US").await.is_some();
        if languagetool {
            info!("✅ LanguageTool reachable at {}", self.config.grammar.endpoint);
        } else {
            warn!(
                "LanguageTool not reachable at {}: grammar correction will be skipped",
                self.config.grammar.endpoint
            );
        }

        DependencyReport { ffmpeg, whisper, languagetool }
    }

    /// Build a LanguageTool client and check that the server answers
    async fn connect_languagetool(&self, language: &str) -> Option<LanguageTool> {
        let grammar = &self.config.grammar;
        let client = match LanguageTool::new(&grammar.endpoint, language, Duration::from_secs(grammar.timeout_secs)) {
            Ok(client) => client.with_retries(grammar.max_retries, grammar.retry_backoff_ms),
            Err(e) => {
                warn!("⚠ LanguageTool unavailable: {}", e);
                return None;
            }
        };

        match client.test_connection().await {
            Ok(()) => Some(client),
            Err(e) => {
                debug!("LanguageTool connection test failed: {}", e);
                None
            }
        }
    }

    /// Grammar realigner for the transcript language, if correction is possible
    async fn build_realigner(&self, language: Option<&str>) -> Option<GrammarRealigner> {
        if !self.config.grammar.enabled {
            return None;
        }

        let code = match &self.config.grammar.language {
            Some(code) => code.clone(),
            None => language_utils::languagetool_code(language),
        };

        match self.connect_languagetool(&code).await {
            Some(client) => {
                info!("✏️  Grammar correction enabled ({})", code);
                Some(
                    GrammarRealigner::new(Arc::new(client))
                        .with_max_concurrent(self.config.grammar.concurrent_requests)
                        .with_call_timeout(Duration::from_secs(self.config.grammar.timeout_secs)),
                )
            }
            None => {
                warn!("⚠ LanguageTool unavailable, continuing without grammar correction");
                None
            }
        }
    }

    fn progress_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    /// Run the main workflow for one input file
    pub async fn run(&self, input_file: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<()> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, &output_dir, &multi_progress, force_overwrite).await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output_dir: &Path,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !input_file.exists() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        FileManager::ensure_dir(output_dir)?;

        let outputs = FileManager::output_paths(input_file, output_dir);
        if outputs.subtitle.exists() && !force_overwrite {
            warn!(
                "Skipping {}, subtitles already exist (use -f to force overwrite)",
                input_file.display()
            );
            return Ok(());
        }

        let file_type = FileManager::detect_file_type(input_file)?;
        let transcriber: Arc<dyn Transcriber> = match file_type {
            FileType::Video | FileType::Audio => Arc::new(
                WhisperCli::new(&self.config.transcription.command, &self.config.transcription.model)
                    .with_language(self.config.transcription.language.clone())
                    .with_ffmpeg_command(&self.config.render.ffmpeg_command)
                    .with_timeout(Duration::from_secs(self.config.transcription.timeout_secs)),
            ),
            FileType::Transcript => {
                info!("Detected transcript file, skipping transcription");
                Arc::new(JsonTranscript)
            }
            FileType::Unknown => return Err(anyhow!("Unsupported input file: {:?}", input_file)),
        };

        info!("🎬 Processing: {}", input_file.display());
        let transcript = transcriber
            .transcribe(input_file)
            .await
            .with_context(|| format!("Failed to transcribe {}", input_file.display()))?;

        let language = self
            .config
            .transcription
            .language
            .clone()
            .or_else(|| transcript.language.clone());

        let mut pipeline = Pipeline::new(transcriber, self.config.compiler.clone());

        let progress_bar = multi_progress.add(ProgressBar::new(transcript.segments.len() as u64));
        progress_bar.set_style(Self::progress_style("segments"));
        progress_bar.set_message("Correcting");

        if let Some(realigner) = self.build_realigner(language.as_deref()).await {
            let pb = progress_bar.clone();
            pipeline = pipeline
                .with_realigner(realigner)
                .with_correction_progress(Arc::new(move |completed: usize, _total: usize| pb.set_position(completed as u64)));
        } else {
            progress_bar.finish_and_clear();
        }

        if file_type == FileType::Video && self.config.render.enabled {
            pipeline = pipeline.with_renderer(Arc::new(
                FfmpegRenderer::new(output_dir)
                    .with_ffmpeg_command(&self.config.render.ffmpeg_command)
                    .with_timeout(Duration::from_secs(self.config.render.timeout_secs)),
            ));
        }

        let result = pipeline.process(input_file, transcript, self.config.render.mode).await;
        progress_bar.finish_and_clear();
        let output = result?;

        info!("💾 Saving subtitles...");
        FileManager::write_to_file(&outputs.subtitle, &output.subtitle_track)?;
        info!("   → {}", outputs.subtitle.display());
        FileManager::write_to_file(&outputs.transcript, &output.transcript)?;
        info!("   → {}", outputs.transcript.display());

        if let Some(rendered) = &output.rendered {
            info!("🎞️  Captioned video: {}", rendered.display());
        }

        info!(
            "✅ Done: {} cues in {}",
            output.cues.len(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(())
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }

    /// Where the outputs of one file found by `run_folder` are written
    ///
    /// Without an explicit output directory they go next to the file.
    /// Otherwise the file's location below `input_dir` is mirrored inside
    /// `output_dir`, so equally named files in different folders do not collide.
    pub fn folder_output_dir(media_file: &Path, input_dir: &Path, output_dir: Option<&Path>) -> PathBuf {
        let parent = media_file.parent().unwrap_or(input_dir);
        match output_dir {
            Some(output_dir) => match parent.strip_prefix(input_dir) {
                Ok(relative) => output_dir.join(relative),
                Err(_) => output_dir.to_path_buf(),
            },
            None => parent.to_path_buf(),
        }
    }

    /// Run the workflow on every media file below a directory
    ///
    /// A failing file is logged and the rest of the folder is still processed.
    pub async fn run_folder(&self, input_dir: PathBuf, output_dir: Option<PathBuf>, force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        if !input_dir.exists() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let media_files = FileManager::find_media_files(&input_dir)?;
        if media_files.is_empty() {
            return Err(anyhow!("No media files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(media_files.len() as u64));
        folder_pb.set_style(Self::progress_style("files"));
        folder_pb.set_message("Processing files");

        let mut success_count = 0;
        let mut error_count = 0;

        for media_file in &media_files {
            let file_name = media_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            let file_output_dir = Self::folder_output_dir(media_file, &input_dir, output_dir.as_deref());

            match self.run_with_progress(media_file, &file_output_dir, &multi_progress, force_overwrite).await {
                Ok(()) => success_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed: {} processed, {} errors in {}",
            success_count,
            error_count,
            Self::format_duration(start_time.elapsed())
        );

        Ok(())
    }
}
