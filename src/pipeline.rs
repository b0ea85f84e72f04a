/*!
 * End-to-end captioning pipeline.
 *
 * Transcriber → (optional) grammar realigner → cue compiler → serializer →
 * (optional) renderer. Every external engine is injected as a trait object
 * so the whole flow can run against stubs.
 *
 * Transcription, compilation and rendering errors stop the run. Correction
 * problems never do: affected segments keep their original text.
 */

use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::compiler::{CueConfig, compile_cues};
use crate::errors::AppError;
use crate::grammar::{CorrectionSummary, GrammarRealigner};
use crate::renderer::{RenderMode, Renderer};
use crate::segment::{CorrectedSegment, SubtitleCue, validate_transcript};
use crate::subtitle_processor::{serialize_subtitle_track, serialize_transcript};
use crate::transcription::{Transcriber, Transcript};

/// Progress callback for the correction stage: (completed, total)
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Everything produced by one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Language reported by the transcriber
    pub language: Option<String>,

    /// Finalized cues
    pub cues: Vec<SubtitleCue>,

    /// The cues as a SubRip track
    pub subtitle_track: String,

    /// The cues as plain text
    pub transcript: String,

    /// Correction statistics, when correction ran
    pub corrections: Option<CorrectionSummary>,

    /// Captioned media, when rendering ran
    pub rendered: Option<PathBuf>,
}

/// Captioning pipeline over injected collaborators
pub struct Pipeline {
    transcriber: Arc<dyn Transcriber>,
    realigner: Option<GrammarRealigner>,
    renderer: Option<Arc<dyn Renderer>>,
    cue_config: CueConfig,
    correction_progress: Option<ProgressCallback>,
}

impl Pipeline {
    pub fn new(transcriber: Arc<dyn Transcriber>, cue_config: CueConfig) -> Self {
        Self {
            transcriber,
            realigner: None,
            renderer: None,
            cue_config,
            correction_progress: None,
        }
    }

    /// Enable grammar correction
    pub fn with_realigner(mut self, realigner: GrammarRealigner) -> Self {
        self.realigner = Some(realigner);
        self
    }

    /// Enable rendering
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Report correction progress through a callback
    pub fn with_correction_progress(mut self, callback: ProgressCallback) -> Self {
        self.correction_progress = Some(callback);
        self
    }

    pub fn cue_config(&self) -> &CueConfig {
        &self.cue_config
    }

    /// Transcribe, compile and optionally render one media file
    pub async fn run(&self, media: &Path, mode: RenderMode) -> Result<PipelineOutput, AppError> {
        self.cue_config.validate()?;

        let transcript = self.transcriber.transcribe(media).await?;
        self.process(media, transcript, mode).await
    }

    /// Compile and optionally render an already available transcript
    pub async fn process(
        &self,
        media: &Path,
        transcript: Transcript,
        mode: RenderMode,
    ) -> Result<PipelineOutput, AppError> {
        self.cue_config.validate()?;
        validate_transcript(&transcript.segments)?;

        let (corrected, corrections) = match &self.realigner {
            Some(realigner) => {
                info!("✏️  Correcting grammar ({} segments)...", transcript.segments.len());
                let corrected = match &self.correction_progress {
                    Some(callback) => {
                        let callback = Arc::clone(callback);
                        realigner
                            .realign_all_with_progress(&transcript.segments, move |done, total| callback(done, total))
                            .await
                    }
                    None => realigner.realign_all(&transcript.segments).await,
                };
                let summary = CorrectionSummary::from_segments(&corrected);
                if summary.failed > 0 {
                    warn!("{} segments kept their original text", summary.failed);
                }
                info!("   → {}", summary);
                (corrected, Some(summary))
            }
            None => (
                transcript.segments.iter().map(CorrectedSegment::uncorrected).collect(),
                None,
            ),
        };

        let cues = compile_cues(&corrected, &self.cue_config)?;
        info!("📝 Compiled {} cues from {} segments", cues.len(), corrected.len());

        let subtitle_track = serialize_subtitle_track(&cues);
        let plain_transcript = serialize_transcript(&cues);

        let rendered = match &self.renderer {
            Some(renderer) => Some(renderer.render(media, &cues, mode).await?),
            None => None,
        };

        Ok(PipelineOutput {
            language: transcript.language,
            cues,
            subtitle_track,
            transcript: plain_transcript,
            corrections,
            rendered,
        })
    }
}
