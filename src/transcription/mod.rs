/*!
 * Speech-to-text collaborators.
 *
 * A `Transcriber` turns a media file into timestamped segments. The engine
 * is a black box: the compiler only sees the resulting `Transcript`.
 *
 * - `whisper`: Runs the `whisper` command line tool and reads its JSON output
 */

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::path::Path;

use crate::errors::TranscriptionError;
use crate::segment::TranscriptSegment;

pub mod whisper;

pub use whisper::WhisperCli;

/// Output of a transcription engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Detected or forced language code, when the engine reports one
    #[serde(default)]
    pub language: Option<String>,

    /// Segments in engine order
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Parse the JSON document written by `whisper --output_format json`
    ///
    /// Extra fields (tokens, probabilities) are ignored. Segment text is
    /// kept verbatim; whisper prefixes it with a space.
    pub fn from_whisper_json(json: &str) -> Result<Self, TranscriptionError> {
        let transcript: Transcript =
            serde_json::from_str(json).map_err(|e| TranscriptionError::ParseError(e.to_string()))?;
        debug!(
            "Parsed transcript: {} segments, language {:?}",
            transcript.segments.len(),
            transcript.language
        );
        Ok(transcript)
    }
}

/// Speech-to-text engine interface
#[async_trait]
pub trait Transcriber: Send + Sync + Debug {
    /// Transcribe the media file into ordered segments
    async fn transcribe(&self, media: &Path) -> Result<Transcript, TranscriptionError>;
}

/// Reads a previously saved whisper JSON transcript instead of running an engine
#[derive(Debug, Default, Clone)]
pub struct JsonTranscript;

#[async_trait]
impl Transcriber for JsonTranscript {
    async fn transcribe(&self, media: &Path) -> Result<Transcript, TranscriptionError> {
        let content = tokio::fs::read_to_string(media)
            .await
            .map_err(|e| TranscriptionError::MediaNotFound(format!("{}: {}", media.display(), e)))?;
        Transcript::from_whisper_json(&content)
    }
}
