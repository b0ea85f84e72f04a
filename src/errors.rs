/*!
 * Error types for the autocaption application.
 *
 * This module contains custom error types for the different parts of the
 * captioning pipeline, using the thiserror crate for ergonomic error definitions.
 *
 * - `CompileError` is the only error the cue compiler can return.
 * - `CorrectionError` never leaves the grammar realigner: it is recovered
 *   per segment by falling back to the original text.
 * - `TranscriptionError` and `RenderError` come from external engines and are
 *   propagated unmodified.
 */

use thiserror::Error;

/// Errors raised while compiling a transcript into subtitle cues
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// Malformed or unsatisfiable transcript or compiler configuration
    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),
}

impl CompileError {
    /// Shorthand for building an `InvalidTranscript` error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidTranscript(reason.into())
    }
}

/// Errors that can occur when calling a grammar-correction engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrectionError {
    /// The correction engine could not be reached
    #[error("Correction engine unavailable: {0}")]
    Unavailable(String),

    /// The request was sent but failed
    #[error("Correction request failed: {0}")]
    RequestFailed(String),

    /// The engine answered with an error status
    #[error("Correction engine responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the engine
        message: String,
    },

    /// The engine response could not be understood
    #[error("Failed to parse correction response: {0}")]
    ParseError(String),

    /// The call did not complete in time
    #[error("Correction timed out after {0} ms")]
    Timeout(u64),
}

/// Errors that can occur while transcribing media
#[derive(Error, Debug)]
pub enum TranscriptionError {
    /// The media file could not be found or read
    #[error("Media not found: {0}")]
    MediaNotFound(String),

    /// The speech-to-text command could not be started
    #[error("Failed to launch transcription engine: {0}")]
    Launch(String),

    /// The engine ran but reported a failure
    #[error("Transcription engine failed: {0}")]
    EngineFailed(String),

    /// The engine output could not be parsed
    #[error("Failed to parse transcription output: {0}")]
    ParseError(String),

    /// The engine did not finish in time
    #[error("Transcription timed out after {0} seconds")]
    Timeout(u64),

    /// Audio extraction before transcription failed
    #[error("Audio extraction failed: {0}")]
    AudioExtraction(String),
}

/// Errors that can occur while rendering subtitles into a media file
#[derive(Error, Debug)]
pub enum RenderError {
    /// The source media file could not be found
    #[error("Media not found: {0}")]
    MediaNotFound(String),

    /// Writing the intermediate subtitle file failed
    #[error("Failed to prepare subtitle track: {0}")]
    Io(#[from] std::io::Error),

    /// The renderer could not be started
    #[error("Failed to launch renderer: {0}")]
    Launch(String),

    /// The renderer ran but reported a failure
    #[error("Renderer failed: {0}")]
    RendererFailed(String),

    /// The renderer did not finish in time
    #[error("Rendering timed out after {0} seconds")]
    Timeout(u64),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from cue compilation
    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    /// Error from the transcription engine
    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    /// Error from the renderer
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
