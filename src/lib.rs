/*!
 * # autocaption
 *
 * A Rust library for automatic video subtitles.
 *
 * ## Features
 *
 * - Transcribe speech with the Whisper command line tool
 * - Optional grammar correction through a LanguageTool server, with the
 *   original timing kept for every segment
 * - Compilation of raw transcript segments into readable subtitle cues:
 *   bounded line width, bounded duration, reading-speed aware, never
 *   overlapping
 * - SubRip (`.srt`) and plain transcript output
 * - Burned-in or soft subtitles rendered with ffmpeg
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `segment`: Transcript segments, corrected segments and subtitle cues
 * - `grammar`: Concurrent grammar correction that preserves timing:
 *   - `grammar::languagetool`: LanguageTool HTTP client
 *   - `grammar::mock`: Scriptable corrector for tests
 * - `compiler`: Transcript-to-subtitle cue compilation
 * - `validation`: Cue invariant and display-target checks
 * - `subtitle_processor`: SubRip and transcript serialization
 * - `transcription`: Speech-to-text engines
 * - `renderer`: Subtitle rendering into media files
 * - `media`: ffmpeg helpers
 * - `pipeline`: End-to-end orchestration over injected engines
 * - `app_config`, `app_controller`, `file_utils`, `language_utils`:
 *   Application layer
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod compiler;
pub mod errors;
pub mod file_utils;
pub mod grammar;
pub mod language_utils;
pub mod media;
pub mod pipeline;
pub mod renderer;
pub mod segment;
pub mod subtitle_processor;
pub mod transcription;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use compiler::{CueConfig, compile, compile_cues};
pub use errors::{AppError, CompileError, CorrectionError, RenderError, TranscriptionError};
pub use grammar::{Corrector, GrammarRealigner};
pub use pipeline::{Pipeline, PipelineOutput};
pub use renderer::{RenderMode, Renderer};
pub use segment::{CorrectedSegment, SubtitleCue, TranscriptSegment};
pub use subtitle_processor::{serialize_subtitle_track, serialize_transcript};
pub use transcription::{Transcriber, Transcript};
