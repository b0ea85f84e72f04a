use serde::{Deserialize, Serialize};

use crate::errors::CompileError;

// @module: Timestamped transcript units

/// A transcription engine's atomic unit of timestamped text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Recognized text
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A transcript segment after grammar correction
///
/// Timing is always copied from the source segment; only text changes.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectedSegment {
    // @field: Start time in seconds (unchanged from source)
    pub start: f64,

    // @field: End time in seconds (unchanged from source)
    pub end: f64,

    // @field: Text as produced by the transcription engine
    pub original_text: String,

    // @field: Text after correction, or the original text on fallback
    pub corrected_text: String,

    // @field: Whether correction failed and the original text was kept
    pub correction_failed: bool,
}

impl CorrectedSegment {
    /// Carries a segment through without correction
    pub fn uncorrected(segment: &TranscriptSegment) -> Self {
        Self {
            start: segment.start,
            end: segment.end,
            original_text: segment.text.clone(),
            corrected_text: segment.text.clone(),
            correction_failed: false,
        }
    }

    /// Keeps the original text after a failed correction
    pub fn fallback(segment: &TranscriptSegment) -> Self {
        Self {
            correction_failed: true,
            ..Self::uncorrected(segment)
        }
    }

    /// Applies a corrected text to the segment's original bounds
    pub fn with_correction(segment: &TranscriptSegment, corrected_text: String) -> Self {
        Self {
            corrected_text,
            ..Self::uncorrected(segment)
        }
    }

    /// The text that should be displayed
    pub fn text(&self) -> &str {
        if self.corrected_text.trim().is_empty() {
            &self.original_text
        } else {
            &self.corrected_text
        }
    }

    /// Whether the correction produced a different text
    pub fn is_changed(&self) -> bool {
        !self.correction_failed && normalize_whitespace(&self.corrected_text) != normalize_whitespace(&self.original_text)
    }
}

/// One displayable subtitle entry
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// Sequence number, starting at 1
    pub index: usize,

    /// Start time in seconds
    pub start: f64,

    /// End time in seconds
    pub end: f64,

    /// Wrapped display lines
    pub lines: Vec<String>,
}

impl SubtitleCue {
    pub fn new(index: usize, start: f64, end: f64, lines: Vec<String>) -> Self {
        Self { index, start, end, lines }
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// The cue's text with lines rejoined by a single space
    pub fn text(&self) -> String {
        self.lines.join(" ")
    }

    /// Number of displayed characters, excluding line breaks
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|line| line.chars().count()).sum()
    }

    pub fn start_ms(&self) -> u64 {
        seconds_to_millis(self.start)
    }

    pub fn end_ms(&self) -> u64 {
        seconds_to_millis(self.end)
    }
}

/// Converts seconds to whole milliseconds, truncating
///
/// A one-nanosecond tolerance absorbs binary representation error, so that
/// 1.001 s becomes 1001 ms and not 1000 ms. Negative input maps to zero.
pub fn seconds_to_millis(seconds: f64) -> u64 {
    if seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0 + 1e-6).floor() as u64
}

/// Collapses runs of whitespace into single spaces and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Checks that a transcript is usable as compiler input
///
/// The segments must be non-empty, have finite non-negative start times,
/// positive durations, non-blank text, and be ordered by start time.
/// Unsorted input is rejected rather than re-sorted: mis-ordered timestamps
/// point at an engine defect.
pub fn validate_transcript(segments: &[TranscriptSegment]) -> Result<(), CompileError> {
    if segments.is_empty() {
        return Err(CompileError::invalid("transcript contains no segments"));
    }

    let mut previous_start: Option<f64> = None;
    for (i, segment) in segments.iter().enumerate() {
        let number = i + 1;

        if !segment.start.is_finite() || !segment.end.is_finite() {
            return Err(CompileError::invalid(format!(
                "segment {} has a non-finite timestamp",
                number
            )));
        }

        if segment.start < 0.0 {
            return Err(CompileError::invalid(format!(
                "segment {} starts before zero ({:.3}s)",
                number, segment.start
            )));
        }

        if segment.end <= segment.start {
            return Err(CompileError::invalid(format!(
                "segment {} has non-positive duration: end {:.3}s <= start {:.3}s",
                number, segment.end, segment.start
            )));
        }

        if segment.text.trim().is_empty() {
            return Err(CompileError::invalid(format!("segment {} has empty text", number)));
        }

        if let Some(prev) = previous_start {
            if segment.start < prev {
                return Err(CompileError::invalid(format!(
                    "segment {} starts at {:.3}s, before the previous segment at {:.3}s",
                    number, segment.start, prev
                )));
            }
        }
        previous_start = Some(segment.start);
    }

    Ok(())
}
