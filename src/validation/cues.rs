use log::debug;

use crate::compiler::CueConfig;
use crate::segment::SubtitleCue;

/// Floating point slack for soft duration checks, in seconds
const DURATION_EPSILON: f64 = 1e-9;

/// Types of cue issues
#[derive(Debug, Clone, PartialEq)]
pub enum CueIssue {
    /// End is not after start at millisecond precision
    InvalidTimeRange { start_ms: u64, end_ms: u64 },
    /// Cue has no displayable text
    EmptyText,
    /// A line holding several words is wider than allowed
    LineTooLong { chars: usize, max_chars: usize },
    /// More lines than allowed in one cue
    TooManyLines { lines: usize, max_lines: usize },
    /// Starts before the previous cue ends
    OverlapsWithCue { other_index: usize, overlap_ms: u64 },
    /// Index is not the next number in sequence
    IndexOutOfSequence { expected: usize, found: usize },
    /// A single word wider than a line; kept whole on its own line
    OversizedWord { chars: usize, max_chars: usize },
    /// Shorter than the minimum display time
    DurationTooShort { duration: f64, min_duration: f64 },
    /// Longer than the maximum display time
    DurationTooLong { duration: f64, max_duration: f64 },
    /// More characters per second than the reading-speed target
    ReadingSpeedTooHigh { cps: f64, max_cps: f64 },
}

impl CueIssue {
    /// Whether the issue breaks a cue invariant
    pub fn is_hard(&self) -> bool {
        matches!(
            self,
            CueIssue::InvalidTimeRange { .. }
                | CueIssue::EmptyText
                | CueIssue::LineTooLong { .. }
                | CueIssue::TooManyLines { .. }
                | CueIssue::OverlapsWithCue { .. }
                | CueIssue::IndexOutOfSequence { .. }
        )
    }
}

impl std::fmt::Display for CueIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CueIssue::InvalidTimeRange { start_ms, end_ms } => {
                write!(f, "Invalid time range: start {}ms >= end {}ms", start_ms, end_ms)
            }
            CueIssue::EmptyText => write!(f, "Empty text"),
            CueIssue::LineTooLong { chars, max_chars } => {
                write!(f, "Line too long: {} chars (max: {})", chars, max_chars)
            }
            CueIssue::TooManyLines { lines, max_lines } => {
                write!(f, "Too many lines: {} (max: {})", lines, max_lines)
            }
            CueIssue::OverlapsWithCue { other_index, overlap_ms } => {
                write!(f, "Overlaps with cue {} by {}ms", other_index, overlap_ms)
            }
            CueIssue::IndexOutOfSequence { expected, found } => {
                write!(f, "Index out of sequence: expected {}, found {}", expected, found)
            }
            CueIssue::OversizedWord { chars, max_chars } => {
                write!(f, "Single word of {} chars exceeds line width {}", chars, max_chars)
            }
            CueIssue::DurationTooShort { duration, min_duration } => {
                write!(f, "Duration too short: {:.3}s (min: {:.3}s)", duration, min_duration)
            }
            CueIssue::DurationTooLong { duration, max_duration } => {
                write!(f, "Duration too long: {:.3}s (max: {:.3}s)", duration, max_duration)
            }
            CueIssue::ReadingSpeedTooHigh { cps, max_cps } => {
                write!(f, "Reading speed too high: {:.1} CPS (max: {:.1})", cps, max_cps)
            }
        }
    }
}

/// Issues found for a single cue
#[derive(Debug, Clone)]
pub struct CueReport {
    /// Index of the cue
    pub index: usize,
    /// Issues found
    pub issues: Vec<CueIssue>,
}

impl CueReport {
    pub fn has_hard_issue(&self) -> bool {
        self.issues.iter().any(CueIssue::is_hard)
    }
}

/// Result of validating a whole cue track
#[derive(Debug, Clone)]
pub struct CueValidationResult {
    /// Reports for each cue, in track order
    pub reports: Vec<CueReport>,
    /// Number of invariant violations
    pub hard_issue_count: usize,
    /// Number of missed display targets
    pub soft_issue_count: usize,
}

impl CueValidationResult {
    /// True when no cue invariant is broken
    pub fn passed(&self) -> bool {
        self.hard_issue_count == 0
    }

    /// The first invariant violation, with the index of its cue
    pub fn first_hard_issue(&self) -> Option<(usize, &CueIssue)> {
        self.reports
            .iter()
            .flat_map(|r| r.issues.iter().map(move |issue| (r.index, issue)))
            .find(|(_, issue)| issue.is_hard())
    }
}

/// Checks cues against the display configuration
pub struct CueValidator {
    config: CueConfig,
}

impl CueValidator {
    pub fn new(config: CueConfig) -> Self {
        Self { config }
    }

    /// Validate a single cue in isolation
    pub fn validate_cue(&self, cue: &SubtitleCue) -> CueReport {
        let mut issues = Vec::new();

        let (start_ms, end_ms) = (cue.start_ms(), cue.end_ms());
        if end_ms <= start_ms {
            issues.push(CueIssue::InvalidTimeRange { start_ms, end_ms });
        }

        if cue.lines.iter().all(|line| line.trim().is_empty()) {
            issues.push(CueIssue::EmptyText);
        }

        if cue.lines.len() > self.config.max_lines_per_cue {
            issues.push(CueIssue::TooManyLines {
                lines: cue.lines.len(),
                max_lines: self.config.max_lines_per_cue,
            });
        }

        for line in &cue.lines {
            let chars = line.chars().count();
            if chars <= self.config.max_line_chars {
                continue;
            }
            if line.split_whitespace().count() > 1 {
                issues.push(CueIssue::LineTooLong { chars, max_chars: self.config.max_line_chars });
            } else {
                issues.push(CueIssue::OversizedWord { chars, max_chars: self.config.max_line_chars });
            }
        }

        let duration = cue.duration();
        if duration > 0.0 {
            if duration + DURATION_EPSILON < self.config.min_cue_duration {
                issues.push(CueIssue::DurationTooShort {
                    duration,
                    min_duration: self.config.min_cue_duration,
                });
            }

            if duration > self.config.max_cue_duration + DURATION_EPSILON {
                issues.push(CueIssue::DurationTooLong {
                    duration,
                    max_duration: self.config.max_cue_duration,
                });
            }

            let cps = cue.char_count() as f64 / duration;
            if cps > self.config.max_chars_per_second * (1.0 + DURATION_EPSILON) {
                issues.push(CueIssue::ReadingSpeedTooHigh {
                    cps,
                    max_cps: self.config.max_chars_per_second,
                });
            }
        }

        CueReport { index: cue.index, issues }
    }

    /// Validate a whole track: every cue plus ordering, overlap and numbering
    pub fn validate_cues(&self, cues: &[SubtitleCue]) -> CueValidationResult {
        let mut reports: Vec<CueReport> = cues.iter().map(|c| self.validate_cue(c)).collect();

        for (i, cue) in cues.iter().enumerate() {
            if cue.index != i + 1 {
                reports[i].issues.push(CueIssue::IndexOutOfSequence {
                    expected: i + 1,
                    found: cue.index,
                });
            }

            if i > 0 {
                let previous = &cues[i - 1];
                // Seconds are compared directly; truncation to ms is monotonic
                if previous.end > cue.start {
                    reports[i].issues.push(CueIssue::OverlapsWithCue {
                        other_index: previous.index,
                        overlap_ms: previous.end_ms().saturating_sub(cue.start_ms()),
                    });
                }
            }
        }

        let hard_issue_count = reports
            .iter()
            .map(|r| r.issues.iter().filter(|i| i.is_hard()).count())
            .sum();
        let soft_issue_count = reports
            .iter()
            .map(|r| r.issues.iter().filter(|i| !i.is_hard()).count())
            .sum();

        debug!(
            "Cue validation: {} cues, {} hard issues, {} soft issues",
            cues.len(),
            hard_issue_count,
            soft_issue_count
        );

        CueValidationResult {
            reports,
            hard_issue_count,
            soft_issue_count,
        }
    }
}
