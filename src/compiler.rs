/*!
 * Transcript-to-subtitle cue compilation.
 *
 * Turns an ordered sequence of (corrected) transcript segments into a
 * well-formed subtitle track:
 *
 * 1. Segment text is word-wrapped into the fewest lines of at most
 *    `max_line_chars` characters. Words are never broken; a word wider than
 *    a line sits alone on its own line.
 * 2. A segment with more lines than `max_lines_per_cue` becomes several
 *    consecutive cues, its time span divided in proportion to each cue's
 *    character count.
 * 3. Short cues are extended up to `min_cue_duration`, never past the next
 *    cue's start.
 * 4. A cue longer than `max_cue_duration` is cut into equal time slices,
 *    its words distributed in proportion to character count. Only a cue
 *    holding a single word may stay longer.
 * 5. Cues read faster than `max_chars_per_second` are extended as far as the
 *    next cue and `max_cue_duration` allow.
 * 6. Cues are numbered from 1.
 *
 * Compilation is sequential: each cue's adjustments depend on the resolved
 * position of the next one.
 */

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::CompileError;
use crate::grammar::GrammarRealigner;
use crate::segment::{
    CorrectedSegment, SubtitleCue, TranscriptSegment, normalize_whitespace, validate_transcript,
};
use crate::validation::CueValidator;

/// Display constraints for compiled cues
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CueConfig {
    /// Maximum characters per line
    #[serde(default = "default_max_line_chars")]
    pub max_line_chars: usize,

    /// Maximum lines shown at once
    #[serde(default = "default_max_lines_per_cue")]
    pub max_lines_per_cue: usize,

    /// Minimum display time in seconds
    #[serde(default = "default_min_cue_duration")]
    pub min_cue_duration: f64,

    /// Maximum display time in seconds
    #[serde(default = "default_max_cue_duration")]
    pub max_cue_duration: f64,

    /// Reading-speed target in characters per second
    #[serde(default = "default_max_chars_per_second")]
    pub max_chars_per_second: f64,
}

fn default_max_line_chars() -> usize {
    42
}

fn default_max_lines_per_cue() -> usize {
    2
}

fn default_min_cue_duration() -> f64 {
    0.7
}

fn default_max_cue_duration() -> f64 {
    7.0
}

fn default_max_chars_per_second() -> f64 {
    20.0
}

impl Default for CueConfig {
    fn default() -> Self {
        Self {
            max_line_chars: default_max_line_chars(),
            max_lines_per_cue: default_max_lines_per_cue(),
            min_cue_duration: default_min_cue_duration(),
            max_cue_duration: default_max_cue_duration(),
            max_chars_per_second: default_max_chars_per_second(),
        }
    }
}

impl CueConfig {
    /// Rejects settings no cue sequence could satisfy
    pub fn validate(&self) -> Result<(), CompileError> {
        if self.max_line_chars == 0 {
            return Err(CompileError::invalid("max_line_chars must be at least 1"));
        }
        if self.max_lines_per_cue == 0 {
            return Err(CompileError::invalid("max_lines_per_cue must be at least 1"));
        }
        if !self.min_cue_duration.is_finite() || self.min_cue_duration < 0.0 {
            return Err(CompileError::invalid("min_cue_duration must be a non-negative number of seconds"));
        }
        if !self.max_cue_duration.is_finite() || self.max_cue_duration <= 0.0 {
            return Err(CompileError::invalid("max_cue_duration must be a positive number of seconds"));
        }
        if self.min_cue_duration > self.max_cue_duration {
            return Err(CompileError::invalid(format!(
                "min_cue_duration ({}s) exceeds max_cue_duration ({}s)",
                self.min_cue_duration, self.max_cue_duration
            )));
        }
        if !self.max_chars_per_second.is_finite() || self.max_chars_per_second <= 0.0 {
            return Err(CompileError::invalid("max_chars_per_second must be positive"));
        }
        Ok(())
    }
}

/// A cue before numbering
#[derive(Debug, Clone)]
struct DraftCue {
    start: f64,
    end: f64,
    lines: Vec<String>,
}

impl DraftCue {
    fn duration(&self) -> f64 {
        self.end - self.start
    }

    fn char_count(&self) -> usize {
        self.lines.iter().map(|line| line.chars().count()).sum()
    }
}

/// Greedy word wrap producing the fewest lines no wider than `max_line_chars`
///
/// Widths count Unicode scalar values. A word wider than the limit is placed
/// alone on its own line, unbroken.
pub fn wrap_lines(text: &str, max_line_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= max_line_chars {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Splits `[start, end]` into consecutive spans proportional to `weights`
///
/// The last span always ends exactly at `end`.
fn proportional_bounds(start: f64, end: f64, weights: &[usize]) -> Vec<(f64, f64)> {
    let total: usize = weights.iter().sum::<usize>().max(1);
    let duration = end - start;

    let mut bounds = Vec::with_capacity(weights.len());
    let mut cumulative = 0;
    let mut cursor = start;
    for (i, weight) in weights.iter().enumerate() {
        cumulative += weight;
        let next = if i + 1 == weights.len() {
            end
        } else {
            start + duration * cumulative as f64 / total as f64
        };
        bounds.push((cursor, next));
        cursor = next;
    }
    bounds
}

/// Distributes words over `parts` non-empty groups of roughly equal character count
fn partition_words<'a>(words: &[&'a str], parts: usize) -> Vec<Vec<&'a str>> {
    // prefix[i] is the width of words[..i] joined by single spaces
    let mut prefix = vec![0usize; words.len() + 1];
    for (i, word) in words.iter().enumerate() {
        let separator = usize::from(i > 0);
        prefix[i + 1] = prefix[i] + separator + word.chars().count();
    }
    let total = prefix[words.len()] as f64;

    let mut cuts = vec![0];
    for k in 1..parts {
        let target = total * k as f64 / parts as f64;
        let lo = cuts[k - 1] + 1;
        let hi = words.len() - (parts - k);
        let best = (lo..=hi)
            .min_by(|&a, &b| {
                let da = (prefix[a] as f64 - target).abs();
                let db = (prefix[b] as f64 - target).abs();
                da.total_cmp(&db)
            })
            .unwrap_or(lo);
        cuts.push(best);
    }
    cuts.push(words.len());

    cuts.windows(2).map(|w| words[w[0]..w[1]].to_vec()).collect()
}

/// Step 4: cuts a draft longer than `max_cue_duration` into equal time slices
///
/// Words are distributed over the slices by character count. A draft with a
/// single word cannot be subdivided and is kept whole.
fn split_by_duration(draft: DraftCue, config: &CueConfig) -> Vec<DraftCue> {
    let duration = draft.duration();
    if duration <= config.max_cue_duration {
        return vec![draft];
    }

    let text = draft.lines.join(" ");
    let words: Vec<&str> = text.split_whitespace().collect();
    let parts = ((duration / config.max_cue_duration).ceil() as usize).min(words.len());
    if parts <= 1 {
        return vec![draft];
    }

    debug!(
        "Cue at {:.3}s lasts {:.3}s, splitting into {} cues",
        draft.start, duration, parts
    );
    let step = duration / parts as f64;
    partition_words(&words, parts)
        .into_iter()
        .enumerate()
        .map(|(k, group)| DraftCue {
            start: draft.start + step * k as f64,
            end: if k + 1 == parts { draft.end } else { draft.start + step * (k + 1) as f64 },
            lines: wrap_lines(&group.join(" "), config.max_line_chars),
        })
        .collect()
}

/// Steps 1, 2 and 4 for one segment
fn split_segment(start: f64, end: f64, text: &str, config: &CueConfig) -> Vec<DraftCue> {
    let lines = wrap_lines(text, config.max_line_chars);

    if lines.len() <= config.max_lines_per_cue {
        return split_by_duration(DraftCue { start, end, lines }, config);
    }

    let chunks: Vec<Vec<String>> = lines
        .chunks(config.max_lines_per_cue)
        .map(|chunk| chunk.to_vec())
        .collect();
    let weights: Vec<usize> = chunks.iter().map(|c| c.join(" ").chars().count()).collect();
    debug!(
        "Segment at {:.3}s needs {} lines, splitting into {} cues",
        start,
        lines.len(),
        chunks.len()
    );
    chunks
        .into_iter()
        .zip(proportional_bounds(start, end, &weights))
        .flat_map(|(lines, (start, end))| split_by_duration(DraftCue { start, end, lines }, config))
        .collect()
}

/// Steps 3 and 5: extend short or fast cues without overlapping the next one
fn adjust_durations(drafts: &mut [DraftCue], config: &CueConfig) {
    for i in 0..drafts.len() {
        let limit = drafts.get(i + 1).map_or(f64::INFINITY, |next| next.start);
        let draft = &mut drafts[i];

        if draft.duration() < config.min_cue_duration {
            let target = (draft.start + config.min_cue_duration).min(limit);
            if target > draft.end {
                draft.end = target;
            }
            if draft.duration() < config.min_cue_duration {
                debug!(
                    "Cue at {:.3}s stays below minimum duration ({:.3}s): next cue starts at {:.3}s",
                    draft.start,
                    draft.duration(),
                    limit
                );
            }
        }

        let needed = draft.char_count() as f64 / config.max_chars_per_second;
        if draft.duration() < needed {
            let ceiling = draft.start + config.max_cue_duration.max(draft.duration());
            let target = (draft.start + needed).min(limit).min(ceiling);
            if target > draft.end {
                draft.end = target;
            }
            if draft.duration() < needed {
                debug!(
                    "Cue at {:.3}s reads at {:.1} CPS, above target {:.1}",
                    draft.start,
                    draft.char_count() as f64 / draft.duration(),
                    config.max_chars_per_second
                );
            }
        }
    }
}

/// Compiles corrected segments into a finalized cue sequence
///
/// Segments must be ordered by start time. An end time running past the next
/// segment's start is trimmed back to it. Fails with `InvalidTranscript`
/// when a segment has no text or no remaining duration, or when the result
/// breaks a cue invariant; no partial result is returned.
///
/// Cue timing is checked at millisecond precision, the resolution of the
/// SubRip output: a cue must still span at least one millisecond once its
/// bounds are truncated, so segments shorter than that are rejected.
pub fn compile_cues(
    segments: &[CorrectedSegment],
    config: &CueConfig,
) -> Result<Vec<SubtitleCue>, CompileError> {
    config.validate()?;

    if segments.is_empty() {
        return Err(CompileError::invalid("transcript contains no segments"));
    }

    let mut drafts: Vec<DraftCue> = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let number = i + 1;
        let text = normalize_whitespace(segment.text());
        if text.is_empty() {
            return Err(CompileError::invalid(format!("segment {} has empty text", number)));
        }

        if !segment.start.is_finite() || !segment.end.is_finite() || segment.start < 0.0 {
            return Err(CompileError::invalid(format!(
                "segment {} has an invalid timestamp",
                number
            )));
        }

        let mut end = segment.end;
        if let Some(next) = segments.get(i + 1) {
            if next.start < segment.start {
                return Err(CompileError::invalid(format!(
                    "segment {} starts before segment {}",
                    number + 1,
                    number
                )));
            }
            if end > next.start {
                warn!(
                    "Segment {} overlaps the next one by {:.3}s, trimming its end",
                    number,
                    end - next.start
                );
                end = next.start;
            }
        }

        if end <= segment.start {
            return Err(CompileError::invalid(format!(
                "segment {} has no duration left (start {:.3}s, end {:.3}s)",
                number, segment.start, end
            )));
        }

        drafts.extend(split_segment(segment.start, end, &text, config));
    }

    adjust_durations(&mut drafts, config);

    let cues: Vec<SubtitleCue> = drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| SubtitleCue::new(i + 1, draft.start, draft.end, draft.lines))
        .collect();

    let result = CueValidator::new(config.clone()).validate_cues(&cues);
    if let Some((index, issue)) = result.first_hard_issue() {
        return Err(CompileError::invalid(format!("cue {}: {}", index, issue)));
    }
    if result.soft_issue_count > 0 {
        debug!(
            "{} cues compiled with {} display targets missed",
            cues.len(),
            result.soft_issue_count
        );
    }

    Ok(cues)
}

/// Validates, optionally corrects, and compiles a raw transcript
///
/// Grammar correction never makes this fail; only the transcript itself or
/// the configuration can.
pub async fn compile(
    segments: &[TranscriptSegment],
    realigner: Option<&GrammarRealigner>,
    config: &CueConfig,
) -> Result<Vec<SubtitleCue>, CompileError> {
    config.validate()?;
    validate_transcript(segments)?;

    let corrected = match realigner {
        Some(realigner) => realigner.realign_all(segments).await,
        None => segments.iter().map(CorrectedSegment::uncorrected).collect(),
    };

    compile_cues(&corrected, config)
}
