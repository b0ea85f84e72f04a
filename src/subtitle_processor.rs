use anyhow::{Context, Result, anyhow};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::segment::{SubtitleCue, TranscriptSegment, seconds_to_millis};

// @module: SubRip track and plain transcript serialization

// @const: SRT timing line; hours may exceed two digits
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timestamp pattern is valid")
});

/// Format milliseconds as an SRT timestamp (HH:MM:SS,mmm)
///
/// Hours are zero-padded to two digits and grow as needed.
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Parse an SRT timestamp to milliseconds
pub fn parse_timestamp(timestamp: &str) -> Result<u64> {
    let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

    if parts.len() != 4 {
        return Err(anyhow!("Invalid timestamp format: {}", timestamp));
    }

    let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
    let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
    let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
    let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 || parts[3].len() != 3 {
        return Err(anyhow!("Invalid time components in timestamp: {}", timestamp));
    }

    Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(
            f,
            "{} --> {}",
            format_timestamp(seconds_to_millis(self.start)),
            format_timestamp(seconds_to_millis(self.end))
        )?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        writeln!(f)
    }
}

/// Render cues as a SubRip track
pub fn serialize_subtitle_track(cues: &[SubtitleCue]) -> String {
    cues.iter().map(|cue| cue.to_string()).collect()
}

/// Render cues as plain text, one cue per line, without timestamps
pub fn serialize_transcript(cues: &[SubtitleCue]) -> String {
    cues.iter().map(|cue| format!("{}\n", cue.text())).collect()
}

/// Parse a SubRip track back into cues
///
/// Cue indices and line breaks are kept exactly as written. Blocks with a
/// malformed header are skipped with a warning; a track with no usable
/// block is an error.
pub fn parse_subtitle_track(content: &str) -> Result<Vec<SubtitleCue>> {
    let content = content.trim_start_matches('\u{feff}');
    let mut cues = Vec::new();

    let mut current_index: Option<usize> = None;
    let mut current_times: Option<(u64, u64)> = None;
    let mut current_lines: Vec<String> = Vec::new();

    let mut finish = |index: Option<usize>, times: Option<(u64, u64)>, lines: &mut Vec<String>| {
        match (index, times) {
            (Some(index), Some((start_ms, end_ms))) if !lines.is_empty() => {
                cues.push(SubtitleCue::new(
                    index,
                    start_ms as f64 / 1000.0,
                    end_ms as f64 / 1000.0,
                    std::mem::take(lines),
                ));
            }
            (Some(index), _) => {
                warn!("Skipping incomplete subtitle block {}", index);
                lines.clear();
            }
            _ => lines.clear(),
        }
    };

    for (line_number, line) in content.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if current_index.is_some() || !current_lines.is_empty() {
                finish(current_index.take(), current_times.take(), &mut current_lines);
            }
            continue;
        }

        if current_index.is_none() {
            match trimmed.parse::<usize>() {
                Ok(index) => current_index = Some(index),
                Err(_) => warn!("Unexpected text at line {}: {}", line_number + 1, trimmed),
            }
            continue;
        }

        if current_times.is_none() {
            match TIMESTAMP_REGEX.captures(trimmed) {
                Some(caps) => {
                    let start = parse_timestamp(&format!("{}:{}:{},{}", &caps[1], &caps[2], &caps[3], &caps[4]))?;
                    let end = parse_timestamp(&format!("{}:{}:{},{}", &caps[5], &caps[6], &caps[7], &caps[8]))?;
                    current_times = Some((start, end));
                }
                None => {
                    warn!("Invalid timestamp line {}: {}", line_number + 1, trimmed);
                    current_index = None;
                }
            }
            continue;
        }

        current_lines.push(trimmed.to_string());
    }
    finish(current_index, current_times, &mut current_lines);

    if cues.is_empty() {
        return Err(anyhow!("No valid subtitle entries were found in the SRT content"));
    }

    debug!("Parsed {} cues", cues.len());
    Ok(cues)
}

/// Turn parsed cues back into transcript segments, one per cue
pub fn cues_to_segments(cues: &[SubtitleCue]) -> Vec<TranscriptSegment> {
    cues.iter()
        .map(|cue| TranscriptSegment::new(cue.start, cue.end, cue.text()))
        .collect()
}

fn write_text<P: AsRef<Path>>(path: P, content: &str, kind: &str) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    fs::write(path, content).with_context(|| format!("Failed to write {} file: {}", kind, path.display()))
}

/// Write cues to an SRT file, creating parent directories
pub fn write_subtitle_track<P: AsRef<Path>>(path: P, cues: &[SubtitleCue]) -> Result<()> {
    write_text(path, &serialize_subtitle_track(cues), "subtitle")
}

/// Write the plain transcript of the cues
pub fn write_transcript<P: AsRef<Path>>(path: P, cues: &[SubtitleCue]) -> Result<()> {
    write_text(path, &serialize_transcript(cues), "transcript")
}
