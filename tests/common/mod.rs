/*!
 * Common test utilities for the autocaption test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

use autocaption::segment::{SubtitleCue, TranscriptSegment};

// Re-export the stub engines module
pub mod stubs;

static INIT_LOGGING: Once = Once::new();

/// Route library logs to the test output (RUST_LOG controls the level)
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A transcript exercising every compiler rule: a short cue next to a close
/// neighbour, an overlap, a fast burst, an oversized word, text needing
/// several cues and a long slow segment.
pub fn varied_transcript() -> Vec<TranscriptSegment> {
    vec![
        TranscriptSegment::new(0.0, 2.5, " Hello and welcome back to the channel."),
        TranscriptSegment::new(2.6, 2.8, " Hi!"),
        TranscriptSegment::new(3.0, 5.5, " Today we look at something new."),
        TranscriptSegment::new(5.0, 6.0, " Overlapping words from the engine here."),
        TranscriptSegment::new(6.0, 6.8, " This burst of speech is much too quick to read comfortably"),
        TranscriptSegment::new(7.0, 9.0, " Pneumonoultramicroscopicsilicovolcanoconiosis is a word"),
        TranscriptSegment::new(
            9.0,
            15.0,
            " Sometimes a speaker talks for a long time without pausing, and the recognizer returns one very long segment that cannot fit",
        ),
        TranscriptSegment::new(16.0, 31.0, " then silence and a few slow words"),
    ]
}

/// A transcript without overlaps or fast bursts, ending in one long slow segment
pub fn calm_transcript() -> Vec<TranscriptSegment> {
    vec![
        TranscriptSegment::new(0.0, 2.5, " Hello and welcome to the show."),
        TranscriptSegment::new(3.0, 3.2, " Hi!"),
        TranscriptSegment::new(4.0, 9.0, " Today we talk about subtitles and how they are timed on screen."),
        TranscriptSegment::new(9.5, 25.0, " a few words spread over a long time"),
    ]
}

/// Write a whisper-style JSON transcript
pub fn write_whisper_json(dir: &Path, filename: &str, language: &str, segments: &[TranscriptSegment]) -> Result<PathBuf> {
    let json = serde_json::json!({
        "text": segments.iter().map(|s| s.text.as_str()).collect::<String>(),
        "language": language,
        "segments": segments,
    });
    create_test_file(dir, filename, &serde_json::to_string_pretty(&json)?)
}

/// Assert the structural cue invariants: numbering, ordering, widths
pub fn assert_well_formed(cues: &[SubtitleCue], max_line_chars: usize, max_lines: usize) {
    for (i, cue) in cues.iter().enumerate() {
        assert_eq!(cue.index, i + 1, "cue numbering");
        assert!(cue.start_ms() < cue.end_ms(), "cue {} has no duration", cue.index);
        assert!(!cue.lines.is_empty() && cue.lines.len() <= max_lines, "cue {} line count", cue.index);
        for line in &cue.lines {
            let single_word = line.split_whitespace().count() == 1;
            assert!(
                line.chars().count() <= max_line_chars || single_word,
                "cue {} line too wide: {:?}",
                cue.index,
                line
            );
        }
        if let Some(next) = cues.get(i + 1) {
            assert!(cue.end <= next.start, "cue {} overlaps cue {}", cue.index, next.index);
        }
    }
}
