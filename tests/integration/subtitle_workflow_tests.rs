/*!
 * Compile, write to disk, parse back and recompile
 */

use autocaption::compiler::{CueConfig, compile};
use autocaption::segment::{SubtitleCue, TranscriptSegment};
use autocaption::subtitle_processor::{cues_to_segments, parse_subtitle_track, write_subtitle_track};

use crate::common;

fn timing_and_lines(cues: &[SubtitleCue]) -> Vec<(u64, u64, Vec<String>)> {
    cues.iter()
        .map(|c| (c.start_ms(), c.end_ms(), c.lines.clone()))
        .collect()
}

/// Compile, write the track, parse it back and compile the parsed cues again
async fn compile_twice_through_disk(segments: &[TranscriptSegment]) -> (Vec<SubtitleCue>, Vec<SubtitleCue>) {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = CueConfig::default();

    let first = compile(segments, None, &config).await.unwrap();
    let path = temp_dir.path().join("track.srt");
    write_subtitle_track(&path, &first).unwrap();

    let parsed = parse_subtitle_track(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let second = compile(&cues_to_segments(&parsed), None, &config).await.unwrap();
    (first, second)
}

#[tokio::test]
async fn test_recompile_withCalmTranscript_shouldReproduceCues() {
    common::init_logging();
    let (first, second) = compile_twice_through_disk(&common::calm_transcript()).await;
    assert_eq!(timing_and_lines(&second), timing_and_lines(&first));
}

#[tokio::test]
async fn test_recompile_withVariedTranscript_shouldReproduceCues() {
    let (first, second) = compile_twice_through_disk(&common::varied_transcript()).await;
    assert_eq!(timing_and_lines(&second), timing_and_lines(&first));
}

#[tokio::test]
async fn test_recompile_withLongDenseSegment_shouldReproduceCues() {
    let text = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima mike november oscar papa qu";
    let (first, second) = compile_twice_through_disk(&[TranscriptSegment::new(0.0, 20.0, text)]).await;

    assert_eq!(timing_and_lines(&second), timing_and_lines(&first));
    assert_eq!(first.len(), 4);
    assert!(first.iter().all(|c| c.duration() <= CueConfig::default().max_cue_duration));
}

#[tokio::test]
async fn test_compile_withLongSlowSegment_shouldSplitIntoEqualSlices() {
    let config = CueConfig::default();

    let cues = compile(&common::calm_transcript(), None, &config).await.unwrap();

    // 9.5s..25.0s exceeds the 7s ceiling: three slices of ~5.167s
    let tail: Vec<&SubtitleCue> = cues.iter().filter(|c| c.start >= 9.5).collect();
    assert_eq!(tail.len(), 3);
    assert_eq!(tail[0].start_ms(), 9_500);
    assert_eq!(tail[2].end_ms(), 25_000);
    for cue in &tail {
        assert!(cue.duration() <= config.max_cue_duration);
    }
    let words: Vec<String> = tail.iter().map(|c| c.text()).collect();
    assert_eq!(words.join(" "), "a few words spread over a long time");
}

#[test]
fn test_compile_withVariedTranscript_shouldWriteParsableTrack() {
    let temp_dir = common::create_temp_dir().unwrap();
    let config = CueConfig::default();

    let cues = tokio_test::block_on(compile(&common::varied_transcript(), None, &config)).unwrap();
    let path = temp_dir.path().join("out/varied.srt");
    write_subtitle_track(&path, &cues).unwrap();

    let parsed = parse_subtitle_track(&std::fs::read_to_string(&path).unwrap()).unwrap();
    common::assert_well_formed(&parsed, config.max_line_chars, config.max_lines_per_cue);
    assert_eq!(parsed.len(), cues.len());
}
