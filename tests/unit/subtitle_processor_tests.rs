/*!
 * Tests for SubRip and transcript serialization
 */

use autocaption::segment::SubtitleCue;
use autocaption::subtitle_processor::{
    cues_to_segments, format_timestamp, parse_subtitle_track, parse_timestamp, serialize_subtitle_track,
    serialize_transcript, write_subtitle_track, write_transcript,
};

use crate::common;

fn cues() -> Vec<SubtitleCue> {
    vec![
        SubtitleCue::new(1, 0.0, 2.5, vec!["Hello and welcome".to_string(), "to the show.".to_string()]),
        SubtitleCue::new(2, 3.0, 3.7, vec!["Hi!".to_string()]),
        SubtitleCue::new(3, 3_600.25, 3_605.125, vec!["An hour later.".to_string()]),
    ]
}

#[test]
fn test_serialize_subtitle_track_shouldWriteSubRipBlocks() {
    let track = serialize_subtitle_track(&cues());

    let expected = "1\n00:00:00,000 --> 00:00:02,500\nHello and welcome\nto the show.\n\n\
                    2\n00:00:03,000 --> 00:00:03,700\nHi!\n\n\
                    3\n01:00:00,250 --> 01:00:05,125\nAn hour later.\n\n";
    assert_eq!(track, expected);
}

#[test]
fn test_serialize_transcript_shouldJoinLinesPerCue() {
    let transcript = serialize_transcript(&cues());
    assert_eq!(transcript, "Hello and welcome to the show.\nHi!\nAn hour later.\n");
}

#[test]
fn test_serialize_withNoCues_shouldBeEmpty() {
    assert_eq!(serialize_subtitle_track(&[]), "");
    assert_eq!(serialize_transcript(&[]), "");
}

#[test]
fn test_timestamps_withHundredsOfHours_shouldRoundTrip() {
    let ms = 123 * 3_600_000 + 4 * 60_000 + 5_006;
    let formatted = format_timestamp(ms);

    assert_eq!(formatted, "123:04:05,006");
    assert_eq!(parse_timestamp(&formatted).unwrap(), ms);
}

#[test]
fn test_parse_timestamp_withInvalidComponents_shouldFail() {
    assert!(parse_timestamp("00:61:00,000").is_err());
    assert!(parse_timestamp("00:00:00,12").is_err());
    assert!(parse_timestamp("garbage").is_err());
}

#[test]
fn test_parse_subtitle_track_shouldRestoreSerializedCues() {
    let parsed = parse_subtitle_track(&serialize_subtitle_track(&cues())).unwrap();

    assert_eq!(parsed.len(), 3);
    for (original, restored) in cues().iter().zip(&parsed) {
        assert_eq!(restored.index, original.index);
        assert_eq!(restored.start_ms(), original.start_ms());
        assert_eq!(restored.end_ms(), original.end_ms());
        assert_eq!(restored.lines, original.lines);
    }
}

#[test]
fn test_parse_subtitle_track_withBomAndCrlf_shouldParse() {
    let content = "\u{feff}1\r\n00:00:01,000 --> 00:00:02,000\r\nFirst\r\n\r\n2\r\n00:00:02,500 --> 00:00:04,000\r\nSecond\r\n";

    let parsed = parse_subtitle_track(content).unwrap();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].lines, vec!["First"]);
    assert_eq!(parsed[1].start_ms(), 2500);
}

#[test]
fn test_parse_subtitle_track_withMalformedBlock_shouldSkipIt() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nKept\n\n2\nnot a timing line\nDropped\n\n3\n00:00:05,000 --> 00:00:06,000\nAlso kept\n";

    let parsed = parse_subtitle_track(content).unwrap();

    let texts: Vec<String> = parsed.iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["Kept", "Also kept"]);
    assert_eq!(parsed[1].index, 3);
}

#[test]
fn test_parse_subtitle_track_withNoBlocks_shouldFail() {
    assert!(parse_subtitle_track("").is_err());
    assert!(parse_subtitle_track("just some text\n").is_err());
}

#[test]
fn test_cues_to_segments_shouldJoinLines() {
    let segments = cues_to_segments(&cues());

    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].text, "Hello and welcome to the show.");
    assert_eq!(segments[2].start, 3_600.25);
}

#[test]
fn test_write_functions_shouldCreateParentDirectories() {
    let temp_dir = common::create_temp_dir().unwrap();
    let subtitle = temp_dir.path().join("nested/dir/clip.srt");
    let transcript = temp_dir.path().join("nested/dir/clip_transcript.txt");

    write_subtitle_track(&subtitle, &cues()).unwrap();
    write_transcript(&transcript, &cues()).unwrap();

    assert_eq!(std::fs::read_to_string(&subtitle).unwrap(), serialize_subtitle_track(&cues()));
    assert_eq!(std::fs::read_to_string(&transcript).unwrap(), serialize_transcript(&cues()));
}
