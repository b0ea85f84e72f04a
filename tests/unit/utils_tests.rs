/*!
 * Tests for language and file utilities
 */

use std::path::PathBuf;

use autocaption::file_utils::{FileManager, FileType};
use autocaption::language_utils::{
    DEFAULT_LANGUAGETOOL_CODE, get_language_name, language_codes_match, languagetool_code, normalize_to_part2t,
};

use crate::common;

#[test]
fn test_languagetool_code_withWhisperLanguages_shouldMapVariants() {
    assert_eq!(languagetool_code(Some("en")), "en-US");
    assert_eq!(languagetool_code(Some("de")), "de-DE");
    assert_eq!(languagetool_code(Some("ita")), "it");
    assert_eq!(languagetool_code(Some("fre")), "fr");
}

#[test]
fn test_languagetool_code_withUnknownOrMissing_shouldUseDefault() {
    assert_eq!(languagetool_code(None), DEFAULT_LANGUAGETOOL_CODE);
    assert_eq!(languagetool_code(Some("ja")), DEFAULT_LANGUAGETOOL_CODE);
    assert_eq!(languagetool_code(Some("??")), DEFAULT_LANGUAGETOOL_CODE);
}

#[test]
fn test_language_codes_match_shouldCompareAcrossForms() {
    assert!(language_codes_match("de", "deu"));
    assert!(language_codes_match("ger", "de"));
    assert!(!language_codes_match("en", "fr"));
    assert!(!language_codes_match("en", "invalid"));
}

#[test]
fn test_normalize_and_name_shouldResolveCodes() {
    assert_eq!(normalize_to_part2t(" EN ").unwrap(), "eng");
    assert_eq!(get_language_name("it").unwrap(), "Italian");
    assert!(get_language_name("1ab").is_err());
}

#[test]
fn test_detect_file_type_shouldClassifyByExtension() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path();

    let video = common::create_test_file(dir, "clip.MKV", "").unwrap();
    let audio = common::create_test_file(dir, "voice.wav", "").unwrap();
    let transcript = common::create_test_file(dir, "talk.json", "{}").unwrap();
    let other = common::create_test_file(dir, "notes.txt", "").unwrap();

    assert_eq!(FileManager::detect_file_type(&video).unwrap(), FileType::Video);
    assert_eq!(FileManager::detect_file_type(&audio).unwrap(), FileType::Audio);
    assert_eq!(FileManager::detect_file_type(&transcript).unwrap(), FileType::Transcript);
    assert_eq!(FileManager::detect_file_type(&other).unwrap(), FileType::Unknown);
    assert!(FileManager::detect_file_type(dir.join("missing.mp4")).is_err());
}

#[test]
fn test_find_media_files_shouldRecurseAndSort() {
    let temp_dir = common::create_temp_dir().unwrap();
    let dir = temp_dir.path();
    std::fs::create_dir_all(dir.join("season1")).unwrap();

    common::create_test_file(dir, "b.mp4", "").unwrap();
    common::create_test_file(dir, "a.mp3", "").unwrap();
    common::create_test_file(&dir.join("season1"), "episode.mov", "").unwrap();
    common::create_test_file(dir, "a.srt", "").unwrap();
    common::create_test_file(dir, "talk.json", "{}").unwrap();

    let found = FileManager::find_media_files(dir).unwrap();

    let names: Vec<PathBuf> = found
        .iter()
        .map(|p| p.strip_prefix(dir).unwrap().to_path_buf())
        .collect();
    assert_eq!(
        names,
        vec![PathBuf::from("a.mp3"), PathBuf::from("b.mp4"), PathBuf::from("season1/episode.mov")]
    );
}

#[test]
fn test_write_to_file_shouldCreateOutputDirectory() {
    let temp_dir = common::create_temp_dir().unwrap();
    let outputs = FileManager::output_paths("/videos/lecture.mp4", temp_dir.path().join("out"));

    FileManager::write_to_file(&outputs.subtitle, "1\n").unwrap();

    assert!(FileManager::file_exists(&outputs.subtitle));
    assert_eq!(FileManager::read_to_string(&outputs.subtitle).unwrap(), "1\n");
    assert!(!FileManager::file_exists(&outputs.transcript));
}
