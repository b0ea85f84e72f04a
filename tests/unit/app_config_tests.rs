/*!
 * Tests for app configuration functionality
 */

use autocaption::app_config::{Config, LogLevel};
use autocaption::compiler::CueConfig;
use autocaption::renderer::RenderMode;

use crate::common;

/// Test that a saved configuration loads back unchanged
#[test]
fn test_save_and_load_withCustomValues_shouldRoundTrip() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("conf.json");

    let mut config = Config::default();
    config.compiler.max_line_chars = 32;
    config.compiler.max_chars_per_second = 17.0;
    config.grammar.language = Some("de-DE".to_string());
    config.render.mode = RenderMode::Soft;
    config.transcription.model = "small".to_string();
    config.log_level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::load_or_create(&path).unwrap();

    assert_eq!(loaded, config);
    assert!(loaded.validate().is_ok());
}

/// Test that a config file using only some sections gets defaults for the rest
#[test]
fn test_load_or_create_withPartialFile_shouldFillDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{
            "compiler": { "max_lines_per_cue": 1 },
            "grammar": { "enabled": false },
            "output_dir": "captions"
        }"#,
    )
    .unwrap();

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config.compiler.max_lines_per_cue, 1);
    assert_eq!(config.compiler.max_line_chars, CueConfig::default().max_line_chars);
    assert!(!config.grammar.enabled);
    assert_eq!(config.grammar.concurrent_requests, 4);
    assert_eq!(config.output_dir, std::path::PathBuf::from("captions"));
    assert_eq!(config.transcription.command, "whisper");
    assert!(config.render.enabled);
}

#[test]
fn test_load_or_create_withMalformedJson_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
}

#[test]
fn test_validate_withZeroConcurrency_shouldFailOnlyWhenGrammarEnabled() {
    let mut config = Config::default();
    config.grammar.concurrent_requests = 0;
    assert!(config.validate().is_err());

    config.grammar.enabled = false;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withInvalidGrammarLanguage_shouldFail() {
    let mut config = Config::default();
    config.grammar.language = Some("xx-YY".to_string());
    assert!(config.validate().is_err());

    config.grammar.language = Some("pt-BR".to_string());
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withEmptyModel_shouldFail() {
    let mut config = Config::default();
    config.transcription.model = "  ".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_withNonPositiveReadingSpeed_shouldFail() {
    let mut config = Config::default();
    config.compiler.max_chars_per_second = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn test_log_level_shouldMapToFilter() {
    assert_eq!(LogLevel::Warn.to_level_filter(), log::LevelFilter::Warn);
    assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
}
