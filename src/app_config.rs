use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

use crate::compiler::CueConfig;
use crate::renderer::RenderMode;

/// Application configuration module
/// This module handles loading, validating and saving the `conf.json`
/// settings of the captioning tool.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Cue layout and timing constraints
    #[serde(default)]
    pub compiler: CueConfig,

    /// Grammar correction settings
    #[serde(default)]
    pub grammar: GrammarConfig,

    /// Speech-to-text settings
    #[serde(default)]
    pub transcription: TranscriptionConfig,

    /// Rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Directory for generated files
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// LanguageTool settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GrammarConfig {
    /// Whether to run grammar correction at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// LanguageTool server URL
    #[serde(default = "default_languagetool_endpoint")]
    pub endpoint: String,

    /// LanguageTool language code (e.g. "en-US"); derived from the
    /// transcript language when absent
    #[serde(default)]
    pub language: Option<String>,

    /// Maximum number of correction requests in flight
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry count for failed requests
    #[serde(default = "default_retry_count")]
    pub max_retries: u32,

    /// Backoff base for retries (in milliseconds)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_languagetool_endpoint(),
            language: None,
            concurrent_requests: default_concurrent_requests(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_retry_count(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

/// Whisper settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranscriptionConfig {
    /// Whisper executable
    #[serde(default = "default_whisper_command")]
    pub command: String,

    /// Whisper model name
    #[serde(default = "default_whisper_model")]
    pub model: String,

    /// Spoken language (ISO 639-1); auto-detected when absent
    #[serde(default)]
    pub language: Option<String>,

    /// Timeout for a whole transcription in seconds
    #[serde(default = "default_long_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            command: default_whisper_command(),
            model: default_whisper_model(),
            language: None,
            timeout_secs: default_long_timeout_secs(),
        }
    }
}

/// ffmpeg rendering settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
    /// Whether to produce a captioned video
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Burned-in or soft subtitles
    #[serde(default)]
    pub mode: RenderMode,

    /// ffmpeg executable
    #[serde(default = "default_ffmpeg_command")]
    pub ffmpeg_command: String,

    /// Timeout for one render in seconds
    #[serde(default = "default_long_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: RenderMode::default(),
            ffmpeg_command: default_ffmpeg_command(),
            timeout_secs: default_long_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            compiler: CueConfig::default(),
            grammar: GrammarConfig::default(),
            transcription: TranscriptionConfig::default(),
            render: RenderConfig::default(),
            output_dir: default_output_dir(),
            log_level: LogLevel::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_concurrent_requests() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_long_timeout_secs() -> u64 {
    3600
}

fn default_retry_count() -> u32 {
    2
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

fn default_languagetool_endpoint() -> String {
    "http://localhost:8081".to_string()
}

fn default_whisper_command() -> String {
    "whisper".to_string()
}

fn default_whisper_model() -> String {
    "medium".to_string()
}

fn default_ffmpeg_command() -> String {
    "ffmpeg".to_string()
}

impl Config {
    /// Load a configuration file, creating it with defaults when missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path).with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            serde_json::from_reader(reader).with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            warn!("Config file not found at '{}', creating default config.", path.display());
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.compiler.validate()?;

        if let Some(language) = &self.transcription.language {
            crate::language_utils::get_language_name(language)
                .with_context(|| format!("Invalid transcription language '{}'", language))?;
        }

        if self.grammar.enabled {
            Url::parse(&self.grammar.endpoint)
                .map_err(|e| anyhow!("Invalid LanguageTool endpoint '{}': {}", self.grammar.endpoint, e))?;

            if self.grammar.concurrent_requests == 0 {
                return Err(anyhow!("grammar.concurrent_requests must be at least 1"));
            }

            if let Some(language) = &self.grammar.language {
                let base = language.split('-').next().unwrap_or(language);
                crate::language_utils::get_language_name(base)
                    .with_context(|| format!("Invalid LanguageTool language '{}'", language))?;
            }
        }

        if self.transcription.model.trim().is_empty() {
            return Err(anyhow!("transcription.model must not be empty"));
        }

        Ok(())
    }
}
