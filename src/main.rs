// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use autocaption::app_config::{self, Config};
use autocaption::app_controller::Controller;
use autocaption::renderer::RenderMode;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate subtitles for a video, audio file, transcript or folder (default command)
    Caption(CaptionArgs),

    /// Check that ffmpeg, whisper and LanguageTool are available
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for autocaption
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct CaptionArgs {
    /// Input media file, whisper JSON transcript, or directory
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Embed subtitles as a separate track (toggleable in player)
    #[arg(long)]
    soft: bool,

    /// Disable grammar correction
    #[arg(long)]
    no_grammar: bool,

    /// Only write the subtitle and transcript files
    #[arg(long)]
    no_render: bool,

    /// Directory for generated files (defaults to the config value)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Whisper model name
    #[arg(short, long)]
    model: Option<String>,

    /// Spoken language code (e.g., 'en', 'it'); auto-detected when omitted
    #[arg(long)]
    language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// autocaption - automatic subtitles for videos
///
/// Transcribes speech with Whisper, optionally fixes grammar with LanguageTool,
/// compiles readable subtitle cues and renders them into the video with ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "autocaption")]
#[command(version)]
#[command(about = "Auto-generate subtitles for videos")]
#[command(long_about = "autocaption transcribes a video, compiles well-formed subtitle cues and renders them.

EXAMPLES:
    autocaption video.mp4                  # Burned-in subtitles (default)
    autocaption --soft video.mp4           # Toggleable subtitle track
    autocaption --no-grammar video.mp4     # Skip grammar correction
    autocaption --no-render talk.json      # Compile an existing whisper transcript
    autocaption -f /videos/                # Process a whole directory
    autocaption check                      # Check dependencies only
    autocaption completions bash > autocaption.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the file doesn't exist,
    a default one is created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input media file, whisper JSON transcript, or directory
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Embed subtitles as a separate track (toggleable in player)
    #[arg(long)]
    soft: bool,

    /// Disable grammar correction
    #[arg(long)]
    no_grammar: bool,

    /// Only write the subtitle and transcript files
    #[arg(long)]
    no_render: bool,

    /// Directory for generated files (defaults to the config value)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Whisper model name
    #[arg(short, long)]
    model: Option<String>,

    /// Spoken language code (e.g., 'en', 'it'); auto-detected when omitted
    #[arg(long)]
    language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for a log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => ("", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, colour) = Self::decoration(record.level());
            let _ = writeln!(std::io::stderr(), "\x1B[{}m{} {}{}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn load_config(config_path: &str, log_level: Option<&CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_create(config_path)?;

    if let Some(level) = log_level {
        config.log_level = level.clone().into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "autocaption", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Check { config_path }) => run_check(&config_path).await,
        Some(Commands::Caption(args)) => run_caption(args).await,
        None => {
            // Top-level arguments behave like the caption subcommand
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            run_caption(CaptionArgs {
                input_path,
                soft: cli.soft,
                no_grammar: cli.no_grammar,
                no_render: cli.no_render,
                output_dir: cli.output_dir,
                model: cli.model,
                language: cli.language,
                config_path: cli.config_path,
                log_level: cli.log_level,
                force_overwrite: cli.force_overwrite,
            })
            .await
        }
    }
}

async fn run_check(config_path: &str) -> Result<()> {
    let config = load_config(config_path, None)?;
    let controller = Controller::with_config(config)?;

    let report = controller.check_dependencies().await;
    if report.required_ok() {
        info!("✅ Check complete.");
        Ok(())
    } else {
        Err(anyhow!("Missing required dependencies"))
    }
}

async fn run_caption(options: CaptionArgs) -> Result<()> {
    let mut config = load_config(&options.config_path, options.log_level.as_ref())?;

    if options.soft {
        config.render.mode = RenderMode::Soft;
    }
    if options.no_grammar {
        config.grammar.enabled = false;
    }
    if options.no_render {
        config.render.enabled = false;
    }
    if let Some(model) = &options.model {
        config.transcription.model = model.clone();
    }
    if let Some(language) = &options.language {
        config.transcription.language = Some(language.clone());
    }
    if let Some(output_dir) = &options.output_dir {
        config.output_dir = output_dir.clone();
    }

    let output_dir = config.output_dir.clone();
    let controller = Controller::with_config(config)?;

    if options.input_path.is_file() {
        let output_dir = if options.output_dir.is_some() {
            output_dir
        } else {
            options
                .input_path
                .parent()
                .unwrap_or(Path::new("."))
                .join(&output_dir)
        };
        controller.run(options.input_path.clone(), output_dir, options.force_overwrite).await
    } else if options.input_path.is_dir() {
        controller
            .run_folder(options.input_path.clone(), options.output_dir.clone(), options.force_overwrite)
            .await
    } else {
        Err(anyhow!("Input path does not exist: {:?}", options.input_path))
    }
}
