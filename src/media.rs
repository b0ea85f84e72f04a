use log::{debug, error};
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

use crate::errors::TranscriptionError;

// @module: ffmpeg helpers shared by transcription and rendering

/// Outcome of running an external tool with a deadline
#[derive(Debug)]
pub enum ToolRun {
    /// The tool exited; its status may still be a failure
    Finished(Output),
    /// The tool could not be started
    LaunchFailed(std::io::Error),
    /// The deadline passed first; the child is killed on drop
    TimedOut,
}

/// Run a command to completion, giving up after `timeout`
pub async fn run_with_timeout(command: &mut Command, timeout: Duration) -> ToolRun {
    command.kill_on_drop(true);
    let output_future = command.output();

    tokio::select! {
        result = output_future => match result {
            Ok(output) => ToolRun::Finished(output),
            Err(e) => ToolRun::LaunchFailed(e),
        },
        _ = tokio::time::sleep(timeout) => ToolRun::TimedOut,
    }
}

/// Check that a command line tool can be started
///
/// Runs `<command> <version_flag>` and reports whether it exited cleanly.
pub async fn probe_tool(command: &str, version_flag: &str) -> bool {
    let mut cmd = Command::new(command);
    cmd.arg(version_flag);
    match run_with_timeout(&mut cmd, Duration::from_secs(10)).await {
        ToolRun::Finished(output) => output.status.success(),
        ToolRun::LaunchFailed(e) => {
            debug!("{} is not available: {}", command, e);
            false
        }
        ToolRun::TimedOut => false,
    }
}

/// Filter ffmpeg stderr down to meaningful error lines, dropping the version
/// banner, build configuration and stream metadata.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "encoder",
        "handler_name",
        "major_brand",
        "minor_version",
        "compatible_brands",
        "creation_time",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}

/// Extract a 16 kHz mono PCM track for speech recognition
pub async fn extract_audio(
    ffmpeg_command: &str,
    media_path: &Path,
    audio_path: &Path,
    timeout: Duration,
) -> Result<(), TranscriptionError> {
    if !media_path.exists() {
        return Err(TranscriptionError::MediaNotFound(media_path.display().to_string()));
    }

    debug!("Extracting audio from {} to {}", media_path.display(), audio_path.display());

    let mut command = Command::new(ffmpeg_command);
    command
        .arg("-y")
        .arg("-i")
        .arg(media_path)
        .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
        .arg(audio_path);

    match run_with_timeout(&mut command, timeout).await {
        ToolRun::Finished(output) if output.status.success() => Ok(()),
        ToolRun::Finished(output) => {
            let filtered = filter_ffmpeg_stderr(&String::from_utf8_lossy(&output.stderr));
            error!("Audio extraction failed: {}", filtered);
            Err(TranscriptionError::AudioExtraction(filtered))
        }
        ToolRun::LaunchFailed(e) => Err(TranscriptionError::AudioExtraction(format!(
            "failed to execute {}: {}",
            ffmpeg_command, e
        ))),
        ToolRun::TimedOut => Err(TranscriptionError::Timeout(timeout.as_secs())),
    }
}
