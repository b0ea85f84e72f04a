use anyhow::{Context, Result, anyhow};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Video containers handled by ffmpeg
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ogv", "ts", "mts", "m2ts",
];

// @const: Audio-only inputs
const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "m4a", "flac", "ogg", "opus", "aac"];

/// Enum representing the inputs the tool accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Video file supported by ffmpeg
    Video,
    /// Audio-only file; transcribed but never rendered
    Audio,
    /// Whisper JSON transcript
    Transcript,
    /// Anything else
    Unknown,
}

/// Paths of the files produced for one input
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    /// `<stem>.srt`
    pub subtitle: PathBuf,
    /// `<stem>_transcript.txt`
    pub transcript: PathBuf,
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path).with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @generates: Subtitle and transcript paths for an input file
    pub fn output_paths<P1: AsRef<Path>, P2: AsRef<Path>>(input_file: P1, output_dir: P2) -> OutputPaths {
        let stem = input_file
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let output_dir = output_dir.as_ref();

        OutputPaths {
            subtitle: output_dir.join(format!("{}.srt", stem)),
            transcript: output_dir.join(format!("{}_transcript.txt", stem)),
        }
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path).with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content).with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))
    }

    /// Classify an input by extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow!("File does not exist: {:?}", path));
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let file_type = if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Video
        } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Audio
        } else if ext == "json" {
            FileType::Transcript
        } else {
            FileType::Unknown
        };

        Ok(file_type)
    }

    /// Find every processable media file below a directory, sorted by path
    pub fn find_media_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && matches!(Self::detect_file_type(path)?, FileType::Video | FileType::Audio) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }
}
