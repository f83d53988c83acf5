use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Mp3,
    Wav,
    Aac,
    Flac,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Mp3
    }
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [Self::Mp3, Self::Wav, Self::Aac, Self::Flac];

    /// Value sent in the `format` form field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Wav => "wav",
            Self::Aac => "aac",
            Self::Flac => "flac",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

/// A local file picked by the user, either dropped or browsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl SelectedFile {
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let size = std::fs::metadata(path)?.len();
        Ok(Self::new(path, size))
    }

    /// Builds the descriptor without touching the filesystem.
    pub fn new(path: impl AsRef<Path>, size: u64) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let mime_type = mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            name,
            size,
            mime_type,
        }
    }

    pub fn size_in_mb(&self) -> String {
        format!("{:.2} MB", self.size as f64 / (1024.0 * 1024.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionInput {
    File(SelectedFile),
    Url(String),
}

impl ConversionInput {
    pub fn source_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::File(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub input: ConversionInput,
    pub format: OutputFormat,
}

/// Body of a successful `/api/convert` reply.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertSuccess {
    pub name: String,
    pub size: String,
    pub bitrate: String,
    pub download_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedArtifact {
    pub name: String,
    pub size: String,
    pub bitrate: String,
    pub download_path: String,
}

impl From<ConvertSuccess> for ConvertedArtifact {
    fn from(reply: ConvertSuccess) -> Self {
        Self {
            name: reply.name,
            size: reply.size,
            bitrate: reply.bitrate,
            download_path: reply.download_url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorState {
    pub message: String,
    pub is_source_platform_block: bool,
}

impl ErrorState {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            is_source_platform_block: false,
        }
    }
}
