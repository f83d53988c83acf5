use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use thiserror::Error;
use url::Url;

use crate::client::ConversionBackend;
use crate::config::BackendConfig;
use crate::models::ConvertedArtifact;

const FALLBACK_FILE_NAME: &str = "converted-audio";

pub const NO_DOWNLOAD_URL: &str = "No URL available for the converted file.";
pub const DOWNLOAD_FAILED: &str = "Error downloading the file. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("{}", NO_DOWNLOAD_URL)]
    NoArtifact,

    #[error("The download link {0:?} is not valid.")]
    InvalidUrl(String),

    #[error("{}", DOWNLOAD_FAILED)]
    Transport(String),

    #[error("Could not save the file: {0}")]
    Io(String),
}

/// Where to fetch a finished artifact from and what to call it locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: Url,
    pub file_name: String,
}

pub fn prepare_download(
    config: &BackendConfig,
    artifact: Option<&ConvertedArtifact>,
) -> Result<DownloadRequest, DownloadError> {
    let artifact = artifact
        .filter(|artifact| !artifact.download_path.trim().is_empty())
        .ok_or(DownloadError::NoArtifact)?;

    let url = config
        .resolve(artifact.download_path.trim())
        .map_err(|_| DownloadError::InvalidUrl(artifact.download_path.clone()))?;

    Ok(DownloadRequest {
        url,
        file_name: suggested_file_name(&artifact.name),
    })
}

/// Final path component of a server-provided name.
pub fn suggested_file_name(name: &str) -> String {
    match name.rsplit(['/', '\\']).next().map(str::trim) {
        Some(base) if !base.is_empty() && base != "." && base != ".." => base.to_string(),
        _ => FALLBACK_FILE_NAME.to_string(),
    }
}

/// Picks `name`, or `stem (n).ext` when that file already exists.
pub fn unique_target(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    let extension = path.extension().map(|e| e.to_string_lossy().to_string());

    (1..)
        .map(|n| match &extension {
            Some(ext) => dir.join(format!("{stem} ({n}).{ext}")),
            None => dir.join(format!("{stem} ({n})")),
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

pub fn save_artifact(
    backend: &dyn ConversionBackend,
    request: &DownloadRequest,
    dir: &Path,
) -> Result<PathBuf, DownloadError> {
    let bytes = backend.fetch(&request.url).map_err(|err| {
        log::error!("Download error: {err:?}");
        err
    })?;

    std::fs::create_dir_all(dir).map_err(|err| DownloadError::Io(err.to_string()))?;
    let target = unique_target(dir, &request.file_name);
    std::fs::write(&target, &bytes).map_err(|err| DownloadError::Io(err.to_string()))?;

    log::info!("Saved {} bytes to {}", bytes.len(), target.display());
    Ok(target)
}

pub fn start_download(
    backend: Arc<dyn ConversionBackend>,
    request: DownloadRequest,
    dir: PathBuf,
    tx: Sender<Result<PathBuf, DownloadError>>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let result = save_artifact(backend.as_ref(), &request, &dir);
        if tx.send(result).is_err() {
            log::warn!("Download finished after its receiver was dropped");
        }
    })
}
