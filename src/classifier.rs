use url::Url;

use crate::client::BackendFailure;
use crate::config::ConversionPolicy;
use crate::models::ErrorState;

pub const CONVERSION_FAILED: &str = "Conversion failed";
pub const UNREACHABLE_BACKEND: &str = "Failed to connect to the conversion server. Please try again.";
pub const MALFORMED_RESPONSE: &str = "The conversion server returned an unexpected response.";
pub const UNKNOWN_FAILURE: &str = "An unknown error occurred during conversion";
pub const SERVER_MISCONFIGURED: &str =
    "Server configuration issue: FFmpeg not installed. Please contact support.";
pub const URL_NOT_PROCESSED: &str =
    "Could not process this URL. Please try uploading the file directly or use a different URL.";

/// Turns a failed conversion into the message shown to the user.
///
/// `source_url` is `Some` only when the job was submitted as a URL.
pub fn classify(
    source_url: Option<&str>,
    failure: &BackendFailure,
    policy: &ConversionPolicy,
) -> ErrorState {
    let backend_text = match failure {
        BackendFailure::Rejected { message, .. } => message.as_deref().filter(|m| !m.trim().is_empty()),
        BackendFailure::Malformed { .. } | BackendFailure::Transport(_) => None,
    };

    let message = match (failure, backend_text) {
        (_, Some(text)) => remap(text),
        (BackendFailure::Rejected { .. }, None) => CONVERSION_FAILED.to_string(),
        (BackendFailure::Malformed { .. }, None) => MALFORMED_RESPONSE.to_string(),
        (BackendFailure::Transport(_), None) => UNREACHABLE_BACKEND.to_string(),
    };

    let is_source_platform_block = match (source_url, backend_text) {
        (Some(url), Some(text)) => {
            is_video_source(url, policy) && contains_block_marker(text, policy)
        }
        _ => false,
    };

    ErrorState {
        message,
        is_source_platform_block,
    }
}

fn remap(text: &str) -> String {
    let lower = text.to_lowercase();
    if lower.contains("ffmpeg") || lower.contains("command not found") {
        SERVER_MISCONFIGURED.to_string()
    } else if lower.contains("url") && lower.contains("process") {
        URL_NOT_PROCESSED.to_string()
    } else {
        text.to_string()
    }
}

fn contains_block_marker(text: &str, policy: &ConversionPolicy) -> bool {
    let lower = text.to_lowercase();
    policy
        .block_markers
        .iter()
        .any(|marker| !marker.is_empty() && lower.contains(&marker.to_lowercase()))
}

pub fn is_video_source(url: &str, policy: &ConversionPolicy) -> bool {
    source_host(url).is_some_and(|host| policy.is_video_host(&host))
}

/// Host of a user-entered URL, which may omit the scheme.
pub fn source_host(url: &str) -> Option<String> {
    let url = url.trim();
    let parsed = match Url::parse(url) {
        Ok(parsed) if parsed.has_host() => parsed,
        _ => Url::parse(&format!("https://{url}")).ok()?,
    };
    parsed.host_str().map(str::to_ascii_lowercase)
}
