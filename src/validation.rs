use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::config::ConversionPolicy;
use crate::models::{ConversionInput, SelectedFile};

pub const EMPTY_INPUT: &str = "Please upload a file or enter a URL";
pub const INVALID_URL: &str = "Please enter a valid YouTube, SoundCloud, or Spotify URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", EMPTY_INPUT)]
    EmptyInput,

    #[error("{}", INVALID_URL)]
    InvalidUrl,
}

/// Syntactic allow-list check for source URLs. Never touches the network.
#[derive(Debug, Clone)]
pub struct Validator {
    accepted_source: Option<Regex>,
}

impl Validator {
    pub fn new(policy: &ConversionPolicy) -> Self {
        if policy.accepted_hosts.is_empty() {
            return Self {
                accepted_source: None,
            };
        }
        let hosts = policy
            .accepted_hosts
            .iter()
            .map(|host| regex::escape(host))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"^(https?://)?(www\.)?({hosts})");
        // Without a usable pattern every URL is rejected.
        let accepted_source = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| log::error!("Invalid accepted-host pattern {pattern:?}: {err}"))
            .ok();

        Self { accepted_source }
    }

    pub fn validate(&self, input: Option<&ConversionInput>) -> Result<(), ValidationError> {
        match input {
            None => Err(ValidationError::EmptyInput),
            Some(ConversionInput::Url(url)) if url.trim().is_empty() => {
                Err(ValidationError::EmptyInput)
            }
            Some(ConversionInput::Url(url)) => {
                if self.accepts_url(url) {
                    Ok(())
                } else {
                    Err(ValidationError::InvalidUrl)
                }
            }
            Some(ConversionInput::File(file)) => {
                if !is_media_file(file) {
                    log::warn!(
                        "File might not be a valid audio/video file: {} ({})",
                        file.name,
                        if file.mime_type.is_empty() {
                            "unknown type"
                        } else {
                            file.mime_type.as_str()
                        }
                    );
                }
                Ok(())
            }
        }
    }

    pub fn accepts_url(&self, url: &str) -> bool {
        self.accepted_source
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(url.trim()))
    }
}

pub fn is_media_file(file: &SelectedFile) -> bool {
    file.mime_type.starts_with("audio/") || file.mime_type.starts_with("video/")
}
