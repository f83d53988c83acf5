//! HTTP side of a conversion: the backend contract and its blocking client.

use std::time::Duration;

use bytes::Bytes;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::config::BackendConfig;
use crate::download::DownloadError;
use crate::models::ConvertSuccess;
use crate::submission::SubmissionPayload;

/// Why `/api/convert` did not yield a converted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendFailure {
    /// Non-2xx status. `message` is the `error` field, when the body had one.
    Rejected { status: u16, message: Option<String> },
    /// 2xx status but the body was not a result descriptor.
    Malformed { status: u16 },
    /// The request never got a response (unreachable host, reset, file unreadable).
    Transport(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// The `error` field of a failure body, if the body is JSON and has one.
pub fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
}

/// Splits a `/api/convert` reply into the success payload or a failure.
pub fn parse_convert_response(status: StatusCode, body: &[u8]) -> Result<ConvertSuccess, BackendFailure> {
    if status.is_success() {
        return serde_json::from_slice::<ConvertSuccess>(body).map_err(|err| {
            log::error!("Unreadable conversion result ({status}): {err}");
            BackendFailure::Malformed {
                status: status.as_u16(),
            }
        });
    }

    let message = error_message(body);
    log::error!("Server returned error {status}: {message:?}");

    Err(BackendFailure::Rejected {
        status: status.as_u16(),
        message,
    })
}

/// Everything the orchestrator and download trigger need from the backend.
pub trait ConversionBackend: Send + Sync {
    fn convert(&self, payload: SubmissionPayload) -> Result<ConvertSuccess, BackendFailure>;

    fn fetch(&self, url: &Url) -> Result<Bytes, DownloadError>;
}

pub struct BackendClient {
    http: Client,
    config: BackendConfig,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            // no overall deadline on a conversion
            .timeout(None)
            .build()?;
        Ok(Self { http, config })
    }
}

impl ConversionBackend for BackendClient {
    fn convert(&self, payload: SubmissionPayload) -> Result<ConvertSuccess, BackendFailure> {
        let format = payload.format;
        let form = payload
            .into_form()
            .map_err(|err| BackendFailure::Transport(format!("could not read input file: {err}")))?;
        let endpoint = self.config.endpoint(&["api", "convert"]);

        log::info!("Sending conversion request for format: {}", format.as_str());
        let response = self
            .http
            .post(endpoint)
            .multipart(form)
            .send()
            .map_err(|err| {
                log::error!("Conversion request failed: {err}");
                BackendFailure::Transport(err.to_string())
            })?;

        let status = response.status();
        let body = response.bytes().map_err(|err| {
            log::error!("Failed to read conversion response: {err}");
            BackendFailure::Transport(err.to_string())
        })?;

        parse_convert_response(status, &body)
    }

    fn fetch(&self, url: &Url) -> Result<Bytes, DownloadError> {
        log::info!("Attempting to download from: {url}");
        let response = self
            .http
            .get(url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| DownloadError::Transport(err.to_string()))?;

        response
            .bytes()
            .map_err(|err| DownloadError::Transport(err.to_string()))
    }
}
