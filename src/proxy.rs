//! Forwarding endpoints.
//!
//! `POST /api/convert` and `GET /api/download/{filename}` re-issue the
//! inbound request to the backend and relay what comes back. No state, no
//! retries; a canned failure replaces the reply only when the backend
//! cannot be reached.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use reqwest::multipart::{Form, Part};

use crate::client::error_message;
use crate::config::{BackendConfig, ProxyConfig};
use crate::models::OutputFormat;
use crate::submission::FORMAT_FIELD;

pub const BACKEND_UNREACHABLE: &str = "Failed to connect to conversion backend";
pub const SERVER_ERROR: &str = "Server error";
pub const FILE_NOT_FOUND: &str = "File not found";
pub const DOWNLOAD_FAILED: &str = "Failed to download file";

#[derive(Clone)]
struct ProxyState {
    client: reqwest::Client,
    backend: BackendConfig,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(config: &ProxyConfig) -> Result<Router, reqwest::Error> {
    let state = ProxyState {
        client: reqwest::Client::builder().build()?,
        backend: config.backend.clone(),
    };

    Ok(Router::new()
        .route("/api/convert", post(forward_convert))
        .route("/api/download/{filename}", get(forward_download))
        .layer(DefaultBodyLimit::max(config.upload_limit))
        .with_state(state))
}

async fn forward_convert(
    State(state): State<ProxyState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let mut multipart = multipart.map_err(|rejection| ApiError {
        status: rejection.status(),
        message: rejection.body_text(),
    })?;
    let mut form = Form::new();
    let mut has_format = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::bad_request(err.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|err| ApiError::bad_request(err.body_text()))?;

        has_format |= name == FORMAT_FIELD;
        form = match file_name {
            Some(file_name) => {
                let mut part = Part::bytes(data.to_vec()).file_name(file_name);
                if let Some(content_type) = content_type {
                    part = part
                        .mime_str(&content_type)
                        .map_err(|err| ApiError::bad_request(err.to_string()))?;
                }
                form.part(name, part)
            }
            None => form.text(name, String::from_utf8_lossy(&data).into_owned()),
        };
    }

    if !has_format {
        form = form.text(FORMAT_FIELD, OutputFormat::default().as_str());
    }

    let endpoint = state.backend.endpoint(&["api", "convert"]);
    log::info!("Forwarding conversion request to {endpoint}");
    let response = state
        .client
        .post(endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(|err| {
            log::error!("Error connecting to conversion backend: {err}");
            ApiError::internal(BACKEND_UNREACHABLE)
        })?;

    let status = response.status();
    let content_type = response.headers().get(header::CONTENT_TYPE).cloned();
    let body = response.bytes().await.map_err(|err| {
        log::error!("Error reading conversion backend reply: {err}");
        ApiError::internal(BACKEND_UNREACHABLE)
    })?;

    if !status.is_success() {
        return Err(ApiError {
            status,
            message: error_message(&body).unwrap_or_else(|| SERVER_ERROR.to_string()),
        });
    }

    let mut relayed = (status, body).into_response();
    if let Some(content_type) = content_type {
        relayed.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    Ok(relayed)
}

async fn forward_download(
    State(state): State<ProxyState>,
    Path(filename): Path<String>,
) -> Response {
    let url = state.backend.endpoint(&["api", "download", &filename]);
    log::info!("Forwarding download of {filename:?}");

    let response = match state.client.get(url).send().await {
        Ok(response) => response,
        Err(err) => {
            log::error!("Error downloading file: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, DOWNLOAD_FAILED).into_response();
        }
    };

    if !response.status().is_success() {
        return (StatusCode::NOT_FOUND, FILE_NOT_FOUND).into_response();
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
    let body = match response.bytes().await {
        Ok(body) => body,
        Err(err) => {
            log::error!("Error downloading file: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, DOWNLOAD_FAILED).into_response();
        }
    };

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, attachment(&filename)),
        ],
        body,
    )
        .into_response()
}

/// `attachment; filename="..."` with quotes escaped and control characters dropped.
fn attachment(filename: &str) -> HeaderValue {
    let escaped: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .flat_map(|c| match c {
            '"' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();

    HeaderValue::from_str(&format!("attachment; filename=\"{escaped}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
