use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Failures surfaced by the REST layer. Backend rejections keep the decoded
/// message so the console can show what the server actually said.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("authentication failed: {0}")]
    Unauthorized(String),
    #[error("access denied: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request rejected: {0}")]
    BadRequest(String),
    #[error("backend returned status {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid response payload: {0}")]
    Decode(String),
}

impl ApiError {
    pub(crate) fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(message),
            StatusCode::FORBIDDEN => ApiError::Forbidden(message),
            StatusCode::NOT_FOUND => ApiError::NotFound(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                ApiError::BadRequest(message)
            }
            other => ApiError::Backend { status: other.as_u16(), message },
        }
    }

    pub(crate) fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

pub(crate) fn extract_error_message(payload: &Value) -> String {
    if let Some(text) = payload.get("message").and_then(Value::as_str) {
        return text.to_string();
    }

    if let Some(detail) = payload.get("detail") {
        if let Some(text) = detail.as_str() {
            return text.to_string();
        }
        if let Some(items) = detail.as_array() {
            let joined = items
                .iter()
                .filter_map(|item| {
                    item.get("msg")
                        .and_then(Value::as_str)
                        .or_else(|| item.get("message").and_then(Value::as_str))
                })
                .collect::<Vec<_>>()
                .join("; ");
            if !joined.is_empty() {
                return joined;
            }
        }
    }

    payload.get("error").and_then(Value::as_str).unwrap_or("unknown_error").to_string()
}
