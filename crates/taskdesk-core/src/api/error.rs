use reqwest::StatusCode;
use thiserror::Error;

use crate::client::SessionError;
use crate::http::Response;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        let total = body.chars().count();
        if total <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let head: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total chars)", head, total)
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            400 | 409 | 422 => ApiError::BadRequest(truncated),
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            429 => ApiError::RateLimited,
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// Map a non-success response, preferring the server's `message` field.
    pub fn from_response(response: &Response) -> Self {
        let detail = response.server_message().unwrap_or_else(|| response.text());
        Self::from_status(response.status(), &detail)
    }

    /// True when the user has to sign in again before retrying.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, ApiError::Session(e) if e.requires_sign_in())
    }

    /// Whether demo mode may stand in for this failure. Sign-in problems and
    /// bodies the server did send but we could not read are always reported.
    pub fn allows_demo_data(&self) -> bool {
        !self.requires_sign_in() && !matches!(self, ApiError::InvalidResponse(_))
    }
}
