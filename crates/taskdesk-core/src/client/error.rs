use thiserror::Error;

use crate::http::TransportError;

#[derive(Error, Debug)]
pub enum SessionError {
    /// Sign-in, sign-up or organization registration was rejected.
    #[error("{0}")]
    Authentication(String),

    /// The session could not be refreshed and has been cleared.
    #[error("Session expired - please sign in again")]
    SessionExpired,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

impl SessionError {
    /// True when the user has to go through sign-in again.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            SessionError::SessionExpired | SessionError::Authentication(_)
        )
    }
}

impl From<reqwest::header::InvalidHeaderValue> for SessionError {
    fn from(err: reqwest::header::InvalidHeaderValue) -> Self {
        SessionError::Transport(TransportError::InvalidRequest(format!(
            "access token is not a valid header value: {}",
            err
        )))
    }
}
