use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Url};
use thiserror::Error;
use tracing::debug;

use super::{Request, Response};

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Could not connect: {0}")]
    Connect(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Request(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

/// Sends a [`Request`] and reads the whole [`Response`].
///
/// Non-2xx statuses are responses, not errors; only failures to complete the
/// exchange at all are reported as [`TransportError`].
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request) -> impl Future<Output = Result<Response, TransportError>> + Send;
}

/// Transport backed by a shared `reqwest::Client`.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Create a transport rooted at `base_url`. The client keeps a cookie
    /// store so the server-set refresh cookie is sent back on refresh.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `path` against the base URL. Absolute URLs must share the
    /// base URL's origin.
    fn url(&self, path: &str) -> Result<String, TransportError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            let target = Url::parse(path)
                .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", path, e)))?;
            let base = Url::parse(&self.base_url)
                .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", self.base_url, e)))?;
            if target.origin() != base.origin() {
                return Err(TransportError::InvalidRequest(format!(
                    "{} is not on the API host {}",
                    path, self.base_url
                )));
            }
            return Ok(path.to_string());
        }
        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let url = self.url(request.path())?;
        debug!(method = %request.method(), url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method().clone(), &url)
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        debug!(url = %url, status = status.as_u16(), bytes = body.len(), "Response received");
        Ok(Response::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let transport = ReqwestTransport::new("http://localhost:5000/").unwrap();
        assert_eq!(transport.url("/task/tasks").unwrap(), "http://localhost:5000/task/tasks");
        assert_eq!(transport.url("user/fetch").unwrap(), "http://localhost:5000/user/fetch");
        assert_eq!(transport.url("//other.example.com/x").unwrap(), "http://localhost:5000/other.example.com/x");

        let transport = ReqwestTransport::new("https://api.example.com/v1").unwrap();
        assert_eq!(transport.url("/auth/signin").unwrap(), "https://api.example.com/v1/auth/signin");
    }

    #[test]
    fn test_absolute_url_on_api_host_is_allowed() {
        let transport = ReqwestTransport::new("http://localhost:5000").unwrap();
        assert_eq!(
            transport.url("http://localhost:5000/api/users/1").unwrap(),
            "http://localhost:5000/api/users/1"
        );
    }

    #[test]
    fn test_absolute_url_on_other_host_is_rejected() {
        let transport = ReqwestTransport::new("http://localhost:5000").unwrap();
        for url in [
            "https://other.example.com/api/users/1",
            "https://localhost:5000/api/users/1",
            "http://localhost:5001/api/users/1",
        ] {
            assert!(matches!(transport.url(url), Err(TransportError::InvalidRequest(_))), "{}", url);
        }
    }

    #[tokio::test]
    async fn test_send_to_other_host_fails_before_connecting() {
        let transport = ReqwestTransport::new("http://localhost:5000").unwrap();
        let request = Request::get("https://other.example.com/steal")
            .authorized(Some("T1"))
            .unwrap();
        let err = transport.send(&request).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }
}
