use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// A fully-read HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

/// Error bodies from the API look like `{"message": "..."}`.
#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Response with a JSON body and no headers.
    pub fn json_body(status: StatusCode, body: &serde_json::Value) -> Self {
        Self::new(status, HeaderMap::new(), body.to_string().into_bytes())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The server-supplied `message` field, when the body carries one.
    pub fn server_message(&self) -> Option<String> {
        self.json::<ErrorBody>()
            .ok()?
            .message
            .filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message() {
        let response = Response::json_body(
            StatusCode::BAD_REQUEST,
            &serde_json::json!({"message": "Invalid credentials"}),
        );
        assert_eq!(response.server_message().as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_server_message_missing() {
        let plain = Response::new(StatusCode::BAD_GATEWAY, HeaderMap::new(), b"<html>".to_vec());
        assert_eq!(plain.server_message(), None);

        let blank = Response::json_body(StatusCode::BAD_REQUEST, &serde_json::json!({"message": " "}));
        assert_eq!(blank.server_message(), None);
    }
}
