use reqwest::header::InvalidHeaderValue;

use crate::http::Request;

/// Original send plus one retry after a refresh.
const MAX_ATTEMPTS: u8 = 2;

/// A caller's request travelling through the refresh protocol.
///
/// Holds the caller's descriptor untouched and counts attempts, so a request
/// is resent at most once no matter how many 401s come back.
#[derive(Debug)]
pub struct PendingRequest {
    request: Request,
    attempts: u8,
}

impl PendingRequest {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            attempts: 0,
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Whether the request has already been resent once.
    pub fn retried(&self) -> bool {
        self.attempts >= MAX_ATTEMPTS
    }

    /// Sends made so far.
    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    /// Build the next outgoing copy with `token` as its bearer credential.
    /// Returns `None` once the attempt budget is spent.
    pub fn next_attempt(&mut self, token: Option<&str>) -> Option<Result<Request, InvalidHeaderValue>> {
        if self.attempts >= MAX_ATTEMPTS {
            return None;
        }
        self.attempts += 1;
        Some(self.request.authorized(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_most_two_attempts() {
        let mut pending = PendingRequest::new(Request::get("/task/tasks"));
        assert!(!pending.retried());

        let first = pending.next_attempt(Some("T1")).unwrap().unwrap();
        assert_eq!(first.bearer_token(), Some("T1"));
        assert!(!pending.retried());

        let second = pending.next_attempt(Some("T2")).unwrap().unwrap();
        assert_eq!(second.bearer_token(), Some("T2"));
        assert!(pending.retried());

        assert!(pending.next_attempt(Some("T3")).is_none());
        assert_eq!(pending.attempts(), 2);
    }

    #[test]
    fn test_original_descriptor_unchanged() {
        let mut pending = PendingRequest::new(Request::get("/task/get"));
        let _ = pending.next_attempt(Some("T1"));
        assert_eq!(pending.request().bearer_token(), None);
    }
}
