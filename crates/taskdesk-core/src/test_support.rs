//! Scripted transport and fixtures shared by unit tests.

use std::sync::{Arc, Mutex};

use reqwest::StatusCode;

use crate::auth::{Identity, MemorySessionStore, Role, Session, SessionStore};
use crate::client::{SessionClient, SESSION_KEY};
use crate::http::{Request, Response, Transport, TransportError};

type Handler = Box<dyn Fn(&Request) -> Result<Response, TransportError> + Send + Sync>;

/// Transport that answers from a closure and records every request.
///
/// Each send yields to the scheduler once before answering, so concurrent
/// callers interleave the way they would over a real network.
pub(crate) struct MockTransport {
    handler: Handler,
    sent: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub(crate) fn new(
        handler: impl Fn(&Request) -> Result<Response, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Box::new(handler),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn sent(&self) -> Vec<Request> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of requests sent to `path`.
    pub(crate) fn count(&self, path: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path() == path)
            .count()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: &Request) -> Result<Response, TransportError> {
        tokio::task::yield_now().await;
        self.sent.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

pub(crate) fn reply(status: u16, body: serde_json::Value) -> Result<Response, TransportError> {
    Ok(Response::json_body(
        StatusCode::from_u16(status).unwrap(),
        &body,
    ))
}

pub(crate) type TestClient = SessionClient<MockTransport, Arc<MemorySessionStore>>;

pub(crate) fn manager_session(token: &str) -> Session {
    let mut identity = Identity::new(Role::Manager);
    identity.id = Some("u1".to_string());
    identity.email = Some("a@b.com".to_string());
    Session::new(identity, token)
}

/// Client whose store already holds `session` and which has restored it.
pub(crate) fn restored_client(transport: MockTransport, session: &Session) -> (TestClient, Arc<MemorySessionStore>) {
    let store = Arc::new(MemorySessionStore::new());
    store
        .set(SESSION_KEY, &serde_json::to_string(session).unwrap())
        .unwrap();
    let client = SessionClient::new(transport, Arc::clone(&store));
    client.restore();
    (client, store)
}

/// Token currently persisted in `store`, if any.
pub(crate) fn stored_token(store: &MemorySessionStore) -> Option<String> {
    let raw = store.get(SESSION_KEY).unwrap()?;
    let session: Session = serde_json::from_str(&raw).unwrap();
    Some(session.access_token)
}
