//! The session client: bearer attachment, refresh-once-and-retry, and
//! session persistence.
//!
//! Every outbound call to the TaskDesk API goes through
//! [`SessionClient::request`]. A 401 answer is recovered from exactly once by
//! refreshing the access token; a second 401, or a rejected refresh, ends the
//! session with [`SessionError::SessionExpired`].

pub mod error;
pub mod pending;
pub mod session_client;

pub use error::SessionError;
pub use pending::PendingRequest;
pub use session_client::{SessionClient, SessionStatus, SESSION_KEY};
