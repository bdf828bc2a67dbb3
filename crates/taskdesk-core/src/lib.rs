//! Core library for the TaskDesk client.
//!
//! The centre of this crate is [`SessionClient`], which owns the signed-in
//! session, attaches the bearer token to every outgoing call and recovers
//! from an expired access token with a single refresh and retry.
//!
//! - `auth`: session model and the session storage backends
//! - `http`: request/response values and the transport seam
//! - `client`: the session client and its error taxonomy
//! - `api`: typed dashboard endpoints layered on the session client
//! - `models`: tasks, users, invitations and task statistics
//! - `config`: application configuration

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod http;
pub mod models;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{ApiClient, ApiError, Fetched};
pub use auth::{Credentials, Identity, Role, Session};
pub use client::{SessionClient, SessionError, SessionStatus};
pub use config::Config;
pub use http::{Request, Response, Transport, TransportError};
