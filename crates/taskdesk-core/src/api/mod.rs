//! REST API client module for the TaskDesk dashboards.
//!
//! This module provides the `ApiClient` for fetching task statistics,
//! tasks, users and invitations, and for the admin, manager and member
//! mutations. Requests are authenticated by the underlying `SessionClient`.

pub mod client;
pub mod demo;
pub mod error;

pub use client::ApiClient;
pub use demo::Fetched;
pub use error::ApiError;
