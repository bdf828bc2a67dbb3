//! HTTP request/response values and the transport seam.
//!
//! Outgoing calls are described by an immutable [`Request`] and answered by
//! a [`Response`]. The [`Transport`] trait is the only place bytes hit the
//! network; [`ReqwestTransport`] is the production implementation.

pub mod request;
pub mod response;
pub mod transport;

pub use request::Request;
pub use response::Response;
pub use transport::{ReqwestTransport, Transport, TransportError};

pub use reqwest::{header, Method, StatusCode};
