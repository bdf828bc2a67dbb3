//! Session model, sign-in forms and session storage.
//!
//! This module provides:
//! - `Session`: the signed-in identity plus its access token
//! - `Credentials`, `SignUpForm`, `OrganizationForm`: bodies for the auth endpoints
//! - `SessionStore`: persistence backends (file, OS keychain, memory)

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::{Credentials, OrganizationForm, SignUpForm};
pub use session::{Identity, Role, Session};
pub use store::{FileSessionStore, KeyringSessionStore, MemorySessionStore, SessionStore};
