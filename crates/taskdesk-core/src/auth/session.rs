use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Dashboard role assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Manager,
    Member,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Member];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Member => "Member",
        }
    }

    /// Parse a role name, ignoring case. Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl From<String> for Role {
    /// Unknown roles fall back to `Member`, the least privileged dashboard.
    fn from(s: String) -> Self {
        Role::parse(&s).unwrap_or_else(|| {
            warn!(role = %s, "Unknown role, treating as Member");
            Role::Member
        })
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Who the session belongs to, as reported by the server at sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "_id", alias = "id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub role: Role,
}

impl Identity {
    pub fn new(role: Role) -> Self {
        Self {
            id: None,
            name: None,
            email: None,
            organization: None,
            role,
        }
    }

    /// Best available label for display: name, then email, then id.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.id.as_deref())
            .unwrap_or("unknown user")
    }
}

/// The signed-in identity together with its current access token.
///
/// Persisted as a single JSON object: the identity fields sit beside
/// `accessToken`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    #[serde(rename = "signedInAt", default = "Utc::now")]
    pub signed_in_at: DateTime<Utc>,
    #[serde(rename = "refreshedAt", default, skip_serializing_if = "Option::is_none")]
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(identity: Identity, access_token: impl Into<String>) -> Self {
        Self {
            identity,
            access_token: access_token.into(),
            signed_in_at: Utc::now(),
            refreshed_at: None,
        }
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// A session is usable only with a non-empty token.
    pub fn is_well_formed(&self) -> bool {
        !self.access_token.trim().is_empty()
    }

    /// Swap in a refreshed access token. The identity is left as is.
    pub fn replace_token(&mut self, access_token: impl Into<String>) {
        self.access_token = access_token.into();
        self.refreshed_at = Some(Utc::now());
    }

    /// Time since the token was last issued (sign-in or refresh).
    pub fn token_age(&self) -> Duration {
        Utc::now() - self.refreshed_at.unwrap_or(self.signed_in_at)
    }
}

// Keep the token out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("access_token", &"<redacted>")
            .field("signed_in_at", &self.signed_in_at)
            .field("refreshed_at", &self.refreshed_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_case_insensitive() {
        assert_eq!(Role::parse("Admin"), Some(Role::Admin));
        assert_eq!(Role::parse("manager"), Some(Role::Manager));
        assert_eq!(Role::parse(" MEMBER "), Some(Role::Member));
        assert_eq!(Role::parse("Owner"), None);
    }

    #[test]
    fn test_unknown_role_reads_as_member() {
        let identity: Identity = serde_json::from_str(r#"{"role": "Guest"}"#).unwrap();
        assert_eq!(identity.role, Role::Member);
    }

    #[test]
    fn test_session_wire_format() {
        let json = r#"{"_id": "u1", "name": "Ada", "role": "Manager", "accessToken": "T1"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.identity.id.as_deref(), Some("u1"));
        assert_eq!(session.role(), Role::Manager);
        assert_eq!(session.access_token, "T1");

        let value = serde_json::to_value(&session).unwrap();
        assert_eq!(value["accessToken"], "T1");
        assert_eq!(value["role"], "Manager");
        assert_eq!(value["_id"], "u1");
        assert!(value.get("identity").is_none());
    }

    #[test]
    fn test_session_requires_token_and_role() {
        assert!(serde_json::from_str::<Session>(r#"{"role": "Admin"}"#).is_err());
        assert!(serde_json::from_str::<Session>(r#"{"accessToken": "T1"}"#).is_err());
    }

    #[test]
    fn test_replace_token_keeps_identity() {
        let mut identity = Identity::new(Role::Admin);
        identity.email = Some("a@b.com".to_string());
        let mut session = Session::new(identity.clone(), "T1");
        assert!(session.refreshed_at.is_none());

        session.replace_token("T2");
        assert_eq!(session.access_token, "T2");
        assert_eq!(session.identity, identity);
        assert!(session.refreshed_at.is_some());
    }

    #[test]
    fn test_well_formed() {
        assert!(Session::new(Identity::new(Role::Member), "T1").is_well_formed());
        assert!(!Session::new(Identity::new(Role::Member), "  ").is_well_formed());
    }

    #[test]
    fn test_debug_redacts_token() {
        let session = Session::new(Identity::new(Role::Member), "secret-token");
        assert!(!format!("{:?}", session).contains("secret-token"));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut identity = Identity::new(Role::Member);
        assert_eq!(identity.display_name(), "unknown user");
        identity.id = Some("u1".to_string());
        assert_eq!(identity.display_name(), "u1");
        identity.email = Some("a@b.com".to_string());
        assert_eq!(identity.display_name(), "a@b.com");
        identity.name = Some("Ada".to_string());
        assert_eq!(identity.display_name(), "Ada");
    }
}
