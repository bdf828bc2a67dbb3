use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::auth::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.email)
    }
}

/// A pending or accepted invitation to join the organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: Option<String>,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Invite {
    pub fn status_display(&self) -> &str {
        self.status.as_deref().unwrap_or("Pending")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteRequest {
    pub email: String,
    pub role: Role,
}

impl InviteRequest {
    /// New invitations default to the Member role.
    pub fn member(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role: Role::Member,
        }
    }

    /// Reject addresses that are obviously not email addresses before they
    /// reach the server.
    pub fn validate(&self) -> Result<(), ApiError> {
        if is_valid_email(&self.email) {
            Ok(())
        } else {
            Err(ApiError::BadRequest(format!("'{}' is not a valid email address", self.email)))
        }
    }
}

/// `local@domain.tld`: one `@`, no whitespace, and a dot inside the domain.
fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleChange {
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users() {
        let json = r#"[{"_id": "u1", "name": "Ada", "email": "ada@b.com", "role": "Admin"},
                       {"id": "u2", "email": "bob@b.com", "role": "Member"}]"#;
        let users: Vec<User> = serde_json::from_str(json).unwrap();
        assert_eq!(users[0].display_name(), "Ada");
        assert_eq!(users[1].id, "u2");
        assert_eq!(users[1].display_name(), "bob@b.com");
    }

    #[test]
    fn test_invite_email_validation() {
        for email in ["new@b.com", "first.last@mail.example.org", "a@b.c"] {
            assert!(InviteRequest::member(email).validate().is_ok(), "{}", email);
        }
        for email in ["", "new", "new@", "@b.com", "new@b", "new@.com", "new@b.", "a b@c.com", "a@b@c.com"] {
            let err = InviteRequest::member(email).validate().unwrap_err();
            assert!(matches!(err, ApiError::BadRequest(_)), "{}", email);
        }
    }

    #[test]
    fn test_invite_request_wire_format() {
        let value = serde_json::to_value(InviteRequest::member("new@b.com")).unwrap();
        assert_eq!(value, serde_json::json!({"email": "new@b.com", "role": "Member"}));
    }

    #[test]
    fn test_invite_status_default() {
        let invite: Invite = serde_json::from_str(r#"{"email": "x@b.com", "role": "Manager"}"#).unwrap();
        assert_eq!(invite.status_display(), "Pending");
        assert_eq!(invite.role, Role::Manager);
    }
}
