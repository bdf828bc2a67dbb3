use std::fmt;

use serde::Serialize;

/// Email and password for `POST /auth/signin`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Account creation from an invitation, `POST /auth/signup`.
#[derive(Clone, Serialize)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Invitation token from the invite link.
    pub token: String,
}

/// New organization plus its first admin, `POST /auth/register-organization`.
#[derive(Clone, Serialize)]
pub struct OrganizationForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub organization: String,
}

const REDACTED: &str = "<redacted>";

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .field("token", &REDACTED)
            .finish()
    }
}

impl fmt::Debug for OrganizationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrganizationForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &REDACTED)
            .field("organization", &self.organization)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_wire_format() {
        let value = serde_json::to_value(Credentials::new("a@b.com", "x")).unwrap();
        assert_eq!(value, serde_json::json!({"email": "a@b.com", "password": "x"}));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let creds = Credentials::new("a@b.com", "hunter2");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("a@b.com"));
        assert!(!debug.contains("hunter2"));

        let form = SignUpForm {
            name: "Ada".to_string(),
            email: "a@b.com".to_string(),
            password: "hunter2".to_string(),
            token: "invite-123".to_string(),
        };
        let debug = format!("{:?}", form);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("invite-123"));
    }
}
