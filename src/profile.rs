//! Profile record and credential types.
//!
//! `UserData` is both the registration input and the persisted document. Its
//! field order is the wire order (`email, username, name, surname, password,
//! role`) and absent optional fields are left out of the body entirely.

use serde::{Deserialize, Serialize};

/// Role tag stored on ordinary user profiles.
pub const ROLE_USER: &str = "user";
/// Role tag stored on admin profiles.
pub const ROLE_ADMIN: &str = "admin";

/// Email/password pair sent to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

/// Per-user profile record.
///
/// The password is persisted in plaintext alongside the profile; existing
/// records in the store already carry it and readers expect the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    pub password: String,
    pub role: String,
}

impl UserData {
    /// Create a profile with only the required fields.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            username: None,
            name: None,
            surname: None,
            password: password.into(),
            role: role.into(),
        }
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_surname(mut self, surname: impl Into<String>) -> Self {
        self.surname = Some(surname.into());
        self
    }

    /// Credentials used for the identity-provider half of registration.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.email.clone(), self.password.clone())
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
