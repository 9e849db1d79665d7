//! Sign-in state and role gating.
//!
//! The session is a tagged state: signed out, a user who generates codes,
//! or an administrator who scans and manages records. The admin tab only
//! exists inside the admin state, so "records tab while signed out" is
//! unrepresentable rather than conditionally hidden.
//!
//! Authentication is a hardcoded demo credential check, a placeholder and
//! not a security boundary. Do not ship it as one.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::store::{StateBackend, SESSION_KEY};

/// Demo credential pair for the user role.
pub const DEMO_USER: (&str, &str) = ("user", "user123");

/// Demo credential pair for the admin role.
pub const DEMO_ADMIN: (&str, &str) = ("admin", "admin123");

/// Errors produced by sign-in and role gating.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Required sign-in fields were left empty.
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields {
        /// Names of the empty fields.
        fields: Vec<&'static str>,
    },

    /// Username/password did not match the demo pair for the role.
    #[error("invalid credentials; demo pairs are user/user123 and admin/admin123")]
    InvalidCredentials,

    /// The operation needs a signed-in session.
    #[error("not signed in; run `amicus login` first")]
    SignedOut,

    /// The operation needs the admin role.
    #[error("administrator role required")]
    AdminRequired,
}

/// Selectable role at sign-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Generates QR codes for check-in.
    User,
    /// Scans codes and manages records.
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// Tab selection inside the admin view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminTab {
    /// The live scanner.
    #[default]
    Scanner,
    /// The record list.
    Records,
}

/// Profile captured at sign-in for the user role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// Account name used to sign in.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Course or department label.
    pub course: String,
}

/// Profile and view state for the admin role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    /// Account name used to sign in.
    pub username: String,
    /// Display name.
    pub full_name: String,
    /// Course or department label.
    pub course: String,
    /// Currently selected admin tab.
    #[serde(default)]
    pub tab: AdminTab,
}

/// The sign-in state machine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Session {
    /// Nobody is signed in.
    #[default]
    SignedOut,
    /// A user who generates codes.
    User(UserSession),
    /// An administrator who scans and manages records.
    Admin(AdminSession),
}

impl Session {
    /// Attempt a sign-in with the demo credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingFields`] naming every empty field, or
    /// [`AuthError::InvalidCredentials`] (listing the demo pairs in its
    /// message) when the pair does not match the selected role.
    pub fn login(
        role: Role,
        username: &str,
        password: &str,
        full_name: &str,
        course: &str,
    ) -> Result<Self, AuthError> {
        let mut missing = Vec::new();
        for (field, value) in [
            ("username", username),
            ("password", password),
            ("full name", full_name),
            ("course", course),
        ] {
            if value.trim().is_empty() {
                missing.push(field);
            }
        }
        if !missing.is_empty() {
            return Err(AuthError::MissingFields { fields: missing });
        }

        let expected = match role {
            Role::User => DEMO_USER,
            Role::Admin => DEMO_ADMIN,
        };
        if (username, password) != expected {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(match role {
            Role::User => Self::User(UserSession {
                username: username.to_string(),
                full_name: full_name.to_string(),
                course: course.to_string(),
            }),
            Role::Admin => Self::Admin(AdminSession {
                username: username.to_string(),
                full_name: full_name.to_string(),
                course: course.to_string(),
                tab: AdminTab::default(),
            }),
        })
    }

    /// The role of the signed-in session, if any.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        match self {
            Self::SignedOut => None,
            Self::User(_) => Some(Role::User),
            Self::Admin(_) => Some(Role::Admin),
        }
    }

    /// Require any signed-in session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignedOut`] when nobody is signed in.
    pub fn require_signed_in(&self) -> Result<(), AuthError> {
        match self {
            Self::SignedOut => Err(AuthError::SignedOut),
            Self::User(_) | Self::Admin(_) => Ok(()),
        }
    }

    /// Require the admin role.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignedOut`] or [`AuthError::AdminRequired`].
    pub fn require_admin(&self) -> Result<&AdminSession, AuthError> {
        match self {
            Self::SignedOut => Err(AuthError::SignedOut),
            Self::User(_) => Err(AuthError::AdminRequired),
            Self::Admin(admin) => Ok(admin),
        }
    }

    /// Switch the admin tab.
    ///
    /// # Errors
    ///
    /// Returns an error unless an admin is signed in.
    pub fn select_tab(&mut self, tab: AdminTab) -> Result<(), AuthError> {
        match self {
            Self::SignedOut => Err(AuthError::SignedOut),
            Self::User(_) => Err(AuthError::AdminRequired),
            Self::Admin(admin) => {
                admin.tab = tab;
                Ok(())
            }
        }
    }

    /// Rehydrate the session from its backend slot.
    ///
    /// Missing or malformed state degrades to signed-out with a logged
    /// diagnostic; it never fails startup.
    #[must_use]
    pub fn load(backend: &dyn StateBackend) -> Self {
        match backend.get(SESSION_KEY) {
            Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                warn!(error = %e, "Persisted session is malformed, signing out");
                Self::SignedOut
            }),
            Ok(None) => Self::SignedOut,
            Err(e) => {
                warn!(error = %e, "Could not read persisted session, signing out");
                Self::SignedOut
            }
        }
    }

    /// Persist the session to its backend slot.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the backend write fails.
    pub fn save(&self, backend: &dyn StateBackend) -> crate::error::Result<()> {
        let blob = serde_json::to_string(self)?;
        backend.put(SESSION_KEY, &blob)
    }

    /// Clear the persisted session slot (sign out).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend removal fails.
    pub fn clear(backend: &dyn StateBackend) -> crate::error::Result<()> {
        backend.remove(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    #[test]
    fn test_login_user() {
        let session = Session::login(Role::User, "user", "user123", "Ada Lovelace", "CS101")
            .expect("demo user signs in");
        assert_eq!(session.role(), Some(Role::User));
        assert!(session.require_signed_in().is_ok());
        assert_eq!(session.require_admin().unwrap_err(), AuthError::AdminRequired);
    }

    #[test]
    fn test_login_admin() {
        let session = Session::login(Role::Admin, "admin", "admin123", "Grace Hopper", "CS101")
            .expect("demo admin signs in");
        let admin = session.require_admin().unwrap();
        assert_eq!(admin.full_name, "Grace Hopper");
        assert_eq!(admin.tab, AdminTab::Scanner);
    }

    #[test]
    fn test_login_wrong_password() {
        let err = Session::login(Role::User, "user", "hunter2", "Ada", "CS101").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);

        // The failure message lists both demo pairs.
        let msg = err.to_string();
        assert!(msg.contains("user/user123"));
        assert!(msg.contains("admin/admin123"));
    }

    #[test]
    fn test_login_role_credential_mismatch() {
        // Valid user pair against the admin role still fails.
        let err = Session::login(Role::Admin, "user", "user123", "Ada", "CS101").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[test]
    fn test_login_missing_fields_are_named() {
        let err = Session::login(Role::User, "user", "", "", "CS101").unwrap_err();
        match err {
            AuthError::MissingFields { fields } => {
                assert_eq!(fields, vec!["password", "full name"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_signed_out_gating() {
        let session = Session::SignedOut;
        assert_eq!(session.require_signed_in().unwrap_err(), AuthError::SignedOut);
        assert_eq!(session.require_admin().unwrap_err(), AuthError::SignedOut);
        assert_eq!(session.role(), None);
    }

    #[test]
    fn test_select_tab_admin_only() {
        let mut session =
            Session::login(Role::Admin, "admin", "admin123", "Grace", "CS101").unwrap();
        session.select_tab(AdminTab::Records).unwrap();
        assert_eq!(session.require_admin().unwrap().tab, AdminTab::Records);

        let mut user = Session::login(Role::User, "user", "user123", "Ada", "CS101").unwrap();
        assert_eq!(
            user.select_tab(AdminTab::Records).unwrap_err(),
            AuthError::AdminRequired
        );
    }

    #[test]
    fn test_session_round_trip() {
        let backend = MemoryBackend::new();
        let session = Session::login(Role::Admin, "admin", "admin123", "Grace", "CS101").unwrap();

        session.save(&backend).unwrap();
        let loaded = Session::load(&backend);
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_load_missing_slot_is_signed_out() {
        let backend = MemoryBackend::new();
        assert_eq!(Session::load(&backend), Session::SignedOut);
    }

    #[test]
    fn test_load_malformed_slot_is_signed_out() {
        let backend = MemoryBackend::new();
        backend.put(SESSION_KEY, "{broken").unwrap();
        assert_eq!(Session::load(&backend), Session::SignedOut);
    }

    #[test]
    fn test_clear_signs_out() {
        let backend = MemoryBackend::new();
        let session = Session::login(Role::User, "user", "user123", "Ada", "CS101").unwrap();
        session.save(&backend).unwrap();

        Session::clear(&backend).unwrap();
        assert_eq!(Session::load(&backend), Session::SignedOut);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Admin.to_string(), "admin");
    }
}
