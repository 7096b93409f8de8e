//! Driven port for loading stored credentials by username.
//!
//! The credential backend verifies that a login name exists and yields its
//! stored password hash. Any authority data it carries is informational only;
//! permissions come from [`super::AuthorityPolicy`].

use std::collections::BTreeSet;
use std::fmt;

use async_trait::async_trait;
use zeroize::Zeroizing;

use super::define_port_error;
use crate::domain::Authority;

/// Credential record as held by the credential backend.
///
/// `Debug` output never includes the password hash.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// Login name as stored by the backend.
    pub username: String,
    /// Opaque password hash.
    pub password_hash: Zeroizing<String>,
    /// Authorities the backend itself associates with the user.
    pub authorities: BTreeSet<Authority>,
}

impl fmt::Debug for StoredCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredCredential")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("authorities", &self.authorities)
            .finish()
    }
}

define_port_error! {
    /// Errors raised while loading stored credentials.
    pub enum CredentialStoreError {
        /// No credential exists for the requested user.
        UserNotFound { username: String } =>
            "no credentials stored for user {username}",
        /// The backend could not be reached.
        Unavailable { message: String } =>
            "credential store unavailable: {message}",
    }
}

/// Port for loading a user's stored credential.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Load the credential registered for `username`.
    async fn load_user_by_username(
        &self,
        username: &str,
    ) -> Result<StoredCredential, CredentialStoreError>;
}

/// Fixture store knowing a single `admin` user.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCredentialStore;

#[async_trait]
impl CredentialStore for FixtureCredentialStore {
    async fn load_user_by_username(
        &self,
        username: &str,
    ) -> Result<StoredCredential, CredentialStoreError> {
        if username == "admin" {
            Ok(StoredCredential {
                username: "admin".to_owned(),
                password_hash: Zeroizing::new("{noop}password".to_owned()),
                authorities: BTreeSet::from([Authority::from("ROLE_ADMIN")]),
            })
        } else {
            Err(CredentialStoreError::user_not_found(username))
        }
    }
}
