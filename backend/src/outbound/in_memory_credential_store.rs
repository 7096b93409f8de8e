//! Credential store backed by an in-memory user table.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use zeroize::Zeroizing;

use crate::domain::Authority;
use crate::domain::ports::{CredentialStore, CredentialStoreError, StoredCredential};

/// In-memory [`CredentialStore`] keyed by exact username.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialStore {
    users: HashMap<String, StoredCredential>,
}

impl InMemoryCredentialStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a user.
    ///
    /// ```
    /// use restaurant_backend::outbound::InMemoryCredentialStore;
    ///
    /// let store = InMemoryCredentialStore::new()
    ///     .with_user("waiter", "{noop}waiter", ["ROLE_USER"]);
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn with_user<I, A>(
        mut self,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        authorities: I,
    ) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Authority>,
    {
        let username = username.into();
        let credential = StoredCredential {
            username: username.clone(),
            password_hash: Zeroizing::new(password_hash.into()),
            authorities: authorities.into_iter().map(Into::into).collect::<BTreeSet<_>>(),
        };
        self.users.insert(username, credential);
        self
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no user is registered.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn load_user_by_username(
        &self,
        username: &str,
    ) -> Result<StoredCredential, CredentialStoreError> {
        self.users
            .get(username)
            .cloned()
            .ok_or_else(|| CredentialStoreError::user_not_found(username))
    }
}
