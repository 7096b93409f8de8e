//! Authentication combining a credential store with an authority policy.
//!
//! The authority policy is consulted first and is the only source of granted
//! authorities. The credential store then proves the user exists and yields
//! the stored password hash. Whatever authorities the store carries are
//! discarded.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{AuthorityPolicy, CredentialStore};
use crate::domain::{AuthenticationError, UserIdentity};

/// Domain service resolving a username into a [`UserIdentity`].
#[derive(Clone)]
pub struct AuthorityResolvingAuthenticator {
    credential_store: Arc<dyn CredentialStore>,
    authority_policy: Arc<dyn AuthorityPolicy>,
}

impl AuthorityResolvingAuthenticator {
    /// Create an authenticator over the given backends.
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        authority_policy: Arc<dyn AuthorityPolicy>,
    ) -> Self {
        Self {
            credential_store,
            authority_policy,
        }
    }

    /// Resolve `username` into an identity carrying policy authorities.
    ///
    /// A policy failure short-circuits before the credential store is
    /// touched. Both failure kinds render as the same opaque message.
    ///
    /// # Examples
    /// ```rust,ignore
    /// let authenticator = AuthorityResolvingAuthenticator::new(
    ///     Arc::new(FixtureCredentialStore),
    ///     Arc::new(FixtureAuthorityPolicy),
    /// );
    /// let identity = authenticator.authenticate("admin").await?;
    /// assert!(identity.has_authority("Chief"));
    /// ```
    pub async fn authenticate(&self, username: &str) -> Result<UserIdentity, AuthenticationError> {
        let authorities = self
            .authority_policy
            .authorities_for(username)
            .await
            .map_err(|error| {
                warn!(username, error = %error, "authority lookup failed");
                AuthenticationError::authority_lookup_failed(error)
            })?;

        let credential = self
            .credential_store
            .load_user_by_username(username)
            .await
            .map_err(|error| {
                warn!(username, error = %error, "credential lookup failed");
                AuthenticationError::authentication_failed(error)
            })?;

        Ok(UserIdentity::new(
            credential.username,
            credential.password_hash.as_str(),
            authorities,
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::collections::BTreeSet;
    use std::error::Error as _;

    use rstest::rstest;
    use zeroize::Zeroizing;

    use super::*;
    use crate::domain::ports::{
        AuthorityPolicyError, CredentialStoreError, FixtureAuthorityPolicy,
        FixtureCredentialStore, MockAuthorityPolicy, MockCredentialStore, StoredCredential,
    };
    use crate::domain::{Authority, AuthenticationErrorKind};

    fn stored(username: &str, authorities: &[&str]) -> StoredCredential {
        StoredCredential {
            username: username.to_owned(),
            password_hash: Zeroizing::new("{noop}secret".to_owned()),
            authorities: authorities.iter().copied().map(Authority::from).collect(),
        }
    }

    fn authorities(values: &[&str]) -> BTreeSet<Authority> {
        values.iter().copied().map(Authority::from).collect()
    }

    #[tokio::test]
    async fn policy_authorities_replace_store_authorities() {
        let mut store = MockCredentialStore::new();
        store
            .expect_load_user_by_username()
            .withf(|username| username == "waiter")
            .times(1)
            .return_once(|_| Ok(stored("waiter", &["ROLE_USER"])));
        let mut policy = MockAuthorityPolicy::new();
        policy
            .expect_authorities_for()
            .withf(|username| username == "waiter")
            .times(1)
            .return_once(|_| Ok(authorities(&["Waiter", "Barkeeper"])));
        let authenticator = AuthorityResolvingAuthenticator::new(Arc::new(store), Arc::new(policy));

        let identity = authenticator
            .authenticate("waiter")
            .await
            .expect("authentication succeeds");

        assert_eq!(identity.username(), "waiter");
        assert_eq!(identity.password_hash(), "{noop}secret");
        assert_eq!(identity.authorities(), &authorities(&["Barkeeper", "Waiter"]));
        assert!(!identity.has_authority("ROLE_USER"));
    }

    #[rstest]
    #[case(AuthorityPolicyError::unknown_user("ghost"))]
    #[case(AuthorityPolicyError::unknown_group("Kitchen"))]
    #[case(AuthorityPolicyError::unavailable("policy file unreadable"))]
    #[tokio::test]
    async fn policy_failure_skips_credential_store(#[case] failure: AuthorityPolicyError) {
        let mut store = MockCredentialStore::new();
        store.expect_load_user_by_username().times(0);
        let mut policy = MockAuthorityPolicy::new();
        let expected = failure.clone();
        policy
            .expect_authorities_for()
            .times(1)
            .return_once(move |_| Err(failure));
        let authenticator = AuthorityResolvingAuthenticator::new(Arc::new(store), Arc::new(policy));

        let error = authenticator
            .authenticate("ghost")
            .await
            .expect_err("authentication fails");

        assert_eq!(error.kind(), AuthenticationErrorKind::AuthorityLookupFailed);
        assert_eq!(error.to_string(), "authentication failed");
        let cause = error
            .source()
            .and_then(|source| source.downcast_ref::<AuthorityPolicyError>())
            .expect("policy error kept as source");
        assert_eq!(cause, &expected);
    }

    #[rstest]
    #[case(CredentialStoreError::user_not_found("cook"))]
    #[case(CredentialStoreError::unavailable("connection refused"))]
    #[tokio::test]
    async fn store_failure_reports_authentication_failed(#[case] failure: CredentialStoreError) {
        let mut store = MockCredentialStore::new();
        store
            .expect_load_user_by_username()
            .times(1)
            .return_once(move |_| Err(failure));
        let mut policy = MockAuthorityPolicy::new();
        policy
            .expect_authorities_for()
            .times(1)
            .return_once(|_| Ok(authorities(&["Cook"])));
        let authenticator = AuthorityResolvingAuthenticator::new(Arc::new(store), Arc::new(policy));

        let error = authenticator
            .authenticate("cook")
            .await
            .expect_err("authentication fails");

        assert_eq!(error.kind(), AuthenticationErrorKind::AuthenticationFailed);
        assert_eq!(error.to_string(), "authentication failed");
    }

    #[rstest]
    #[case("admin", true)]
    #[case("guest", false)]
    #[tokio::test]
    async fn fixtures_authenticate_only_admin(#[case] username: &str, #[case] succeeds: bool) {
        let authenticator = AuthorityResolvingAuthenticator::new(
            Arc::new(FixtureCredentialStore),
            Arc::new(FixtureAuthorityPolicy),
        );

        match (succeeds, authenticator.authenticate(username).await) {
            (true, Ok(identity)) => {
                assert!(identity.has_authority("Chief"));
                assert!(!identity.has_authority("ROLE_ADMIN"));
            }
            (false, Err(error)) => {
                assert_eq!(error.kind(), AuthenticationErrorKind::AuthorityLookupFailed);
            }
            (true, Err(error)) => panic!("expected success, got {error:?}"),
            (false, Ok(identity)) => panic!("expected failure, got {identity:?}"),
        }
    }
}
