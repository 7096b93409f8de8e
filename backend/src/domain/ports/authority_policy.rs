//! Driven port resolving the authorities granted to a username.
//!
//! This is the single authoritative source of permissions for an
//! authenticated identity.

use std::collections::BTreeSet;

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::Authority;

define_port_error! {
    /// Errors raised while resolving a user's authorities.
    pub enum AuthorityPolicyError {
        /// The user has no profile in the access-control policy.
        UnknownUser { username: String } =>
            "no access-control profile for user {username}",
        /// The user's role references an undefined access-control group.
        UnknownGroup { group: String } =>
            "access-control group {group} is not defined",
        /// The policy source could not be consulted.
        Unavailable { message: String } =>
            "authority policy unavailable: {message}",
    }
}

/// Port mapping usernames to authority sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorityPolicy: Send + Sync {
    /// Resolve every authority granted to `username`.
    async fn authorities_for(&self, username: &str)
    -> Result<BTreeSet<Authority>, AuthorityPolicyError>;
}

/// Fixture policy granting `admin` a single authority and rejecting others.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAuthorityPolicy;

#[async_trait]
impl AuthorityPolicy for FixtureAuthorityPolicy {
    async fn authorities_for(
        &self,
        username: &str,
    ) -> Result<BTreeSet<Authority>, AuthorityPolicyError> {
        if username == "admin" {
            Ok(BTreeSet::from([Authority::from("Chief")]))
        } else {
            Err(AuthorityPolicyError::unknown_user(username))
        }
    }
}
