//! Authentication primitives: authorities, resolved identities, and the
//! uniform authentication failure surfaced to security middleware.

use std::collections::BTreeSet;
use std::fmt;

use zeroize::Zeroizing;

/// Permission string granted to an authenticated identity.
///
/// Authorities compare by their exact text, so a set of authorities
/// collapses duplicates.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Authority(String);

impl Authority {
    /// Wrap a permission string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the permission string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Authority {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Authenticated user built fresh on every successful authentication.
///
/// ## Invariants
/// - `authorities` are the ones resolved from the authority policy, never the
///   ones reported by the credential store.
/// - The value is immutable once built.
///
/// # Examples
/// ```
/// use std::collections::BTreeSet;
/// use restaurant_backend::domain::{Authority, UserIdentity};
///
/// let identity = UserIdentity::new(
///     "waiter",
///     "{noop}waiter",
///     BTreeSet::from([Authority::from("Waiter"), Authority::from("Waiter")]),
/// );
/// assert_eq!(identity.authorities().len(), 1);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct UserIdentity {
    username: String,
    password_hash: Zeroizing<String>,
    authorities: BTreeSet<Authority>,
}

impl UserIdentity {
    /// Assemble an identity from its parts.
    pub fn new(
        username: impl Into<String>,
        password_hash: impl Into<String>,
        authorities: BTreeSet<Authority>,
    ) -> Self {
        Self {
            username: username.into(),
            password_hash: Zeroizing::new(password_hash.into()),
            authorities,
        }
    }

    /// Unique login name.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Opaque credential as stored by the credential backend.
    pub fn password_hash(&self) -> &str {
        self.password_hash.as_str()
    }

    /// Granted authorities.
    pub fn authorities(&self) -> &BTreeSet<Authority> {
        &self.authorities
    }

    /// Whether the identity carries `authority`.
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|granted| granted.as_str() == authority)
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIdentity")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("authorities", &self.authorities)
            .finish()
    }
}

/// Which step of authentication failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationErrorKind {
    /// The authority policy could not resolve the user's authorities.
    AuthorityLookupFailed,
    /// The credential store could not load or verify the user.
    AuthenticationFailed,
}

/// Uniform authentication failure.
///
/// Callers only ever see "authentication failed"; the underlying cause is
/// kept as an opaque [`std::error::Error::source`] for diagnostics.
#[derive(Debug, thiserror::Error)]
#[error("authentication failed")]
pub struct AuthenticationError {
    kind: AuthenticationErrorKind,
    #[source]
    cause: Box<dyn std::error::Error + Send + Sync>,
}

impl AuthenticationError {
    /// Wrap an authority policy failure.
    pub fn authority_lookup_failed(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            kind: AuthenticationErrorKind::AuthorityLookupFailed,
            cause: Box::new(cause),
        }
    }

    /// Wrap a credential store failure.
    pub fn authentication_failed(cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            kind: AuthenticationErrorKind::AuthenticationFailed,
            cause: Box::new(cause),
        }
    }

    /// Failed step.
    pub fn kind(&self) -> AuthenticationErrorKind {
        self.kind
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::error::Error as _;

    use super::*;
    use rstest::rstest;

    #[derive(Debug, thiserror::Error)]
    #[error("directory offline")]
    struct Offline;

    #[rstest]
    fn identity_debug_redacts_password() {
        let identity = UserIdentity::new("chief", "s3cr3t", BTreeSet::new());
        let rendered = format!("{identity:?}");
        assert!(!rendered.contains("s3cr3t"));
        assert!(rendered.contains("chief"));
    }

    #[rstest]
    #[case("Chief", true)]
    #[case("chief", false)]
    fn has_authority_matches_exact_text(#[case] authority: &str, #[case] expected: bool) {
        let identity =
            UserIdentity::new("chief", "pw", BTreeSet::from([Authority::from("Chief")]));
        assert_eq!(identity.has_authority(authority), expected);
    }

    #[rstest]
    fn error_display_hides_cause_but_keeps_source() {
        let err = AuthenticationError::authentication_failed(Offline);
        assert_eq!(err.to_string(), "authentication failed");
        assert_eq!(err.kind(), AuthenticationErrorKind::AuthenticationFailed);
        let source = err.source().expect("cause is attached");
        assert_eq!(source.to_string(), "directory offline");
    }
}
