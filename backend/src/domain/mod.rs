//! Domain primitives, services, and ports.
//!
//! Purpose: Define strongly typed domain entities and the services that
//! drive them. Adapters live in `crate::outbound` and reach the domain only
//! through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): domain error payload.
//! - UserIdentity (alias to `auth::UserIdentity`): authenticated user.
//! - Offer (alias to `offer::Offer`): validated import record.
//! - AuthorityResolvingAuthenticator: identity resolution service.
//! - OfferImportCommandService: offer import driving port implementation.

pub mod auth;
pub mod authenticator;
pub mod error;
pub mod offer;
pub mod offer_import;
pub mod offer_import_service;
pub mod ports;

pub use self::auth::{AuthenticationError, AuthenticationErrorKind, Authority, UserIdentity};
pub use self::authenticator::AuthorityResolvingAuthenticator;
pub use self::error::{Error, ErrorCode};
pub use self::offer::{
    Money, OFFER_FIELD_NAMES, Offer, OfferCsv, OfferValidationError, ProductId,
};
pub use self::offer_import_service::OfferImportCommandService;

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use restaurant_backend::domain::{DomainResult, Error};
///
/// fn launch() -> DomainResult<()> {
///     Err(Error::invalid_request("jobName must not be empty"))
/// }
/// assert!(launch().is_err());
/// ```
pub type DomainResult<T> = Result<T, Error>;
