//! Bearer token verification against the provider's published signing keys.
//!
//! # Verification flow
//!
//! 1. Decode the JWT header (no verification) to extract `kid` and `alg`.
//! 2. Reject the token if `alg` differs from the configured algorithm.
//! 3. Resolve `kid` through the [`KeyStore`]; an unknown `kid` triggers one
//!    fetch of the full key set before failing.
//! 4. Verify signature, `exp` and `iss`. Audience is not checked.
//! 5. Return the typed [`TokenClaims`].
//!
//! Every failure along the way surfaces to callers as
//! [`Error::Unauthorized`](crate::Error::Unauthorized).

pub mod claims;
pub mod keys;
pub mod middleware;
pub mod verifier;

pub use claims::{RoleClaims, TokenClaims};
pub use keys::{KeyStore, KeyStoreError, SigningKey};
pub use middleware::{Authenticated, BearerAuth, BearerToken, require_bearer};
pub use verifier::{TokenVerifier, VerifyError};
