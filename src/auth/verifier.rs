//! Access token verification.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, TokenData, Validation};
use tracing::{debug, warn};

use super::claims::TokenClaims;
use super::keys::{KeyStore, KeyStoreError};
use crate::config::ProviderConfig;
use crate::{Error, Result};

/// Clock skew tolerated on `exp`, in seconds.
const LEEWAY_SECS: u64 = 60;

/// Reasons a token is rejected.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// The header segment is not a decodable JWT header.
    #[error("Malformed token header: {0}")]
    MalformedHeader(jsonwebtoken::errors::Error),

    /// The header has no `kid`.
    #[error("JWT missing 'kid' field in header")]
    MissingKeyId,

    /// The header algorithm differs from the configured one.
    #[error("Algorithm mismatch: expected {expected:?}, got {actual:?}")]
    AlgorithmMismatch {
        /// Configured algorithm
        expected: Algorithm,
        /// Algorithm named by the token
        actual: Algorithm,
    },

    /// The signing key could not be resolved.
    #[error(transparent)]
    Key(#[from] KeyStoreError),

    /// Signature, expiry, or issuer validation failed.
    #[error("JWT verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<VerifyError> for Error {
    fn from(e: VerifyError) -> Self {
        warn!(error = %e, "Token rejected");
        Error::invalid_token()
    }
}

/// Verifies bearer tokens against the provider's signing keys.
#[derive(Debug)]
pub struct TokenVerifier {
    keys: Arc<KeyStore>,
    algorithm: Algorithm,
    issuer: String,
}

impl TokenVerifier {
    /// Create a verifier over a shared key store.
    #[must_use]
    pub fn new(keys: Arc<KeyStore>, algorithm: Algorithm, issuer: impl Into<String>) -> Self {
        Self {
            keys,
            algorithm,
            issuer: issuer.into(),
        }
    }

    /// Create from provider configuration.
    pub fn from_config(config: &ProviderConfig, keys: Arc<KeyStore>) -> Result<Self> {
        Ok(Self::new(keys, config.algorithm()?, config.issuer()))
    }

    /// Shared key store
    #[must_use]
    pub fn keys(&self) -> &Arc<KeyStore> {
        &self.keys
    }

    /// Verify a token and return its claims.
    ///
    /// No audience check is performed.
    pub async fn verify(&self, token: &str) -> std::result::Result<TokenClaims, VerifyError> {
        let header = jsonwebtoken::decode_header(token).map_err(VerifyError::MalformedHeader)?;

        if header.alg != self.algorithm {
            return Err(VerifyError::AlgorithmMismatch {
                expected: self.algorithm,
                actual: header.alg,
            });
        }

        let kid = header.kid.ok_or(VerifyError::MissingKeyId)?;
        let key = self.keys.get_signing_key(&kid).await?;

        let mut validation = Validation::new(self.algorithm);
        validation.leeway = LEEWAY_SECS;
        validation.validate_aud = false;
        validation.set_issuer(&[&self.issuer]);

        let data: TokenData<TokenClaims> =
            jsonwebtoken::decode(token, key.decoding_key(), &validation)?;

        debug!(sub = ?data.claims.sub, kid = %kid, "Token verified");
        Ok(data.claims)
    }
}
