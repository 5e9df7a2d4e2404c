//! Signing keys and the token encode/decode surface.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::token::{AccessClaims, RefreshClaims, TokenUse};
use crate::{AuthError, Result};

/// Tracing target for token signing and verification.
const TRACING_TARGET: &str = "mira_auth::token";

/// Symmetric signing keys for session tokens.
///
/// Thread-safe and cheap to clone; the secret itself is never printed, not
/// even through `Debug`.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SessionKeys {
    /// Derives encoding and decoding keys from a shared secret.
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        let inner = Arc::new(SessionKeysInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        });
        Self { inner }
    }

    /// Returns the key used to sign tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns the key used to verify token signatures.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

/// Encodes and decodes session tokens with a fixed HS256 configuration.
///
/// Decoding collapses every failure (malformed string, bad signature,
/// expiry, wrong claim shape, wrong token role) into
/// [`AuthError::InvalidToken`]; the specific cause is logged, never returned.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: SessionKeys,
}

impl TokenCodec {
    const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Creates a codec over the given signing keys.
    #[must_use]
    pub fn new(keys: SessionKeys) -> Self {
        Self { keys }
    }

    /// Signs access-token claims into a compact token string.
    pub fn encode_access(&self, claims: &AccessClaims) -> Result<String> {
        self.encode(claims)
    }

    /// Signs refresh-token claims into a compact token string.
    pub fn encode_refresh(&self, claims: &RefreshClaims) -> Result<String> {
        self.encode(claims)
    }

    /// Verifies and decodes an access token.
    pub fn decode_access(&self, token: &str) -> Result<AccessClaims> {
        let claims: AccessClaims = self.decode(token)?;
        self.check_use(claims.token_use, TokenUse::Access)?;
        Ok(claims)
    }

    /// Verifies and decodes a refresh token.
    pub fn decode_refresh(&self, token: &str) -> Result<RefreshClaims> {
        let claims: RefreshClaims = self.decode(token)?;
        self.check_use(claims.token_use, TokenUse::Refresh)?;
        Ok(claims)
    }

    fn encode<T: Serialize>(&self, claims: &T) -> Result<String> {
        let header = Header::new(Self::ALGORITHM);
        encode(&header, claims, self.keys.encoding_key()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to sign session token"
            );
            AuthError::Signing(e.to_string())
        })
    }

    fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        let data = decode::<T>(token, self.keys.decoding_key(), &validation).map_err(|e| {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "session token rejected"
            );
            AuthError::InvalidToken
        })?;
        Ok(data.claims)
    }

    fn check_use(&self, found: TokenUse, expected: TokenUse) -> Result<()> {
        if found == expected {
            return Ok(());
        }
        tracing::warn!(
            target: TRACING_TARGET,
            found = ?found,
            expected = ?expected,
            "session token presented for the wrong role"
        );
        Err(AuthError::InvalidToken)
    }
}
