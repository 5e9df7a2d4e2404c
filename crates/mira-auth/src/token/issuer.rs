//! Token pair issuance and the refresh exchange.

use jiff::{Span, ToSpan as _};
use serde::{Deserialize, Serialize};

use crate::credential::CredentialValidator;
use crate::directory::{DirectoryUser, UserDirectory};
use crate::token::{AccessClaims, RefreshClaims, TokenCodec};
use crate::{AuthError, Result};

/// Tracing target for token issuance.
const TRACING_TARGET: &str = "mira_auth::token::issuer";

/// An access/refresh token pair as returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential.
    pub access_token: String,
    /// Credential for minting the next pair.
    pub refresh_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

/// Mints token pairs for authenticated subjects.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    access_ttl: Span,
    refresh_ttl: Span,
}

impl TokenIssuer {
    /// Default access-token lifetime in minutes.
    pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 30;
    /// Default refresh-token lifetime in minutes (5 days).
    pub const DEFAULT_REFRESH_TTL_MINUTES: i64 = 5 * 24 * 60;

    /// Creates an issuer with the default lifetimes.
    #[must_use]
    pub fn new(codec: TokenCodec) -> Self {
        Self {
            codec,
            access_ttl: Self::DEFAULT_ACCESS_TTL_MINUTES.minutes(),
            refresh_ttl: Self::DEFAULT_REFRESH_TTL_MINUTES.minutes(),
        }
    }

    /// Overrides the access-token lifetime.
    #[must_use]
    pub fn with_access_ttl(mut self, ttl: Span) -> Self {
        self.access_ttl = ttl;
        self
    }

    /// Overrides the refresh-token lifetime.
    #[must_use]
    pub fn with_refresh_ttl(mut self, ttl: Span) -> Self {
        self.refresh_ttl = ttl;
        self
    }

    /// Returns the codec this issuer signs with.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issues a fresh token pair for an authenticated user.
    ///
    /// The access token captures the user's granted scopes (with the admin
    /// sentinel appended for administrators) as of this moment.
    pub fn issue_pair(&self, user: &DirectoryUser) -> Result<TokenPair> {
        let scopes = user.granted_scopes();

        let access = AccessClaims::new(user.id, scopes, self.access_ttl)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        let refresh = RefreshClaims::new(user.id, self.refresh_ttl)
            .map_err(|e| AuthError::Signing(e.to_string()))?;

        let pair = TokenPair {
            access_token: self.codec.encode_access(&access)?,
            refresh_token: self.codec.encode_refresh(&refresh)?,
            token_type: "bearer".to_owned(),
        };

        tracing::debug!(
            target: TRACING_TARGET,
            subject_id = %user.id,
            expires_at = %access.expires_at,
            "issued session token pair"
        );
        Ok(pair)
    }

    /// Validates credentials and mints the first token pair of a session.
    ///
    /// Returns the authenticated user alongside the pair so callers can build
    /// a profile response without a second directory lookup.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] for an unknown username or a
    ///   password mismatch.
    /// - [`AuthError::InactiveUser`] when the account has been disabled.
    pub async fn login(
        &self,
        validator: &CredentialValidator,
        directory: &dyn UserDirectory,
        username: &str,
        password: &str,
    ) -> Result<(DirectoryUser, TokenPair)> {
        let user = validator.authenticate(directory, username, password).await?;
        let pair = self.issue_pair(&user)?;
        Ok((user, pair))
    }

    /// Exchanges a valid refresh token for a brand-new pair.
    ///
    /// The subject is re-resolved through the directory so the new access
    /// token carries current scopes, and disabled accounts stop refreshing
    /// immediately.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] for a bad, expired or access-role token.
    /// - [`AuthError::InactiveUser`] when the account has been disabled.
    /// - [`AuthError::DirectoryAnomaly`] when the subject no longer resolves.
    pub async fn refresh(
        &self,
        directory: &dyn UserDirectory,
        refresh_token: &str,
    ) -> Result<TokenPair> {
        let claims = self.codec.decode_refresh(refresh_token)?;

        let Some(user) = directory.find_by_id(claims.subject_id).await? else {
            tracing::error!(
                target: TRACING_TARGET,
                subject_id = %claims.subject_id,
                "refresh-token subject vanished from the user directory"
            );
            return Err(AuthError::DirectoryAnomaly {
                subject_id: claims.subject_id,
            });
        };

        if !user.is_active {
            tracing::warn!(
                target: TRACING_TARGET,
                subject_id = %user.id,
                "refresh rejected: account inactive"
            );
            return Err(AuthError::InactiveUser);
        }

        self.issue_pair(&user)
    }
}
