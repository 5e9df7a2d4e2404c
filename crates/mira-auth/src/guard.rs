//! Request-time authorization facade.
//!
//! [`AuthGuard`] is what boundaries (HTTP middleware, extractors, jobs) hold:
//! it verifies a bearer token and resolves the caller's scopes against a
//! handler's requirements in one call, without touching the user directory.

use std::sync::Arc;

use crate::catalog::PermissionCatalog;
use crate::directory::{DirectoryUser, UserDirectory};
use crate::scope::{Decision, ScopeResolver};
use crate::token::{AccessClaims, TokenCodec};
use crate::{AuthError, Result};

/// Tracing target for request-time authorization.
const TRACING_TARGET: &str = "mira_auth::guard";

/// Verifies bearer tokens and enforces scope requirements.
#[derive(Debug, Clone)]
pub struct AuthGuard {
    codec: TokenCodec,
    resolver: ScopeResolver,
}

impl AuthGuard {
    /// Creates a guard from a token codec and the shared permission catalog.
    #[must_use]
    pub fn new(codec: TokenCodec, catalog: Arc<PermissionCatalog>) -> Self {
        Self {
            codec,
            resolver: ScopeResolver::new(catalog),
        }
    }

    /// Returns the scope resolver this guard decides with.
    #[must_use]
    pub fn resolver(&self) -> &ScopeResolver {
        &self.resolver
    }

    /// Returns the token codec this guard verifies with.
    #[must_use]
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Verifies an access token without any scope requirement.
    ///
    /// Use for endpoints where the caller must simply be authenticated.
    pub fn authenticate(&self, access_token: &str) -> Result<AccessClaims> {
        self.authorize(access_token, &[], None)
    }

    /// Verifies an access token and checks its scopes against `required`,
    /// optionally bound to a concrete resource id.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] when the token fails verification.
    /// - [`AuthError::InsufficientPermission`] naming the unmet scopes when
    ///   the grants do not cover the requirements.
    pub fn authorize(
        &self,
        access_token: &str,
        required: &[&str],
        resource_id: Option<i64>,
    ) -> Result<AccessClaims> {
        let claims = self.codec.decode_access(access_token)?;

        match self.resolver.decide(required, resource_id, &claims.scopes) {
            Decision::Authorized => Ok(claims),
            Decision::Denied { missing } => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    subject_id = %claims.subject_id,
                    missing = ?missing,
                    resource_id = ?resource_id,
                    "request denied: insufficient permissions"
                );
                Err(AuthError::InsufficientPermission { missing })
            }
        }
    }

    /// Resolves the directory record behind a verified access token.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidToken`] when the token fails verification.
    /// - [`AuthError::InactiveUser`] when the account has been disabled
    ///   since issuance.
    /// - [`AuthError::DirectoryAnomaly`] when the subject no longer resolves:
    ///   a correctly-signed token implies the subject existed at issuance, so
    ///   this is a server-side fault.
    pub async fn current_user(
        &self,
        directory: &dyn UserDirectory,
        access_token: &str,
    ) -> Result<DirectoryUser> {
        let claims = self.codec.decode_access(access_token)?;

        let Some(user) = directory.find_by_id(claims.subject_id).await? else {
            tracing::error!(
                target: TRACING_TARGET,
                subject_id = %claims.subject_id,
                "access-token subject vanished from the user directory"
            );
            return Err(AuthError::DirectoryAnomaly {
                subject_id: claims.subject_id,
            });
        };

        if !user.is_active {
            tracing::warn!(
                target: TRACING_TARGET,
                subject_id = %user.id,
                "request rejected: account inactive"
            );
            return Err(AuthError::InactiveUser);
        }

        Ok(user)
    }
}
