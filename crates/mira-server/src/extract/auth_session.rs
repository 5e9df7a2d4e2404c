//! Verified-session extractor.

use axum::extract::{FromRef, FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use derive_more::Deref;
use mira_auth::catalog::ADMIN_SCOPE;
use mira_auth::guard::AuthGuard;
use mira_auth::token::AccessClaims;

use crate::extract::{AuthHeader, TRACING_TARGET_AUTHENTICATION};
use crate::{Error, Result};

/// Verified access-token claims for the current request.
///
/// Extraction verifies the bearer token cryptographically but applies no
/// scope requirement; handlers that need scopes keep the bearer token and
/// call [`AuthGuard::authorize`] with their `REQUIRED_SCOPES` and the
/// request's resource id. The verified claims are cached in the request
/// extensions, so stacking this extractor with the authentication middleware
/// verifies the token once.
#[derive(Debug, Clone, Deref, PartialEq, Eq)]
pub struct AuthSession(pub AccessClaims);

impl AuthSession {
    /// Returns `true` when the session carries the admin sentinel scope.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.scopes.iter().any(|scope| scope == ADMIN_SCOPE)
    }
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync + 'static,
    AuthGuard: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Self>() {
            return Ok(session.clone());
        }

        let header = AuthHeader::from_request_parts(parts, state).await?;
        let guard = AuthGuard::from_ref(state);
        let claims = guard.authenticate(header.token())?;

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            subject_id = %claims.subject_id,
            "bearer token verified"
        );

        let session = Self(claims);
        parts.extensions.insert(session.clone());
        Ok(session)
    }
}

impl<S> OptionalFromRequestParts<S> for AuthSession
where
    S: Send + Sync + 'static,
    AuthGuard: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<S>>::from_request_parts(parts, state).await {
            Ok(session) => Ok(Some(session)),
            Err(_) => Ok(None),
        }
    }
}
