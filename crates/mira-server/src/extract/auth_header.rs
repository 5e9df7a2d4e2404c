//! Bearer-token extraction from the `Authorization` header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use derive_more::Deref;

use crate::extract::TRACING_TARGET_AUTHENTICATION;
use crate::{Error, ErrorKind};

/// The raw bearer token from the `Authorization` header.
///
/// Extraction performs no verification; pair it with
/// [`AuthGuard`](mira_auth::guard::AuthGuard) or use
/// [`AuthSession`](crate::extract::AuthSession) instead when the token must
/// be valid.
#[derive(Debug, Clone, Deref)]
pub struct AuthHeader(String);

impl AuthHeader {
    /// Returns the bearer token string.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthHeader
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let header =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state).await;

        match header {
            Ok(TypedHeader(bearer)) => Ok(Self(bearer.token().to_owned())),
            Err(rejection) if rejection.is_missing() => {
                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    "request without an Authorization header"
                );
                Err(ErrorKind::MissingAuthToken.into_error())
            }
            Err(_) => {
                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    "Authorization header is not a bearer token"
                );
                Err(ErrorKind::MalformedAuthToken.into_error())
            }
        }
    }
}
