//! JSON extraction with payload validation.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::{Error, ErrorKind, Result};

/// JSON body extractor that runs `validator` rules after deserialization.
#[derive(Debug, Clone)]
pub struct ValidateJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidateJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Error<'static>;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| {
                ErrorKind::BadRequest.with_context(rejection.body_text())
            })?;

        payload
            .validate()
            .map_err(|errors| ErrorKind::BadRequest.with_context(errors.to_string()))?;

        Ok(Self(payload))
    }
}
