//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use hivedrive_shared::{AppError, RequestContext};

use crate::error::ApiError;
use crate::middleware::auth::request_locale;

/// JSON body that has been deserialized and validated.
///
/// Malformed bodies and failed validation both answer `VALIDATION_ERROR`
/// in the caller's language.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let locale = request
            .extensions()
            .get::<RequestContext>()
            .map_or_else(|| request_locale(request.headers()), |ctx| ctx.locale);

        let Json(value) = Json::<T>::from_request(request, state)
            .await
            .map_err(|rejection| {
                ApiError::new(AppError::Validation(rejection.body_text()), locale)
            })?;

        value
            .validate()
            .map_err(|errors| ApiError::new(AppError::Validation(errors.to_string()), locale))?;

        Ok(Self(value))
    }
}
