//! Error responses.
//!
//! Every failure leaves the API as `{ "error": CODE, "message": text }` with
//! the status of its error kind. The message is rendered in the caller's
//! language.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

use hivedrive_shared::i18n::localize;
use hivedrive_shared::{AppError, Locale};

/// An [`AppError`] paired with the language it is reported in.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    locale: Locale,
}

impl ApiError {
    /// Wraps an error for a caller speaking `locale`.
    #[must_use]
    pub const fn new(error: AppError, locale: Locale) -> Self {
        Self { error, locale }
    }

    /// Returns the wrapped error.
    #[must_use]
    pub const fn inner(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self::new(error, Locale::default())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    retryable: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let code = self.error.error_code();

        if status.is_server_error() {
            error!(code, error = %self.error, "request failed");
        } else {
            warn!(code, error = %self.error, "request rejected");
        }

        let body = ErrorBody {
            error: code,
            message: localize(&self.error, self.locale),
            retryable: self.error.is_retryable(),
        };
        (status, Json(body)).into_response()
    }
}

/// Attaches the caller's language to a failed result.
pub trait Localize<T> {
    /// Converts the error side into an [`ApiError`] for `locale`.
    ///
    /// # Errors
    ///
    /// Returns the original error, localized.
    fn localize(self, locale: Locale) -> Result<T, ApiError>;
}

impl<T> Localize<T> for Result<T, AppError> {
    fn localize(self, locale: Locale) -> Result<T, ApiError> {
        self.map_err(|error| ApiError::new(error, locale))
    }
}
