//! Authentication middleware for protected routes.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap,
        header::{ACCEPT_LANGUAGE, AUTHORIZATION},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use hivedrive_shared::types::{BranchId, UserId};
use hivedrive_shared::{AppError, JwtError, Locale, RequestContext};

use crate::AppState;
use crate::error::ApiError;

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Language requested by the caller; English when absent.
pub(crate) fn request_locale(headers: &HeaderMap) -> Locale {
    headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|h| h.to_str().ok())
        .map_or_else(Locale::default, Locale::from_accept_language)
}

/// Resolves the caller of a protected route.
///
/// This middleware:
/// 1. Extracts the Bearer token from the Authorization header
/// 2. Validates the token and resolves the role through the configured policy
/// 3. Stores a [`RequestContext`] in request extensions for handlers
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let locale = request_locale(request.headers());

    match authenticate(&state, request.headers(), locale) {
        Ok(ctx) => {
            tracing::debug!(
                user_id = %ctx.user_id,
                branch_id = %ctx.branch_id,
                role = %ctx.role,
                "caller authenticated"
            );
            request.extensions_mut().insert(ctx);
            next.run(request).await
        }
        Err(error) => ApiError::new(error, locale).into_response(),
    }
}

fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
    locale: Locale,
) -> Result<RequestContext, AppError> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".to_string()))?;

    let claims = state.jwt.validate_token(token).map_err(|e| match e {
        JwtError::Expired => AppError::Unauthorized("token has expired".to_string()),
        _ => AppError::Unauthorized("invalid or malformed token".to_string()),
    })?;
    let role = state.role_policy.resolve(claims.role.as_deref())?;

    Ok(RequestContext::new(
        UserId::from_uuid(claims.user_id()),
        BranchId::from_uuid(claims.branch_id()),
        role,
        locale,
    ))
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(AuthUser(ctx): AuthUser) -> impl IntoResponse {
///     let branch = ctx.branch_id;
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub RequestContext);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| {
                ApiError::new(
                    AppError::Unauthorized("authentication required".to_string()),
                    request_locale(&parts.headers),
                )
            })
    }
}
