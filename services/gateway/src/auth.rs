use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use types::errors::GameError;
use types::token::SessionToken;

use crate::error::AppError;

/// Extracts the session token from `Authorization: Bearer <token>`
///
/// Every session-scoped route takes this extractor; there is no user
/// account system, the bearer token IS the session identity.
pub struct SessionBearer(pub SessionToken);

impl<S> FromRequestParts<S> for SessionBearer
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                GameError::Unauthorized("missing Authorization header".to_string())
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                GameError::Unauthorized("expected Bearer authorization".to_string())
            })?;

        Ok(SessionBearer(SessionToken::from(token)))
    }
}
