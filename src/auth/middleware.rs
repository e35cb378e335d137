// Bearer token extraction for session-protected routes

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::warn;

use crate::auth::error::AuthError;

/// Raw token taken from an `Authorization: Bearer <token>` header
///
/// Only the header shape is checked here; the signature is verified by
/// [`crate::auth::AuthService::resolve_session`].
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| {
                warn!("Authorization header is not valid ASCII");
                AuthError::InvalidToken
            })?;

        let (scheme, token) = auth_header.split_once(' ').ok_or_else(|| {
            warn!("Authorization header missing 'Bearer ' prefix");
            AuthError::InvalidToken
        })?;

        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            warn!("Authorization header is not a bearer token");
            return Err(AuthError::InvalidToken);
        }

        Ok(BearerToken(token.to_string()))
    }
}
