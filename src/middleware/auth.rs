//! Caller identity as established by the upstream auth layer
//!
//! Authentication itself happens in front of this service; requests reach us with the
//! verified user id in a header.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, models::UserId};

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user a request acts on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub UserId);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Unauthorized(format!("missing {} header", USER_ID_HEADER)))?;

        Ok(AuthenticatedUser(UserId::new(user_id)))
    }
}
