use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};

use crate::models::User;

use super::error::ApiError;
use super::AppState;

/// The authenticated user for the current request, resolved from the
/// `Authorization: Bearer` header. Every user-scoped handler takes this
/// extractor, so no such handler runs without a verified identity.
pub(crate) struct CurrentUser(pub(crate) User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthenticated("Missing authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthenticated("Invalid authorization header"))?;

        let user_id = state
            .tokens
            .verify(token)
            .map_err(|_| ApiError::Unauthenticated("Invalid or expired token"))?;

        // The token may outlive the account it was issued for.
        let user = state
            .db()?
            .get_user_by_id(user_id)?
            .ok_or(ApiError::UserNotFound)?;

        Ok(CurrentUser(user))
    }
}
