use axum::{extract::State, Json};
use chrono::Utc;

use crate::api::dto::{LoginRequest, RegisterRequest, TokenResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::AppState;
use crate::auth;
use crate::models::User;

pub(crate) async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<TokenResponse>> {
    if !req.email.contains('@') {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if req.password.is_empty() {
        return Err(ApiError::Validation("Password must not be empty".to_string()));
    }

    let password_hash = auth::hash_password(&req.password)?;
    let now = Utc::now();

    let db = state.db()?;
    if db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::AlreadyRegistered);
    }
    // The UNIQUE constraint backstops the check above under concurrent
    // registrations for the same email.
    let Some(id) = db.insert_user(&req.email, &req.name, &password_hash, now)? else {
        return Err(ApiError::AlreadyRegistered);
    };
    drop(db);

    let user = User {
        id,
        email: req.email,
        name: req.name,
        created_at: now,
    };
    let access_token = state.tokens.issue(user.id, &user.email, now)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user,
    }))
}

pub(crate) async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let record = state.db()?.get_user_by_email(&req.email)?;
    let Some((user, password_hash)) = record else {
        return Err(ApiError::InvalidCredentials);
    };
    if !auth::verify_password(&req.password, &password_hash)? {
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = state.tokens.issue(user.id, &user.email, Utc::now())?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        user,
    }))
}
