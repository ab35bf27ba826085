use axum::{extract::State, Json};
use chrono::Utc;

use crate::analytics::{self, Dashboard};
use crate::api::error::ApiResult;
use crate::api::extract::CurrentUser;
use crate::api::AppState;

pub(crate) async fn get_dashboard(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Dashboard>> {
    let db = state.db()?;
    Ok(Json(analytics::dashboard(&db, user.id, Utc::now())?))
}
