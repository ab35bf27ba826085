use axum::{extract::State, Json};

use crate::api::error::ApiResult;
use crate::api::AppState;
use crate::models::Category;

pub(crate) async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db()?.get_categories()?))
}
