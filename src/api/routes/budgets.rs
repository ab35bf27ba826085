use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;

use crate::analytics::{self, BudgetWithSpent};
use crate::api::dto::{CreateBudgetRequest, MessageResponse, UpdateBudgetRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::CurrentUser;
use crate::api::AppState;
use crate::models::Budget;

pub(crate) async fn create_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateBudgetRequest>,
) -> ApiResult<Json<BudgetWithSpent>> {
    if req.monthly_limit < Decimal::ZERO {
        return Err(ApiError::Validation(
            "Monthly limit must not be negative".to_string(),
        ));
    }

    let now = Utc::now();
    let db = state.db()?;
    let category = db
        .get_category_by_id(req.category_id)?
        .ok_or(ApiError::CategoryNotFound)?;

    // The month a budget governs is the month it is created in.
    let budget = Budget {
        id: None,
        user_id: user.id,
        category_id: req.category_id,
        category_name: category.name,
        monthly_limit: req.monthly_limit,
        month: analytics::month_key(now),
        created_at: now,
    };
    let Some(id) = db.insert_budget(&budget)? else {
        return Err(ApiError::DuplicateBudget);
    };

    let created = Budget {
        id: Some(id),
        ..budget
    };
    Ok(Json(analytics::annotate_budget(&db, created)?))
}

pub(crate) async fn list_budgets(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<BudgetWithSpent>>> {
    let db = state.db()?;
    Ok(Json(analytics::budgets_with_spent(&db, user.id, Utc::now())?))
}

pub(crate) async fn update_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBudgetRequest>,
) -> ApiResult<Json<BudgetWithSpent>> {
    if req.monthly_limit < Decimal::ZERO {
        return Err(ApiError::Validation(
            "Monthly limit must not be negative".to_string(),
        ));
    }

    let db = state.db()?;
    if !db.update_budget_limit(user.id, id, req.monthly_limit)? {
        return Err(ApiError::NotFound("Budget"));
    }
    let budget = db
        .get_budget_by_id(user.id, id)?
        .ok_or(ApiError::NotFound("Budget"))?;

    Ok(Json(analytics::annotate_budget(&db, budget)?))
}

pub(crate) async fn delete_budget(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.db()?.delete_budget(user.id, id)? {
        return Err(ApiError::NotFound("Budget"));
    }
    Ok(Json(MessageResponse {
        message: "Budget deleted successfully".to_string(),
    }))
}
