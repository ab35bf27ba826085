use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;

use crate::api::dto::{ExpenseQuery, ExpenseRequest, MessageResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::CurrentUser;
use crate::api::AppState;
use crate::models::Expense;

pub(crate) async fn create_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ExpenseRequest>,
) -> ApiResult<Json<Expense>> {
    if req.amount <= Decimal::ZERO {
        return Err(ApiError::Validation("Amount must be positive".to_string()));
    }

    let db = state.db()?;
    let category = db
        .get_category_by_id(req.category_id)?
        .ok_or(ApiError::CategoryNotFound)?;

    let expense = Expense {
        id: None,
        user_id: user.id,
        amount: req.amount,
        category_id: req.category_id,
        category_name: category.name,
        description: req.description,
        date: req.date,
        created_at: Utc::now(),
    };
    let id = db.insert_expense(&expense)?;

    Ok(Json(Expense {
        id: Some(id),
        ..expense
    }))
}

pub(crate) async fn list_expenses(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ExpenseQuery>,
) -> ApiResult<Json<Vec<Expense>>> {
    let filter = query.into_filter()?;
    Ok(Json(state.db()?.get_expenses(user.id, &filter)?))
}

pub(crate) async fn update_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
    Json(req): Json<ExpenseRequest>,
) -> ApiResult<Json<Expense>> {
    if req.amount <= Decimal::ZERO {
        return Err(ApiError::Validation("Amount must be positive".to_string()));
    }

    let db = state.db()?;
    let existing = db
        .get_expense_by_id(user.id, id)?
        .ok_or(ApiError::NotFound("Expense"))?;
    let category = db
        .get_category_by_id(req.category_id)?
        .ok_or(ApiError::CategoryNotFound)?;

    // Re-stamp the category name snapshot along with the new fields;
    // rows already written keep the name they were created with.
    let updated = Expense {
        id: existing.id,
        user_id: user.id,
        amount: req.amount,
        category_id: req.category_id,
        category_name: category.name,
        description: req.description,
        date: req.date,
        created_at: existing.created_at,
    };
    db.update_expense(&updated)?;

    Ok(Json(updated))
}

pub(crate) async fn delete_expense(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.db()?.delete_expense(user.id, id)? {
        return Err(ApiError::NotFound("Expense"));
    }
    Ok(Json(MessageResponse {
        message: "Expense deleted successfully".to_string(),
    }))
}
