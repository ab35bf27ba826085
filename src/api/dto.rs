//! Request and response bodies for the API surface.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::{ExpenseFilter, SortKey, SortOrder};
use crate::models::User;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) email: String,
    pub(crate) name: String,
    pub(crate) password: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
    pub(crate) user: User,
}

/// Body for both expense create and update, like the wire format's
/// single expense payload.
#[derive(Debug, Deserialize)]
pub(crate) struct ExpenseRequest {
    pub(crate) amount: Decimal,
    pub(crate) category_id: i64,
    pub(crate) description: String,
    pub(crate) date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExpenseQuery {
    pub(crate) category_id: Option<i64>,
    pub(crate) start_date: Option<DateTime<Utc>>,
    pub(crate) end_date: Option<DateTime<Utc>>,
    pub(crate) min_amount: Option<Decimal>,
    pub(crate) max_amount: Option<Decimal>,
    pub(crate) search: Option<String>,
    pub(crate) sort_by: Option<String>,
    pub(crate) sort_order: Option<String>,
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
}

impl ExpenseQuery {
    pub(crate) fn into_filter(self) -> Result<ExpenseFilter, ApiError> {
        let sort_by = match self.sort_by.as_deref() {
            None | Some("date") => SortKey::Date,
            Some("amount") => SortKey::Amount,
            Some(other) => {
                return Err(ApiError::Validation(format!("Unknown sort key: {other}")));
            }
        };
        let sort_order = match self.sort_order.as_deref() {
            None | Some("desc") => SortOrder::Desc,
            Some("asc") => SortOrder::Asc,
            Some(other) => {
                return Err(ApiError::Validation(format!("Unknown sort order: {other}")));
            }
        };
        // Pagination only kicks in when a page size is given.
        let offset = match (self.page, self.limit) {
            (Some(page), Some(limit)) if page > 1 => Some((page - 1) * limit),
            _ => None,
        };

        Ok(ExpenseFilter {
            category_id: self.category_id,
            start_date: self.start_date,
            end_date: self.end_date,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
            search: self.search,
            sort_by,
            sort_order,
            limit: self.limit,
            offset,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateBudgetRequest {
    pub(crate) category_id: i64,
    pub(crate) monthly_limit: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateBudgetRequest {
    pub(crate) monthly_limit: Decimal,
}

#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: String,
    pub(crate) message: String,
}
