use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Expense {
    pub id: Option<i64>,
    pub user_id: i64,
    pub amount: Decimal,
    pub category_id: i64,
    /// Snapshot of the category name at write time; a later category
    /// rename does not rewrite history.
    pub category_name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
