use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Budget {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category_id: i64,
    /// Snapshot of the category name at write time, like `Expense`.
    pub category_name: String,
    pub monthly_limit: Decimal,
    /// Format: "YYYY-MM"
    pub month: String,
    pub created_at: DateTime<Utc>,
}
