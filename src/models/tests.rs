#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use rust_decimal_macros::dec;

use super::*;

fn utc(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn make_expense() -> Expense {
    Expense {
        id: Some(1),
        user_id: 7,
        amount: dec!(25.50),
        category_id: 3,
        category_name: "Food & Dining".into(),
        description: "Lunch".into(),
        date: utc("2024-06-15T12:30:00Z"),
        created_at: utc("2024-06-15T12:31:00Z"),
    }
}

#[test]
fn test_expense_amount_serializes_as_number() {
    let value = serde_json::to_value(make_expense()).unwrap();
    assert!(value["amount"].is_number());
    assert_eq!(value["amount"], serde_json::json!(25.5));
}

#[test]
fn test_expense_date_round_trips_as_rfc3339() {
    let expense = make_expense();
    let value = serde_json::to_value(&expense).unwrap();
    let raw = value["date"].as_str().unwrap();
    let parsed = DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc);
    assert_eq!(parsed, expense.date);
}

#[test]
fn test_budget_serializes_month_key() {
    let budget = Budget {
        id: Some(2),
        user_id: 7,
        category_id: 3,
        category_name: "Food & Dining".into(),
        monthly_limit: dec!(100.00),
        month: "2024-06".into(),
        created_at: utc("2024-06-01T00:00:00Z"),
    };
    let value = serde_json::to_value(budget).unwrap();
    assert_eq!(value["month"], "2024-06");
    assert_eq!(value["monthly_limit"], serde_json::json!(100.0));
}
