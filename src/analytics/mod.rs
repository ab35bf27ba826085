//! Derived views over the expense ledger and budget registry.
//!
//! Every aggregate here is recomputed from stored expenses at read time;
//! nothing is maintained incrementally, so the ledger can never drift
//! from the totals it produces.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::db::Database;
use crate::models::{Budget, Expense};

/// Number of category groups returned in the dashboard breakdown.
const BREAKDOWN_LIMIT: usize = 10;
/// Number of expenses returned in the dashboard recent list.
const RECENT_LIMIT: u32 = 5;

/// "YYYY-MM" key for the calendar month containing `now`.
pub(crate) fn month_key(now: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", now.year(), now.month())
}

/// Half-open UTC window covering one calendar month.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MonthWindow {
    pub(crate) start: DateTime<Utc>,
    /// First instant of the following month (exclusive).
    pub(crate) end: DateTime<Utc>,
}

/// Window for a "YYYY-MM" month key. The end bound is the actual month
/// rollover, so the last day of 28/29/30-day months is included and
/// nothing from the next month ever is.
pub(crate) fn month_window(key: &str) -> Result<MonthWindow> {
    let (year_str, month_str) = key
        .split_once('-')
        .with_context(|| format!("Invalid month key: {key}"))?;
    let year: i32 = year_str
        .parse()
        .with_context(|| format!("Invalid month key: {key}"))?;
    let month: u32 = month_str
        .parse()
        .with_context(|| format!("Invalid month key: {key}"))?;
    if !(1..=12).contains(&month) {
        bail!("Invalid month key: {key}");
    }

    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .with_context(|| format!("Invalid month key: {key}"))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .with_context(|| format!("Invalid month key: {key}"))?;

    Ok(MonthWindow { start, end })
}

/// Budget utilization in percent. A non-positive limit reads as 0% so a
/// zero-limit budget never divides by zero; overspend is not clamped and
/// may exceed 100.
pub(crate) fn utilization(spent: Decimal, monthly_limit: Decimal) -> f64 {
    if monthly_limit <= Decimal::ZERO {
        return 0.0;
    }
    (spent / monthly_limit * Decimal::ONE_HUNDRED)
        .to_f64()
        .unwrap_or(0.0)
}

#[derive(Debug, Serialize)]
pub(crate) struct BudgetWithSpent {
    #[serde(flatten)]
    pub(crate) budget: Budget,
    pub(crate) spent_amount: Decimal,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategorySpend {
    pub(crate) name: String,
    pub(crate) amount: Decimal,
}

#[derive(Debug, Serialize)]
pub(crate) struct BudgetStatus {
    pub(crate) category_name: String,
    pub(crate) monthly_limit: Decimal,
    pub(crate) spent_amount: Decimal,
    pub(crate) percentage: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct Dashboard {
    pub(crate) total_expenses: Decimal,
    pub(crate) monthly_expenses: Decimal,
    pub(crate) categories_breakdown: Vec<CategorySpend>,
    pub(crate) recent_expenses: Vec<Expense>,
    pub(crate) budget_status: Vec<BudgetStatus>,
}

/// Annotate one budget with the amount spent in its own month window.
pub(crate) fn annotate_budget(db: &Database, budget: Budget) -> Result<BudgetWithSpent> {
    let window = month_window(&budget.month)?;
    let spent = db.sum_expense_amounts(budget.user_id, Some(budget.category_id), Some(&window))?;
    Ok(BudgetWithSpent {
        budget,
        spent_amount: spent,
    })
}

/// The user's current-month budgets, each with a freshly computed spent
/// amount.
pub(crate) fn budgets_with_spent(
    db: &Database,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Vec<BudgetWithSpent>> {
    db.get_budgets(user_id, &month_key(now))?
        .into_iter()
        .map(|b| annotate_budget(db, b))
        .collect()
}

/// Assemble the dashboard view for one user at one instant.
pub(crate) fn dashboard(db: &Database, user_id: i64, now: DateTime<Utc>) -> Result<Dashboard> {
    let key = month_key(now);
    let window = month_window(&key)?;

    let total_expenses = db.sum_expense_amounts(user_id, None, None)?;
    let monthly_expenses = db.sum_expense_amounts(user_id, None, Some(&window))?;
    let categories_breakdown = category_breakdown(db, user_id, &window)?;
    let recent_expenses = db.get_recent_expenses(user_id, RECENT_LIMIT)?;

    let budget_status = db
        .get_budgets(user_id, &key)?
        .into_iter()
        .map(|b| {
            let spent = db.sum_expense_amounts(user_id, Some(b.category_id), Some(&window))?;
            Ok(BudgetStatus {
                percentage: utilization(spent, b.monthly_limit),
                category_name: b.category_name,
                monthly_limit: b.monthly_limit,
                spent_amount: spent,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dashboard {
        total_expenses,
        monthly_expenses,
        categories_breakdown,
        recent_expenses,
        budget_status,
    })
}

/// Current-month spend grouped by snapshot category name, largest first,
/// capped at the top ten groups. Ties keep their scan order; the cap and
/// ordering are what callers rely on.
fn category_breakdown(
    db: &Database,
    user_id: i64,
    window: &MonthWindow,
) -> Result<Vec<CategorySpend>> {
    let mut groups: Vec<CategorySpend> = Vec::new();
    for expense in db.get_expenses_in_window(user_id, window)? {
        match groups.iter_mut().find(|g| g.name == expense.category_name) {
            Some(group) => group.amount += expense.amount,
            None => groups.push(CategorySpend {
                name: expense.category_name,
                amount: expense.amount,
            }),
        }
    }
    groups.sort_by(|a, b| b.amount.cmp(&a.amount));
    groups.truncate(BREAKDOWN_LIMIT);
    Ok(groups)
}
