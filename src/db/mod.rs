mod schema;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::analytics::MonthWindow;
use crate::models::*;

pub(crate) struct Database {
    conn: Connection,
}

/// Sort key for expense listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SortKey {
    #[default]
    Date,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Optional narrowing applied to an owner-scoped expense listing.
#[derive(Debug, Default)]
pub(crate) struct ExpenseFilter {
    pub(crate) category_id: Option<i64>,
    pub(crate) start_date: Option<DateTime<Utc>>,
    pub(crate) end_date: Option<DateTime<Utc>>,
    pub(crate) min_amount: Option<Decimal>,
    pub(crate) max_amount: Option<Decimal>,
    pub(crate) search: Option<String>,
    pub(crate) sort_by: SortKey,
    pub(crate) sort_order: SortOrder,
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
}

/// Stored timestamps use a fixed-width UTC format so that lexical
/// comparison in SQL matches chronological order.
fn encode_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn read_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn expense_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Expense> {
    let amount_str: String = row.get(2)?;
    let date_str: String = row.get(6)?;
    let created_str: String = row.get(7)?;
    Ok(Expense {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        category_id: row.get(3)?,
        category_name: row.get(4)?,
        description: row.get(5)?,
        date: read_datetime(&date_str),
        created_at: read_datetime(&created_str),
    })
}

fn budget_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Budget> {
    let limit_str: String = row.get(4)?;
    let created_str: String = row.get(6)?;
    Ok(Budget {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        category_id: row.get(2)?,
        category_name: row.get(3)?,
        monthly_limit: Decimal::from_str(&limit_str).unwrap_or_default(),
        month: row.get(5)?,
        created_at: read_datetime(&created_str),
    })
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let created_str: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: read_datetime(&created_str),
    })
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_default_categories()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_default_categories()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        // Check if schema_version table exists
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        // Existing database - check version and apply migrations
        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    /// Seed the shared category catalog on first startup. Guarded by a
    /// count check, so calling this on every startup never duplicates.
    fn seed_default_categories(&mut self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        if count > 0 {
            return Ok(());
        }

        let defaults = [
            ("Food & Dining", "🍽️", "#FF6B6B"),
            ("Transportation", "🚗", "#4ECDC4"),
            ("Utilities", "⚡", "#45B7D1"),
            ("Entertainment", "🎬", "#FFA07A"),
            ("Healthcare", "🏥", "#98D8C8"),
            ("Shopping", "🛍️", "#F7DC6F"),
            ("Education", "📚", "#BB8FCE"),
            ("Travel", "✈️", "#85C1E9"),
            ("Other", "📝", "#A5A5A5"),
        ];

        let tx = self.conn.transaction()?;
        for (name, icon, color) in &defaults {
            tx.execute(
                "INSERT OR IGNORE INTO categories (name, icon, color) VALUES (?1, ?2, ?3)",
                params![name, icon, color],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────

    /// Returns `None` when the email is already registered (the UNIQUE
    /// constraint rejects the insert, including under concurrent writes).
    pub(crate) fn insert_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        let result = self.conn.execute(
            "INSERT INTO users (email, name, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![email, name, password_hash, encode_datetime(created_at)],
        );
        match result {
            Ok(_) => Ok(Some(self.conn.last_insert_rowid())),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = self.conn.query_row(
            "SELECT id, email, name, created_at FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        );
        match result {
            Ok(u) => Ok(Some(u)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the user together with the stored password hash, for
    /// credential verification only.
    pub(crate) fn get_user_by_email(&self, email: &str) -> Result<Option<(User, String)>> {
        let result = self.conn.query_row(
            "SELECT id, email, name, created_at, password_hash FROM users WHERE email = ?1",
            params![email],
            |row| {
                let user = user_from_row(row)?;
                let hash: String = row.get(4)?;
                Ok((user, hash))
            },
        );
        match result {
            Ok(pair) => Ok(Some(pair)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn get_categories(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, icon, color FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Category {
                id: Some(row.get(0)?),
                name: row.get(1)?,
                icon: row.get(2)?,
                color: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let result = self.conn.query_row(
            "SELECT id, name, icon, color FROM categories WHERE id = ?1",
            params![id],
            |row| {
                Ok(Category {
                    id: Some(row.get(0)?),
                    name: row.get(1)?,
                    icon: row.get(2)?,
                    color: row.get(3)?,
                })
            },
        );
        match result {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(test)]
    pub(crate) fn insert_category(&self, name: &str, icon: &str, color: &str) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO categories (name, icon, color) VALUES (?1, ?2, ?3)",
            params![name, icon, color],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO expenses (user_id, amount, category_id, category_name, description, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                expense.user_id,
                expense.amount.to_string(),
                expense.category_id,
                expense.category_name,
                expense.description,
                encode_datetime(expense.date),
                encode_datetime(expense.created_at),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(crate) fn get_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut sql = String::from(
            "SELECT id, user_id, amount, category_id, category_name, description, date, created_at
             FROM expenses WHERE user_id = ?1",
        );
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(user_id)];

        if let Some(cid) = filter.category_id {
            sql.push_str(&format!(" AND category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cid));
        }
        if let Some(start) = filter.start_date {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(encode_datetime(start)));
        }
        if let Some(end) = filter.end_date {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(encode_datetime(end)));
        }
        if let Some(min) = filter.min_amount {
            sql.push_str(&format!(
                " AND CAST(amount AS REAL) >= ?{}",
                param_values.len() + 1
            ));
            param_values.push(Box::new(min.to_f64().unwrap_or(0.0)));
        }
        if let Some(max) = filter.max_amount {
            sql.push_str(&format!(
                " AND CAST(amount AS REAL) <= ?{}",
                param_values.len() + 1
            ));
            param_values.push(Box::new(max.to_f64().unwrap_or(0.0)));
        }
        if let Some(s) = &filter.search {
            sql.push_str(&format!(" AND description LIKE ?{}", param_values.len() + 1));
            param_values.push(Box::new(format!("%{s}%")));
        }

        let key = match filter.sort_by {
            SortKey::Date => "date",
            SortKey::Amount => "CAST(amount AS REAL)",
        };
        let dir = match filter.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY {key} {dir}, id {dir}"));

        if let Some(l) = filter.limit {
            sql.push_str(&format!(" LIMIT {l}"));
        }
        if let Some(o) = filter.offset {
            sql.push_str(&format!(" OFFSET {o}"));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_expense_by_id(&self, user_id: i64, id: i64) -> Result<Option<Expense>> {
        let result = self.conn.query_row(
            "SELECT id, user_id, amount, category_id, category_name, description, date, created_at
             FROM expenses WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
            expense_from_row,
        );
        match result {
            Ok(e) => Ok(Some(e)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn update_expense(&self, expense: &Expense) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE expenses
             SET amount = ?1, category_id = ?2, category_name = ?3, description = ?4, date = ?5
             WHERE id = ?6 AND user_id = ?7",
            params![
                expense.amount.to_string(),
                expense.category_id,
                expense.category_name,
                expense.description,
                encode_datetime(expense.date),
                expense.id,
                expense.user_id,
            ],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn delete_expense(&self, user_id: i64, id: i64) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM expenses WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }

    pub(crate) fn get_recent_expenses(&self, user_id: i64, limit: u32) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, amount, category_id, category_name, description, date, created_at
             FROM expenses WHERE user_id = ?1
             ORDER BY date DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit], expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_expenses_in_window(
        &self,
        user_id: i64,
        window: &MonthWindow,
    ) -> Result<Vec<Expense>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, amount, category_id, category_name, description, date, created_at
             FROM expenses WHERE user_id = ?1 AND date >= ?2 AND date < ?3
             ORDER BY date DESC, id DESC",
        )?;
        let rows = stmt.query_map(
            params![
                user_id,
                encode_datetime(window.start),
                encode_datetime(window.end)
            ],
            expense_from_row,
        )?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// Exact decimal sum of matching expense amounts, optionally narrowed
    /// to one category and/or one month window. Empty match sums to zero.
    pub(crate) fn sum_expense_amounts(
        &self,
        user_id: i64,
        category_id: Option<i64>,
        window: Option<&MonthWindow>,
    ) -> Result<Decimal> {
        let mut sql = String::from("SELECT amount FROM expenses WHERE user_id = ?1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(user_id)];

        if let Some(cid) = category_id {
            sql.push_str(&format!(" AND category_id = ?{}", param_values.len() + 1));
            param_values.push(Box::new(cid));
        }
        if let Some(w) = window {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(encode_datetime(w.start)));
            sql.push_str(&format!(" AND date < ?{}", param_values.len() + 1));
            param_values.push(Box::new(encode_datetime(w.end)));
        }

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), |row| row.get::<_, String>(0))?;

        let mut total = Decimal::ZERO;
        for amount in rows {
            total += Decimal::from_str(&amount?).unwrap_or_default();
        }
        Ok(total)
    }

    // ── Budgets ───────────────────────────────────────────────

    /// Returns `None` when a budget already exists for this owner,
    /// category, and month. The UNIQUE constraint makes the check hold
    /// under concurrent creates as well.
    pub(crate) fn insert_budget(&self, budget: &Budget) -> Result<Option<i64>> {
        let result = self.conn.execute(
            "INSERT INTO budgets (user_id, category_id, category_name, monthly_limit, month, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                budget.user_id,
                budget.category_id,
                budget.category_name,
                budget.monthly_limit.to_string(),
                budget.month,
                encode_datetime(budget.created_at),
            ],
        );
        match result {
            Ok(_) => Ok(Some(self.conn.last_insert_rowid())),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn get_budgets(&self, user_id: i64, month: &str) -> Result<Vec<Budget>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, category_id, category_name, monthly_limit, month, created_at
             FROM budgets WHERE user_id = ?1 AND month = ?2",
        )?;
        let rows = stmt.query_map(params![user_id, month], budget_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub(crate) fn get_budget_by_id(&self, user_id: i64, id: i64) -> Result<Option<Budget>> {
        let result = self.conn.query_row(
            "SELECT id, user_id, category_id, category_name, monthly_limit, month, created_at
             FROM budgets WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
            budget_from_row,
        );
        match result {
            Ok(b) => Ok(Some(b)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn update_budget_limit(
        &self,
        user_id: i64,
        id: i64,
        monthly_limit: Decimal,
    ) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE budgets SET monthly_limit = ?1 WHERE id = ?2 AND user_id = ?3",
            params![monthly_limit.to_string(), id, user_id],
        )?;
        Ok(changed > 0)
    }

    pub(crate) fn delete_budget(&self, user_id: i64, id: i64) -> Result<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM budgets WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(deleted > 0)
    }
}
