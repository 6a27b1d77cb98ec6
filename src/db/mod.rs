mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::forms::{BudgetInput, ExpenseFilter, FormError};
use crate::models::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

const EXPENSE_COLUMNS: &str = "id, user_id, date, description, amount, category, created_at";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            let tx = self.conn.transaction()?;
            tx.execute_batch(schema::SCHEMA_V1)?;
            tx.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tx.commit()?;
            tracing::info!(version = schema::CURRENT_VERSION, "created database schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        // Only one schema version exists so far; anything else was written
        // by a different build.
        if current != schema::CURRENT_VERSION {
            anyhow::bail!(
                "Unsupported database schema version {current} (expected {})",
                schema::CURRENT_VERSION
            );
        }

        Ok(())
    }

    // ── Users ─────────────────────────────────────────────────

    /// Create the user together with a zeroed budget profile.
    /// A taken username surfaces as [`FormError::UsernameTaken`].
    pub(crate) fn insert_user(&mut self, user: &User) -> Result<i64> {
        let tx = self.conn.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO users (username, created_at) VALUES (?1, ?2)",
            params![user.username, user.created_at],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                return Err(FormError::UsernameTaken(user.username.clone()).into());
            }
            Err(e) => return Err(e.into()),
        }
        let user_id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO budget_profiles (user_id) VALUES (?1)",
            params![user_id],
        )?;
        tx.commit()?;
        tracing::info!(user_id, username = %user.username, "registered user");
        Ok(user_id)
    }

    pub(crate) fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, username, created_at FROM users WHERE username = ?1",
                params![username],
                |row| {
                    Ok(User {
                        id: Some(row.get(0)?),
                        username: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                },
            )
            .optional()?)
    }

    // ── Expenses ──────────────────────────────────────────────

    pub(crate) fn insert_expense(&self, expense: &Expense) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO expenses (user_id, date, description, amount, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                expense.user_id,
                expense.date.format(DATE_FORMAT).to_string(),
                expense.description,
                expense.amount.to_string(),
                expense.category,
                expense.created_at,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(user_id = expense.user_id, expense_id = id, "inserted expense");
        Ok(id)
    }

    /// Insert all rows or none.
    pub(crate) fn insert_expenses_batch(&mut self, expenses: &[Expense]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO expenses (user_id, date, description, amount, category, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for expense in expenses {
                stmt.execute(params![
                    expense.user_id,
                    expense.date.format(DATE_FORMAT).to_string(),
                    expense.description,
                    expense.amount.to_string(),
                    expense.category,
                    expense.created_at,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(count = expenses.len(), "inserted expense batch");
        Ok(expenses.len())
    }

    /// A user's expenses, newest first, narrowed by `filter`.
    pub(crate) fn get_expenses(&self, user_id: i64, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let mut sql = format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = ?1");
        let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(user_id)];

        if let Some(category) = filter.category {
            sql.push_str(&format!(" AND category = ?{}", param_values.len() + 1));
            param_values.push(Box::new(category.as_str()));
        }
        if let Some(from) = filter.from {
            sql.push_str(&format!(" AND date >= ?{}", param_values.len() + 1));
            param_values.push(Box::new(from.format(DATE_FORMAT).to_string()));
        }
        if let Some(to) = filter.to {
            sql.push_str(&format!(" AND date <= ?{}", param_values.len() + 1));
            param_values.push(Box::new(to.format(DATE_FORMAT).to_string()));
        }

        sql.push_str(" ORDER BY date DESC, id DESC");

        let params_ref: Vec<&dyn rusqlite::types::ToSql> =
            param_values.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_ref.as_slice(), expense_from_row)?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    /// `None` when the id does not exist or belongs to someone else.
    pub(crate) fn get_expense(&self, user_id: i64, id: i64) -> Result<Option<Expense>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?1 AND user_id = ?2"),
                params![id, user_id],
                expense_from_row,
            )
            .optional()?)
    }

    /// Returns `false` when no row owned by `expense.user_id` matched.
    pub(crate) fn update_expense(&self, expense: &Expense) -> Result<bool> {
        let id = expense
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update an expense without an id"))?;
        let changed = self.conn.execute(
            "UPDATE expenses SET date = ?1, description = ?2, amount = ?3, category = ?4
             WHERE id = ?5 AND user_id = ?6",
            params![
                expense.date.format(DATE_FORMAT).to_string(),
                expense.description,
                expense.amount.to_string(),
                expense.category,
                id,
                expense.user_id,
            ],
        )?;
        tracing::debug!(user_id = expense.user_id, expense_id = id, changed, "updated expense");
        Ok(changed > 0)
    }

    pub(crate) fn delete_expense(&self, user_id: i64, id: i64) -> Result<bool> {
        let changed = self.conn.execute(
            "DELETE FROM expenses WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        tracing::debug!(user_id, expense_id = id, changed, "deleted expense");
        Ok(changed > 0)
    }

    pub(crate) fn get_expense_count(&self, user_id: i64) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM expenses WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    // ── Budget profiles ───────────────────────────────────────

    /// Fetch the user's profile, creating a zeroed one if it is missing.
    pub(crate) fn get_budget_profile(&self, user_id: i64) -> Result<BudgetProfile> {
        let created = self.conn.execute(
            "INSERT OR IGNORE INTO budget_profiles (user_id) VALUES (?1)",
            params![user_id],
        )?;
        if created > 0 {
            tracing::debug!(user_id, "created missing budget profile");
        }
        let profile = self.conn.query_row(
            "SELECT id, user_id, food, utilities, entertainment, others
             FROM budget_profiles WHERE user_id = ?1",
            params![user_id],
            |row| {
                Ok(BudgetProfile {
                    id: Some(row.get(0)?),
                    user_id: row.get(1)?,
                    food: decimal_column(row, 2)?,
                    utilities: decimal_column(row, 3)?,
                    entertainment: decimal_column(row, 4)?,
                    others: decimal_column(row, 5)?,
                })
            },
        )?;
        Ok(profile)
    }

    pub(crate) fn set_budget_profile(&self, user_id: i64, budget: &BudgetInput) -> Result<BudgetProfile> {
        self.conn.execute(
            "INSERT INTO budget_profiles (user_id, food, utilities, entertainment, others)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                food = ?2, utilities = ?3, entertainment = ?4, others = ?5",
            params![
                user_id,
                budget.food.to_string(),
                budget.utilities.to_string(),
                budget.entertainment.to_string(),
                budget.others.to_string(),
            ],
        )?;
        tracing::info!(user_id, "updated budget profile");
        self.get_budget_profile(user_id)
    }
}

fn expense_from_row(row: &Row<'_>) -> rusqlite::Result<Expense> {
    let date_str: String = row.get(2)?;
    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Expense {
        id: Some(row.get(0)?),
        user_id: row.get(1)?,
        date,
        description: row.get(3)?,
        amount: decimal_column(row, 4)?,
        category: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
