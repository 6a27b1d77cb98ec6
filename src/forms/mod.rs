//! Typed, validated inputs. A value of one of these types has already passed
//! every field constraint, so storage code never re-checks them.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

use crate::models::Category;

/// Matches `DecimalField(max_digits=10, decimal_places=2)` on the stored amount.
const MAX_DIGITS: u32 = 10;
const DECIMAL_PLACES: u32 = 2;
const USERNAME_MAX_LEN: usize = 150;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum FormError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field}: '{value}' is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a valid amount")]
    InvalidAmount { field: &'static str, value: String },

    #[error("{field}: at most {max} decimal places allowed")]
    TooManyDecimalPlaces { field: &'static str, max: u32 },

    #[error("{field}: at most {max} digits allowed")]
    TooManyDigits { field: &'static str, max: u32 },

    #[error("{field} cannot be negative")]
    Negative { field: &'static str },

    #[error("unknown category '{0}' (expected Food, Utilities, Entertainment or Others)")]
    UnknownCategory(String),

    #[error("username may only contain letters, digits and @/./+/-/_ (max 150 characters)")]
    InvalidUsername,

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("start date {from} is after end date {to}")]
    InvertedRange { from: NaiveDate, to: NaiveDate },
}

/// A new or edited expense entry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NewExpenseInput {
    pub(crate) date: NaiveDate,
    pub(crate) description: String,
    pub(crate) amount: Decimal,
    pub(crate) category: Category,
}

impl NewExpenseInput {
    /// An empty `category` falls back to [`Category::Others`].
    pub(crate) fn new(
        date: &str,
        description: &str,
        amount: &str,
        category: &str,
    ) -> Result<Self, FormError> {
        let date = parse_date("date", date)?;

        let description = description.trim();
        if description.is_empty() {
            return Err(FormError::Missing {
                field: "description",
            });
        }

        let amount = parse_amount("amount", amount)?;

        let category = if category.trim().is_empty() {
            Category::default()
        } else {
            Category::parse(category)
                .ok_or_else(|| FormError::UnknownCategory(category.trim().to_string()))?
        };

        Ok(Self {
            date,
            description: description.to_string(),
            amount,
            category,
        })
    }
}

/// All four category ceilings. Every field must be supplied.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetInput {
    pub(crate) food: Decimal,
    pub(crate) utilities: Decimal,
    pub(crate) entertainment: Decimal,
    pub(crate) others: Decimal,
}

impl BudgetInput {
    pub(crate) fn new(
        food: &str,
        utilities: &str,
        entertainment: &str,
        others: &str,
    ) -> Result<Self, FormError> {
        Ok(Self {
            food: parse_ceiling("food", food)?,
            utilities: parse_ceiling("utilities", utilities)?,
            entertainment: parse_ceiling("entertainment", entertainment)?,
            others: parse_ceiling("others", others)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RegistrationInput {
    pub(crate) username: String,
}

impl RegistrationInput {
    pub(crate) fn new(username: &str) -> Result<Self, FormError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(FormError::Missing { field: "username" });
        }
        if username.chars().count() > USERNAME_MAX_LEN || !username_pattern().is_match(username) {
            return Err(FormError::InvalidUsername);
        }
        Ok(Self {
            username: username.to_string(),
        })
    }
}

/// Ledger query narrowing. Both date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ExpenseFilter {
    pub(crate) category: Option<Category>,
    pub(crate) from: Option<NaiveDate>,
    pub(crate) to: Option<NaiveDate>,
}

impl ExpenseFilter {
    pub(crate) fn new(
        category: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, FormError> {
        let category = category
            .map(|c| Category::parse(c).ok_or_else(|| FormError::UnknownCategory(c.to_string())))
            .transpose()?;
        let from = from.map(|d| parse_date("from", d)).transpose()?;
        let to = to.map(|d| parse_date("to", d)).transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(FormError::InvertedRange { from, to });
            }
        }
        Ok(Self { category, from, to })
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.category.is_none() && self.from.is_none() && self.to.is_none()
    }
}

#[allow(clippy::expect_used)]
fn username_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"))
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FormError::Missing { field });
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FormError::InvalidDate {
        field,
        value: raw.to_string(),
    })
}

fn parse_amount(field: &'static str, raw: &str) -> Result<Decimal, FormError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(FormError::Missing { field });
    }
    let amount = Decimal::from_str(raw).map_err(|_| FormError::InvalidAmount {
        field,
        value: raw.to_string(),
    })?;
    // Trailing zeros past two places (e.g. "1.500") are not extra precision
    let mut amount = amount.normalize();
    if amount.scale() > DECIMAL_PLACES {
        return Err(FormError::TooManyDecimalPlaces {
            field,
            max: DECIMAL_PLACES,
        });
    }
    if integer_digits(amount) > MAX_DIGITS - DECIMAL_PLACES {
        return Err(FormError::TooManyDigits {
            field,
            max: MAX_DIGITS,
        });
    }
    amount.rescale(DECIMAL_PLACES);
    Ok(amount)
}

fn parse_ceiling(field: &'static str, raw: &str) -> Result<Decimal, FormError> {
    let amount = parse_amount(field, raw)?;
    if amount < Decimal::ZERO {
        return Err(FormError::Negative { field });
    }
    Ok(amount)
}

fn integer_digits(amount: Decimal) -> u32 {
    let whole = amount.trunc().abs().to_string();
    if whole == "0" {
        0
    } else {
        whole.len() as u32
    }
}

#[cfg(test)]
mod tests;
