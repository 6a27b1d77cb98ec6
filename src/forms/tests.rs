#![allow(clippy::unwrap_used)]

use rust_decimal_macros::dec;

use super::*;

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ── NewExpenseInput ───────────────────────────────────────────

#[test]
fn test_expense_input_valid() {
    let input = NewExpenseInput::new("2024-05-02", "  Dinner out ", "450.5", "food").unwrap();
    assert_eq!(input.date, day("2024-05-02"));
    assert_eq!(input.description, "Dinner out");
    assert_eq!(input.amount, dec!(450.50));
    assert_eq!(input.amount.to_string(), "450.50");
    assert_eq!(input.category, Category::Food);
}

#[test]
fn test_expense_input_blank_category_defaults_to_others() {
    let input = NewExpenseInput::new("2024-05-02", "Misc", "10", "").unwrap();
    assert_eq!(input.category, Category::Others);
}

#[test]
fn test_expense_input_zero_amount_allowed() {
    let input = NewExpenseInput::new("2024-05-02", "Free sample", "0", "Food").unwrap();
    assert_eq!(input.amount, Decimal::ZERO);
}

#[test]
fn test_expense_input_missing_fields() {
    assert_eq!(
        NewExpenseInput::new("", "x", "1", "Food").unwrap_err(),
        FormError::Missing { field: "date" }
    );
    assert_eq!(
        NewExpenseInput::new("2024-05-02", "   ", "1", "Food").unwrap_err(),
        FormError::Missing {
            field: "description"
        }
    );
    assert_eq!(
        NewExpenseInput::new("2024-05-02", "x", "", "Food").unwrap_err(),
        FormError::Missing { field: "amount" }
    );
}

#[test]
fn test_expense_input_bad_date() {
    let err = NewExpenseInput::new("05/02/2024", "x", "1", "Food").unwrap_err();
    assert!(matches!(err, FormError::InvalidDate { field: "date", .. }));
    assert!(NewExpenseInput::new("2024-02-30", "x", "1", "Food").is_err());
}

#[test]
fn test_expense_input_bad_amount() {
    let err = NewExpenseInput::new("2024-05-02", "x", "ten", "Food").unwrap_err();
    assert_eq!(
        err,
        FormError::InvalidAmount {
            field: "amount",
            value: "ten".into()
        }
    );
}

#[test]
fn test_expense_input_decimal_places() {
    assert_eq!(
        NewExpenseInput::new("2024-05-02", "x", "1.234", "Food").unwrap_err(),
        FormError::TooManyDecimalPlaces {
            field: "amount",
            max: 2
        }
    );
    // Trailing zeros are not extra precision
    assert!(NewExpenseInput::new("2024-05-02", "x", "1.2300", "Food").is_ok());
}

#[test]
fn test_expense_input_max_digits() {
    assert!(NewExpenseInput::new("2024-05-02", "x", "99999999.99", "Food").is_ok());
    assert_eq!(
        NewExpenseInput::new("2024-05-02", "x", "100000000", "Food").unwrap_err(),
        FormError::TooManyDigits {
            field: "amount",
            max: 10
        }
    );
}

#[test]
fn test_expense_input_unknown_category() {
    assert_eq!(
        NewExpenseInput::new("2024-05-02", "x", "1", "Travel").unwrap_err(),
        FormError::UnknownCategory("Travel".into())
    );
}

// ── BudgetInput ───────────────────────────────────────────────

#[test]
fn test_budget_input_valid() {
    let b = BudgetInput::new("200", "50.5", "0", "10.25").unwrap();
    assert_eq!(b.food, dec!(200));
    assert_eq!(b.utilities, dec!(50.50));
    assert_eq!(b.entertainment, Decimal::ZERO);
    assert_eq!(b.others, dec!(10.25));
}

#[test]
fn test_budget_input_requires_every_field() {
    assert_eq!(
        BudgetInput::new("200", "50", "", "10").unwrap_err(),
        FormError::Missing {
            field: "entertainment"
        }
    );
}

#[test]
fn test_budget_input_rejects_negative() {
    assert_eq!(
        BudgetInput::new("-1", "0", "0", "0").unwrap_err(),
        FormError::Negative { field: "food" }
    );
}

// ── RegistrationInput ─────────────────────────────────────────

#[test]
fn test_registration_valid() {
    assert_eq!(RegistrationInput::new(" alice ").unwrap().username, "alice");
    assert!(RegistrationInput::new("bob.smith+test@home_1-x").is_ok());
}

#[test]
fn test_registration_invalid() {
    assert_eq!(
        RegistrationInput::new("").unwrap_err(),
        FormError::Missing { field: "username" }
    );
    assert_eq!(
        RegistrationInput::new("has space").unwrap_err(),
        FormError::InvalidUsername
    );
    assert_eq!(
        RegistrationInput::new("semi;colon").unwrap_err(),
        FormError::InvalidUsername
    );
    let long = "a".repeat(151);
    assert_eq!(
        RegistrationInput::new(&long).unwrap_err(),
        FormError::InvalidUsername
    );
}

// ── ExpenseFilter ─────────────────────────────────────────────

#[test]
fn test_filter_empty() {
    let f = ExpenseFilter::new(None, None, None).unwrap();
    assert!(f.is_empty());
    assert_eq!(f, ExpenseFilter::default());
}

#[test]
fn test_filter_parsed() {
    let f = ExpenseFilter::new(Some("utilities"), Some("2024-01-01"), Some("2024-01-31")).unwrap();
    assert_eq!(f.category, Some(Category::Utilities));
    assert_eq!(f.from, Some(day("2024-01-01")));
    assert_eq!(f.to, Some(day("2024-01-31")));
    assert!(!f.is_empty());
}

#[test]
fn test_filter_single_day_range() {
    assert!(ExpenseFilter::new(None, Some("2024-01-05"), Some("2024-01-05")).is_ok());
}

#[test]
fn test_filter_inverted_range() {
    let err = ExpenseFilter::new(None, Some("2024-02-01"), Some("2024-01-01")).unwrap_err();
    assert!(matches!(err, FormError::InvertedRange { .. }));
}

#[test]
fn test_filter_unknown_category() {
    assert!(ExpenseFilter::new(Some("Rent"), None, None).is_err());
}
