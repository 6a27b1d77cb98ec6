#![allow(clippy::unwrap_used)]

use super::*;
use crate::forms::FormError;
use rust_decimal_macros::dec;

fn argv(parts: &[&str]) -> Vec<String> {
    std::iter::once("finplan")
        .chain(parts.iter().copied())
        .map(String::from)
        .collect()
}

fn run(db: &mut Database, parts: &[&str]) -> Result<()> {
    as_cli(&argv(parts), db)
}

fn setup() -> (Database, i64) {
    let mut db = Database::open_in_memory().unwrap();
    run(&mut db, &["register", "alice"]).unwrap();
    let id = db.get_user_by_username("alice").unwrap().unwrap().id.unwrap();
    (db, id)
}

// ── Argument helpers ──────────────────────────────────────────

#[test]
fn test_split_user_flag() {
    let args: Vec<String> = ["--user", "bob", "list", "--from", "2024-01-01"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let (user, rest) = split_user_flag(&args);
    assert_eq!(user.as_deref(), Some("bob"));
    assert_eq!(rest, vec!["list", "--from", "2024-01-01"]);
}

#[test]
fn test_split_user_flag_equals_form() {
    let args = vec!["report".to_string(), "--user=carol".to_string()];
    let (user, rest) = split_user_flag(&args);
    assert_eq!(user.as_deref(), Some("carol"));
    assert_eq!(rest, vec!["report"]);
}

#[test]
fn test_parse_filter_flags() {
    let args: Vec<String> = ["--category", "food", "--to", "2024-01-31"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let filter = parse_filter(&args).unwrap();
    assert_eq!(filter.category, Some(Category::Food));
    assert!(filter.from.is_none());
    assert!(filter.to.is_some());
}

#[test]
fn test_parse_expense_args_joins_description() {
    let args: Vec<String> = ["2024-01-05", "12.5", "Food", "Pizza", "night"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let input = parse_expense_args(&args).unwrap();
    assert_eq!(input.description, "Pizza night");
    assert_eq!(input.amount, dec!(12.50));
}

#[test]
fn test_parse_expense_args_too_short() {
    let args = vec!["2024-01-05".to_string(), "12".to_string()];
    assert!(parse_expense_args(&args).is_err());
}

#[test]
fn test_parse_id() {
    assert_eq!(parse_id(Some(&"42".to_string())).unwrap(), 42);
    assert_eq!(parse_id(Some(&"#7".to_string())).unwrap(), 7);
    assert!(parse_id(Some(&"abc".to_string())).is_err());
    assert!(parse_id(None).is_err());
}

#[test]
fn test_shellexpand() {
    assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
    assert!(!shellexpand("~/out.csv").starts_with('~'));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn test_register_duplicate_fails() {
    let (mut db, _) = setup();
    let err = run(&mut db, &["register", "alice"]).unwrap_err();
    assert_eq!(
        err.downcast_ref::<FormError>(),
        Some(&FormError::UsernameTaken("alice".into()))
    );
}

#[test]
fn test_register_invalid_username() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &["register", "bad name!"]).is_err());
}

#[test]
fn test_unknown_user_rejected() {
    let (mut db, _) = setup();
    assert!(run(&mut db, &["--user", "mallory", "list"]).is_err());
}

#[test]
fn test_unknown_command() {
    let (mut db, _) = setup();
    assert!(run(&mut db, &["frobnicate"]).is_err());
}

#[test]
fn test_no_command_prints_usage() {
    let mut db = Database::open_in_memory().unwrap();
    assert!(run(&mut db, &[]).is_ok());
    assert!(run(&mut db, &["help"]).is_ok());
    assert!(run(&mut db, &["--version"]).is_ok());
}

#[test]
fn test_add_list_edit_delete() {
    let (mut db, user_id) = setup();
    run(&mut db, &["--user", "alice", "add", "2024-01-05", "100", "Food", "Weekly", "groceries"]).unwrap();
    run(&mut db, &["-u", "alice", "add", "2024-01-06", "20", "utilities", "Water"]).unwrap();
    assert!(run(&mut db, &["--user", "alice", "add", "2024-01-06", "20", "Travel", "Bus"]).is_err());

    let all = db.get_expenses(user_id, &ExpenseFilter::default()).unwrap();
    assert_eq!(all.len(), 2);
    let groceries = all.iter().find(|e| e.description == "Weekly groceries").unwrap();
    let id = groceries.id.unwrap().to_string();

    run(&mut db, &["--user", "alice", "list", "--category", "Food"]).unwrap();

    run(&mut db, &["--user", "alice", "edit", &id, "2024-01-07", "80.25", "Others", "Market"]).unwrap();
    let edited = db.get_expense(user_id, id.parse().unwrap()).unwrap().unwrap();
    assert_eq!(edited.amount, dec!(80.25));
    assert_eq!(edited.category(), Some(Category::Others));
    assert_eq!(edited.description, "Market");

    run(&mut db, &["--user", "alice", "delete", &id]).unwrap();
    assert!(db.get_expense(user_id, id.parse().unwrap()).unwrap().is_none());
    assert!(run(&mut db, &["--user", "alice", "delete", &id]).is_err());
}

#[test]
fn test_edit_other_users_expense_not_found() {
    let (mut db, alice) = setup();
    run(&mut db, &["register", "bob"]).unwrap();
    let id = db
        .insert_expense(&Expense::new(
            alice,
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "Rent".into(),
            dec!(500),
            Category::Others,
        ))
        .unwrap()
        .to_string();
    assert!(run(&mut db, &["--user", "bob", "edit", &id, "2024-01-01", "1", "Food", "x"]).is_err());
    assert!(run(&mut db, &["--user", "bob", "delete", &id]).is_err());
    assert!(db.get_expense(alice, id.parse().unwrap()).unwrap().is_some());
}

#[test]
fn test_budget_show_and_set() {
    let (mut db, user_id) = setup();
    run(&mut db, &["--user", "alice", "budget"]).unwrap();
    run(&mut db, &["--user", "alice", "budget", "200", "50", "0", "0"]).unwrap();
    assert_eq!(db.get_budget_profile(user_id).unwrap().total(), dec!(250));

    // All four ceilings are required
    assert!(run(&mut db, &["--user", "alice", "budget", "200", "50"]).is_err());
    assert_eq!(db.get_budget_profile(user_id).unwrap().total(), dec!(250));
}

#[test]
fn test_report_runs() {
    let (mut db, _) = setup();
    run(&mut db, &["--user", "alice", "report"]).unwrap();
    run(&mut db, &["--user", "alice", "budget", "200", "50", "0", "0"]).unwrap();
    run(&mut db, &["--user", "alice", "add", "2024-02-01", "100", "Food", "a"]).unwrap();
    run(&mut db, &["--user", "alice", "add", "2024-02-02", "50", "Food", "b"]).unwrap();
    run(&mut db, &["--user", "alice", "add", "2024-02-02", "20", "Utilities", "c"]).unwrap();
    run(&mut db, &["--user", "alice", "report", "--from", "2024-02-01"]).unwrap();
    assert!(run(&mut db, &["--user", "alice", "report", "--from", "2024-03-01", "--to", "2024-02-01"]).is_err());
}

fn render_for(db: &mut Database, user_id: i64, filter: &ExpenseFilter) -> String {
    let expenses = db.get_expenses(user_id, filter).unwrap();
    let profile = db.get_budget_profile(user_id).unwrap();
    let report = SpendingReport::build(&expenses, &profile);
    let stored = db.get_expense_count(user_id).unwrap();
    render_report(&report, "alice", expenses.len(), stored, filter).unwrap()
}

#[test]
fn test_report_overall_usage_against_total_budget() {
    let (mut db, user_id) = setup();
    run(&mut db, &["--user", "alice", "budget", "200", "50", "0", "0"]).unwrap();
    run(&mut db, &["--user", "alice", "add", "2024-02-01", "150", "Food", "a"]).unwrap();
    run(&mut db, &["--user", "alice", "add", "2024-02-02", "20", "Utilities", "c"]).unwrap();

    let out = render_for(&mut db, user_id, &ExpenseFilter::default());
    assert!(out.contains("Expenses:        2 of 2"));
    assert!(out.contains("Total budget:"));
    assert!(out.contains("Used:            68"));
}

#[test]
fn test_category_report_omits_overall_usage() {
    let (mut db, user_id) = setup();
    run(&mut db, &["--user", "alice", "budget", "200", "50", "0", "0"]).unwrap();
    run(&mut db, &["--user", "alice", "add", "2024-02-01", "150", "Food", "a"]).unwrap();
    run(&mut db, &["--user", "alice", "add", "2024-02-02", "20", "Utilities", "c"]).unwrap();

    let filter = ExpenseFilter::new(Some("Food"), None, None).unwrap();
    let out = render_for(&mut db, user_id, &filter);
    assert!(out.contains("Expenses:        1 of 2"));
    assert!(!out.contains("Used:            "));
    assert!(!out.contains("Total budget:"));
    assert!(out.contains("see the Food row below"));
    // The per-category row still compares Food against its own ceiling
    assert!(out.contains(" 75"));
}

#[test]
fn test_export_then_import() {
    let (mut db, _) = setup();
    run(&mut db, &["register", "bob"]).unwrap();
    run(&mut db, &["--user", "alice", "add", "2024-02-01", "100", "Food", "Lunch"]).unwrap();
    run(&mut db, &["--user", "alice", "add", "2024-02-03", "35.5", "Entertainment", "Concert"]).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alice.csv");
    let path_str = path.to_str().unwrap();
    run(&mut db, &["--user", "alice", "export", path_str]).unwrap();

    run(&mut db, &["--user", "bob", "import", path_str]).unwrap();
    let bob = db.get_user_by_username("bob").unwrap().unwrap().id.unwrap();
    let imported = db.get_expenses(bob, &ExpenseFilter::default()).unwrap();
    assert_eq!(imported.len(), 2);
    assert_eq!(imported[0].description, "Concert");
    assert_eq!(imported[0].amount, dec!(35.50));
}

#[test]
fn test_import_missing_file() {
    let (mut db, _) = setup();
    assert!(run(&mut db, &["--user", "alice", "import", "/nonexistent/file.csv"]).is_err());
}
