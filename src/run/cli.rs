use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::csv_io::{export_expenses, CsvImporter};
use crate::db::Database;
use crate::forms::{BudgetInput, ExpenseFilter, NewExpenseInput, RegistrationInput};
use crate::models::{Category, Expense, User};
use crate::report::SpendingReport;
use crate::ui::util::{format_amount, progress_bar, truncate};

const USER_ENV: &str = "FINPLAN_USER";

/// Who a command acts for. Every ledger and report call takes the user id
/// from here; nothing reads ambient session state.
#[derive(Debug, Clone)]
pub(crate) struct RequestContext {
    pub(crate) user_id: i64,
    pub(crate) username: String,
}

impl RequestContext {
    fn resolve(db: &Database, username: Option<&str>) -> Result<Self> {
        let username = match username {
            Some(name) => name.to_string(),
            None => std::env::var(USER_ENV).map_err(|_| {
                anyhow::anyhow!("No user selected. Pass --user <name> or set {USER_ENV}")
            })?,
        };
        let user = db
            .get_user_by_username(&username)?
            .ok_or_else(|| anyhow::anyhow!("Unknown user '{username}'. Register with: finplan register {username}"))?;
        let user_id = user
            .id
            .ok_or_else(|| anyhow::anyhow!("User '{username}' has no ID"))?;
        Ok(Self { user_id, username })
    }
}

/// `args` is the full argv, program name included.
pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    let (user_flag, args) = split_user_flag(args.get(1..).unwrap_or(&[]));
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };
    let rest = &args[1..];
    tracing::info!(command = %command, user = user_flag.as_deref().unwrap_or("-"), "running command");

    match command.as_str() {
        "register" => cli_register(rest, db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("finplan {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        cmd @ ("add" | "list" | "ls" | "edit" | "delete" | "rm" | "budget" | "report"
        | "summary" | "s" | "export" | "import") => {
            let ctx = RequestContext::resolve(db, user_flag.as_deref())?;
            run_user_command(cmd, rest, db, &ctx)
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn run_user_command(
    command: &str,
    args: &[String],
    db: &mut Database,
    ctx: &RequestContext,
) -> Result<()> {
    match command {
        "add" => cli_add(args, db, ctx),
        "list" | "ls" => cli_list(args, db, ctx),
        "edit" => cli_edit(args, db, ctx),
        "delete" | "rm" => cli_delete(args, db, ctx),
        "budget" => cli_budget(args, db, ctx),
        "report" | "summary" | "s" => cli_report(args, db, ctx),
        "export" => cli_export(args, db, ctx),
        "import" => cli_import(args, db, ctx),
        other => anyhow::bail!("Unknown command: {other}"),
    }
}

fn print_usage() {
    println!("finplan — personal expense tracker with category budgets");
    println!();
    println!("Usage: finplan [--user <name>] <command>");
    println!();
    println!("Commands:");
    println!("  register <username>                       Create a user with an empty budget");
    println!("  add <date> <amount> <category> <desc...>  Record an expense (date as YYYY-MM-DD)");
    println!("  list [filters]                            List expenses, newest first");
    println!("  edit <id> <date> <amount> <category> <desc...>");
    println!("                                            Replace an expense");
    println!("  delete <id>                               Delete an expense");
    println!("  budget                                    Show budget ceilings");
    println!("  budget <food> <utilities> <entertainment> <others>");
    println!("                                            Set all four budget ceilings");
    println!("  report [filters]                          Spending vs budget with alerts");
    println!("                                            (--category hides the overall budget line)");
    println!("  export [path] [filters]                   Export expenses to CSV");
    println!("  import <file.csv>                         Import expenses from CSV");
    println!("  --help, -h                                Show this help");
    println!("  --version, -V                             Show version");
    println!();
    println!("Filters:");
    println!("  --category <name>   Food, Utilities, Entertainment or Others");
    println!("  --from <date>       Inclusive start date");
    println!("  --to <date>         Inclusive end date");
    println!();
    println!("The user may also be set with {USER_ENV}. Categories: Food, Utilities, Entertainment, Others.");
}

fn cli_register(args: &[String], db: &mut Database) -> Result<()> {
    let Some(name) = args.first() else {
        anyhow::bail!("Usage: finplan register <username>");
    };
    let input = RegistrationInput::new(name)?;
    db.insert_user(&User::new(input.username.clone()))?;
    println!("Registration successful! Use --user {} to record expenses.", input.username);
    Ok(())
}

fn cli_add(args: &[String], db: &mut Database, ctx: &RequestContext) -> Result<()> {
    let input = parse_expense_args(args)
        .context("Usage: finplan add <date> <amount> <category> <description...>")?;
    let expense = Expense::new(
        ctx.user_id,
        input.date,
        input.description,
        input.amount,
        input.category,
    );
    let id = db.insert_expense(&expense)?;
    println!("Added #{id}: {expense} ({})", expense.category);
    Ok(())
}

fn cli_list(args: &[String], db: &mut Database, ctx: &RequestContext) -> Result<()> {
    let filter = parse_filter(args)?;
    let expenses = db.get_expenses(ctx.user_id, &filter)?;
    if expenses.is_empty() {
        if filter.is_empty() {
            println!("No expenses");
        } else {
            println!("No expenses match the filter");
        }
        return Ok(());
    }

    println!(
        "{:<6} {:<10}  {:<14} {:>14}  Description",
        "ID", "Date", "Category", "Amount"
    );
    println!("{}", "─".repeat(70));
    for e in &expenses {
        println!(
            "{:<6} {:<10}  {:<14} {:>14}  {}",
            e.id.unwrap_or(0),
            e.date.format("%Y-%m-%d"),
            truncate(&e.category, 14),
            format_amount(e.amount),
            truncate(&e.description, 30),
        );
    }
    println!("{}", "─".repeat(70));
    let total: rust_decimal::Decimal = expenses.iter().map(|e| e.amount).sum();
    println!("{} expense(s), total {}", expenses.len(), format_amount(total));
    Ok(())
}

fn cli_edit(args: &[String], db: &mut Database, ctx: &RequestContext) -> Result<()> {
    let usage = "Usage: finplan edit <id> <date> <amount> <category> <description...>";
    let id = parse_id(args.first()).context(usage)?;
    let input = parse_expense_args(&args[1..]).context(usage)?;

    let mut expense = db
        .get_expense(ctx.user_id, id)?
        .ok_or_else(|| anyhow::anyhow!("Expense #{id} not found"))?;
    expense.date = input.date;
    expense.description = input.description;
    expense.amount = input.amount;
    expense.category = input.category.as_str().to_string();

    if !db.update_expense(&expense)? {
        anyhow::bail!("Expense #{id} not found");
    }
    println!("Updated #{id}: {expense} ({})", expense.category);
    Ok(())
}

fn cli_delete(args: &[String], db: &mut Database, ctx: &RequestContext) -> Result<()> {
    let id = parse_id(args.first()).context("Usage: finplan delete <id>")?;
    if !db.delete_expense(ctx.user_id, id)? {
        anyhow::bail!("Expense #{id} not found");
    }
    println!("Deleted #{id}");
    Ok(())
}

fn cli_budget(args: &[String], db: &mut Database, ctx: &RequestContext) -> Result<()> {
    let profile = match args {
        [] => db.get_budget_profile(ctx.user_id)?,
        [food, utilities, entertainment, others] => {
            let input = BudgetInput::new(food, utilities, entertainment, others)?;
            let profile = db.set_budget_profile(ctx.user_id, &input)?;
            println!("Budget updated.");
            profile
        }
        _ => anyhow::bail!("Usage: finplan budget [<food> <utilities> <entertainment> <others>]"),
    };

    println!("Budget for {}", ctx.username);
    println!("{}", "─".repeat(40));
    for &category in Category::all() {
        println!(
            "  {:<16} {:>16}",
            category.as_str(),
            format_amount(profile.ceiling(category))
        );
    }
    println!("  {:<16} {:>16}", "Total", format_amount(profile.total()));
    Ok(())
}

fn cli_report(args: &[String], db: &mut Database, ctx: &RequestContext) -> Result<()> {
    let filter = parse_filter(args)?;
    let expenses = db.get_expenses(ctx.user_id, &filter)?;
    let profile = db.get_budget_profile(ctx.user_id)?;
    let report = SpendingReport::build(&expenses, &profile);
    let stored = db.get_expense_count(ctx.user_id)?;

    print!("{}", render_report(&report, &ctx.username, expenses.len(), stored, &filter)?);
    Ok(())
}

fn render_report(
    report: &SpendingReport,
    username: &str,
    shown: usize,
    stored: i64,
    filter: &ExpenseFilter,
) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "finplan — {username}")?;
    writeln!(out, "{}", "─".repeat(72))?;
    writeln!(out, "  Expenses:        {shown} of {stored}")?;
    writeln!(out, "  Total spent:     {}", format_amount(report.overall_total))?;
    // One category's spend measured against all four ceilings is meaningless
    if let Some(category) = filter.category {
        writeln!(out, "  Budget:          see the {category} row below")?;
    } else {
        writeln!(out, "  Total budget:    {}", format_amount(report.total_budget))?;
        writeln!(
            out,
            "  Used:            {}% {} ({})",
            report.overall_ratio,
            progress_bar(report.overall_ratio, 20),
            report.overall_severity
        )?;
    }
    writeln!(out, "  Avg per day:     {}", format_amount(report.average_daily_spend))?;

    if !report.totals.is_empty() {
        writeln!(out)?;
        writeln!(out, "Spending by Category:")?;
        for (category, amount) in &report.totals {
            writeln!(out, "  {:<24} {}", category.as_str(), format_amount(*amount))?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "  {:<14} {:>13} {:>13} {:>8}  {:<22} {:<7} Status",
        "Category", "Spent", "Budget", "Used", "", "Level"
    )?;
    for row in &report.categories {
        writeln!(
            out,
            "  {:<14} {:>13} {:>13} {:>7}%  {:<22} {:<7} {}",
            row.category.as_str(),
            format_amount(row.spent),
            format_amount(row.budget),
            row.ratio,
            progress_bar(row.ratio, 20),
            row.severity.as_str(),
            row.alert.as_str(),
        )?;
    }

    let flagged: Vec<_> = report.flagged().collect();
    if !flagged.is_empty() {
        writeln!(out)?;
        for row in flagged {
            writeln!(
                out,
                "  [{}] {}: spent {} of {}",
                row.alert.as_str().to_uppercase(),
                row.category,
                format_amount(row.spent),
                format_amount(row.budget),
            )?;
        }
    }
    Ok(out)
}

fn cli_export(args: &[String], db: &mut Database, ctx: &RequestContext) -> Result<()> {
    let filter = parse_filter(args)?;

    // Output path is the first non-flag argument
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| PathBuf::from(shellexpand(a)))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            Path::new(&home).join(format!("finplan-export-{}.csv", ctx.username))
        });

    let expenses = db.get_expenses(ctx.user_id, &filter)?;
    let count = export_expenses(&expenses, &output_path)?;
    if count == 0 {
        println!("No expenses to export; wrote header only to {}", output_path.display());
    } else {
        println!("Exported {count} expenses to {}", output_path.display());
    }
    Ok(())
}

fn cli_import(args: &[String], db: &mut Database, ctx: &RequestContext) -> Result<()> {
    let Some(file_path) = args.first() else {
        anyhow::bail!("Usage: finplan import <file.csv>");
    };
    let expanded = shellexpand(file_path);
    let path = Path::new(&expanded);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }

    let rows = CsvImporter::read_rows(path)?;
    let expenses = CsvImporter::parse(&rows, ctx.user_id)?;
    let count = db.insert_expenses_batch(&expenses)?;
    println!("Imported {count} expenses");
    Ok(())
}

// ── Argument helpers ─────────────────────────────────────────

/// Pull `--user <name>` out of the argument list.
fn split_user_flag(args: &[String]) -> (Option<String>, Vec<String>) {
    let mut user = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--user" || arg == "-u" {
            user = iter.next().cloned();
        } else if let Some(name) = arg.strip_prefix("--user=") {
            user = Some(name.to_string());
        } else {
            rest.push(arg.clone());
        }
    }
    (user, rest)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_filter(args: &[String]) -> Result<ExpenseFilter> {
    Ok(ExpenseFilter::new(
        flag_value(args, "--category"),
        flag_value(args, "--from"),
        flag_value(args, "--to"),
    )?)
}

/// `<date> <amount> <category> <description...>`
fn parse_expense_args(args: &[String]) -> Result<NewExpenseInput> {
    if args.len() < 4 {
        anyhow::bail!("Missing arguments");
    }
    let description = args[3..].join(" ");
    Ok(NewExpenseInput::new(&args[0], &description, &args[1], &args[2])?)
}

fn parse_id(arg: Option<&String>) -> Result<i64> {
    let raw = arg.ok_or_else(|| anyhow::anyhow!("Missing expense id"))?;
    raw.trim_start_matches('#')
        .parse()
        .with_context(|| format!("Invalid expense id: {raw}"))
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
