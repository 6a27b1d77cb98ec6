use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use super::HEADER;
use crate::forms::NewExpenseInput;
use crate::models::Expense;

pub(crate) struct CsvImporter;

/// One CSV record together with the file line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CsvRow {
    pub(crate) line: u64,
    pub(crate) fields: Vec<String>,
}

impl CsvImporter {
    /// Read every row of the file as strings, dropping a leading header row.
    pub(crate) fn read_rows(path: &Path) -> Result<Vec<CsvRow>> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .has_headers(false)
            .from_path(path)
            .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

        let mut all_rows: Vec<CsvRow> = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result.context("Failed to read CSV record")?;
            let line = record.position().map_or(i as u64 + 1, |p| p.line());
            all_rows.push(CsvRow {
                line,
                fields: record.iter().map(|s| s.to_string()).collect(),
            });
        }

        if all_rows.is_empty() {
            anyhow::bail!("CSV file is empty");
        }

        if is_header(&all_rows[0].fields) {
            all_rows.remove(0);
        }
        Ok(all_rows)
    }

    /// Validate rows (`date, description, amount[, category]`) into expenses
    /// for `user_id`. The first invalid row aborts with its file line number.
    pub(crate) fn parse(rows: &[CsvRow], user_id: i64) -> Result<Vec<Expense>> {
        let mut expenses = Vec::with_capacity(rows.len());

        for row in rows {
            if row.fields.iter().all(|f| f.trim().is_empty()) {
                continue;
            }
            let field = |idx: usize| row.fields.get(idx).map(|s| s.trim()).unwrap_or("");

            let raw_date = field(0);
            let date = parse_date(raw_date)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| raw_date.to_string());
            let amount = clean_amount(field(2));

            let input = NewExpenseInput::new(&date, field(1), &amount, field(3))
                .with_context(|| format!("Line {}: invalid expense", row.line))?;

            expenses.push(Expense::new(
                user_id,
                input.date,
                input.description,
                input.amount,
                input.category,
            ));
        }

        Ok(expenses)
    }
}

/// The first row is a header when it spells out our column names, or when
/// none of its fields reads as a date or an amount. A data row with a typo
/// still has its amount, so it is kept and fails validation instead.
fn is_header(fields: &[String]) -> bool {
    let named = !fields.is_empty()
        && fields.len() <= HEADER.len()
        && fields
            .iter()
            .zip(HEADER)
            .all(|(f, h)| f.trim().eq_ignore_ascii_case(h));
    if named {
        return true;
    }
    !fields.iter().any(|f| {
        let f = f.trim();
        parse_date(f).is_some() || Decimal::from_str(&clean_amount(f)).is_ok()
    })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Strip currency symbols and thousands separators.
fn clean_amount(s: &str) -> String {
    s.replace(['$', ',', '₹', '"'], "")
        .trim_start_matches("INR")
        .trim_start_matches("Rs.")
        .trim()
        .to_string()
}

#[cfg(test)]
#[path = "csv_import_tests.rs"]
mod tests;
