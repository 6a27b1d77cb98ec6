use anyhow::{Context, Result};
use std::path::Path;

use super::HEADER;
use crate::models::Expense;

/// Write `expenses` to `path`, overwriting it. Returns the row count.
pub(crate) fn export_expenses(expenses: &[Expense], path: &Path) -> Result<usize> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;
    wtr.write_record(HEADER)?;
    for e in expenses {
        wtr.write_record([
            e.date.format("%Y-%m-%d").to_string(),
            e.description.clone(),
            e.amount.to_string(),
            e.category.clone(),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
    tracing::info!(rows = expenses.len(), path = %path.display(), "exported expenses");
    Ok(expenses.len())
}

#[cfg(test)]
#[path = "csv_export_tests.rs"]
mod tests;
