//! Budget-vs-expense aggregation.
//!
//! Everything here is a pure function over in-memory records. Zero
//! denominators (no dated records, zero budget) produce zero instead of an
//! error, and records whose stored category is not one of the known
//! [`Category`] values are left out of per-category figures while still
//! counting toward the overall total.

use std::collections::{BTreeMap, HashSet};

use rust_decimal::Decimal;

use crate::models::{BudgetProfile, Category, Expense};

const SEVERITY_MEDIUM: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const SEVERITY_HIGH: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
/// 0.60
const WARNING_FLOOR: Decimal = Decimal::from_parts(60, 0, 0, false, 2);
/// 0.99
const WARNING_CEILING: Decimal = Decimal::from_parts(99, 0, 0, false, 2);

/// Sum of amounts per known category. Categories without records are absent.
pub(crate) fn category_totals(records: &[Expense]) -> BTreeMap<Category, Decimal> {
    let mut totals = BTreeMap::new();
    for record in records {
        if let Some(category) = record.category() {
            *totals.entry(category).or_insert(Decimal::ZERO) += record.amount;
        }
    }
    totals
}

/// Sum of every amount, whatever its category.
pub(crate) fn overall_total(records: &[Expense]) -> Decimal {
    records.iter().map(|r| r.amount).sum()
}

/// Overall total divided by the number of distinct days that have at least
/// one record (not the calendar span between first and last record).
pub(crate) fn average_daily_spend(records: &[Expense]) -> Decimal {
    let days: HashSet<_> = records.iter().map(|r| r.date).collect();
    if days.is_empty() {
        return Decimal::ZERO;
    }
    overall_total(records) / Decimal::from(days.len())
}

/// Percentage of `budget` consumed by `spent`, rounded to two places
/// (half-to-even).
pub(crate) fn progress_ratio(spent: Decimal, budget: Decimal) -> Decimal {
    if budget.is_zero() {
        return Decimal::ZERO;
    }
    (spent / budget * Decimal::ONE_HUNDRED).round_dp(2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProgressSeverity {
    Low,
    Medium,
    High,
}

impl ProgressSeverity {
    pub(crate) fn from_ratio(ratio: Decimal) -> Self {
        if ratio < SEVERITY_MEDIUM {
            Self::Low
        } else if ratio < SEVERITY_HIGH {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl std::fmt::Display for ProgressSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AlertStatus {
    Alert,
    Warning,
    Clear,
}

impl AlertStatus {
    /// `spent >= budget` is an alert; `0.60*budget <= spent <= 0.99*budget`
    /// is a warning. Anything else, including the band strictly between
    /// 99% and 100%, carries no status.
    pub(crate) fn evaluate(spent: Decimal, budget: Decimal) -> Self {
        if spent >= budget {
            Self::Alert
        } else if spent >= WARNING_FLOOR * budget && spent <= WARNING_CEILING * budget {
            Self::Warning
        } else {
            Self::Clear
        }
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Alert => "alert",
            Self::Warning => "warning",
            Self::Clear => "",
        }
    }

    pub(crate) fn is_flagged(&self) -> bool {
        !matches!(self, Self::Clear)
    }
}

impl std::fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Spend against budget for a single category.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryStatus {
    pub(crate) category: Category,
    pub(crate) spent: Decimal,
    pub(crate) budget: Decimal,
    pub(crate) ratio: Decimal,
    pub(crate) severity: ProgressSeverity,
    pub(crate) alert: AlertStatus,
}

impl CategoryStatus {
    fn new(category: Category, spent: Decimal, budget: Decimal) -> Self {
        let ratio = progress_ratio(spent, budget);
        Self {
            category,
            spent,
            budget,
            ratio,
            severity: ProgressSeverity::from_ratio(ratio),
            alert: AlertStatus::evaluate(spent, budget),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SpendingReport {
    pub(crate) totals: BTreeMap<Category, Decimal>,
    pub(crate) overall_total: Decimal,
    pub(crate) average_daily_spend: Decimal,
    pub(crate) total_budget: Decimal,
    pub(crate) overall_ratio: Decimal,
    pub(crate) overall_severity: ProgressSeverity,
    pub(crate) overall_alert: AlertStatus,
    /// One row per known category, in [`Category::all`] order.
    pub(crate) categories: Vec<CategoryStatus>,
}

impl SpendingReport {
    pub(crate) fn build(records: &[Expense], profile: &BudgetProfile) -> Self {
        let totals = category_totals(records);
        let overall = overall_total(records);
        let total_budget = profile.total();

        let uncategorized = records.iter().filter(|r| r.category().is_none()).count();
        if uncategorized > 0 {
            tracing::debug!(
                user_id = profile.user_id,
                uncategorized,
                "records with unknown category left out of category totals"
            );
        }

        let categories = Category::all()
            .iter()
            .map(|&c| {
                let spent = totals.get(&c).copied().unwrap_or(Decimal::ZERO);
                CategoryStatus::new(c, spent, profile.ceiling(c))
            })
            .collect();

        let overall_ratio = progress_ratio(overall, total_budget);
        Self {
            average_daily_spend: average_daily_spend(records),
            overall_total: overall,
            total_budget,
            overall_ratio,
            overall_severity: ProgressSeverity::from_ratio(overall_ratio),
            overall_alert: AlertStatus::evaluate(overall, total_budget),
            totals,
            categories,
        }
    }

    /// Categories currently at warning or alert level.
    pub(crate) fn flagged(&self) -> impl Iterator<Item = &CategoryStatus> {
        self.categories.iter().filter(|c| c.alert.is_flagged())
    }
}
