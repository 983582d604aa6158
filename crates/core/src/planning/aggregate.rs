//! Rollups over a projection table.

use pennyplan_shared::types::MinorUnits;
use regex::Regex;
use serde::Serialize;

use super::types::{ComputedTransactionName, PlanningData};

/// Matches transaction names literally or by pattern.
///
/// An exact name that is a computed transaction variant (`IncomeTax`,
/// `GrossIncome`, ...) also matches that transaction's display name
/// (`Income tax`, `Salary`, ...), so both spellings aggregate the same rows.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// Exact name.
    Exact(String),
    /// Regular expression.
    Pattern(Regex),
}

impl NameMatcher {
    /// Returns true if `name` matches.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(expected) => {
                expected == name
                    || ComputedTransactionName::ALL.into_iter().any(|computed| {
                        computed.variant_name() == expected.as_str() && computed.as_str() == name
                    })
            }
            Self::Pattern(pattern) => pattern.is_match(name),
        }
    }
}

impl From<&str> for NameMatcher {
    fn from(name: &str) -> Self {
        Self::Exact(name.to_string())
    }
}

impl From<String> for NameMatcher {
    fn from(name: String) -> Self {
        Self::Exact(name)
    }
}

impl From<ComputedTransactionName> for NameMatcher {
    fn from(name: ComputedTransactionName) -> Self {
        Self::Exact(name.as_str().to_string())
    }
}

impl From<Regex> for NameMatcher {
    fn from(pattern: Regex) -> Self {
        Self::Pattern(pattern)
    }
}

/// Sums `computed_value` over every transaction, in every account and
/// month, whose name matches any of `names`. Unknown values count as zero.
#[must_use]
pub fn sum_computed_transactions_by_name(table: &[PlanningData], names: &[NameMatcher]) -> MinorUnits {
    table
        .iter()
        .flat_map(|row| row.accounts.iter())
        .flat_map(|account| account.transactions.iter())
        .filter(|transaction| names.iter().any(|matcher| matcher.matches(&transaction.name)))
        .map(|transaction| transaction.computed_value.unwrap_or(0))
        .fold(0, MinorUnits::saturating_add)
}

/// Standard totals over a projection table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanningSummary {
    /// Gross salary.
    pub gross_income: MinorUnits,
    /// Income tax (negative).
    pub income_tax: MinorUnits,
    /// National Insurance (negative).
    pub ni: MinorUnits,
    /// Student loan repayments (negative).
    pub student_loan: MinorUnits,
    /// Salary-sacrifice pension (negative).
    pub pension: MinorUnits,
    /// Pension tax relief.
    pub tax_relief: MinorUnits,
}

impl PlanningSummary {
    /// Builds the standard totals.
    #[must_use]
    pub fn from_table(table: &[PlanningData]) -> Self {
        let sum = |name: ComputedTransactionName| {
            sum_computed_transactions_by_name(table, &[NameMatcher::from(name)])
        };

        Self {
            gross_income: sum(ComputedTransactionName::GrossIncome),
            income_tax: sum(ComputedTransactionName::IncomeTax),
            ni: sum(ComputedTransactionName::NI),
            student_loan: sum(ComputedTransactionName::StudentLoan),
            pension: sum(ComputedTransactionName::Pension),
            tax_relief: table
                .iter()
                .flat_map(|row| row.accounts.iter())
                .map(|account| account.tax_relief)
                .fold(0, MinorUnits::saturating_add),
        }
    }
}
