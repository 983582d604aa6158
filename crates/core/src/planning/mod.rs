//! Financial planning projection engine.
//!
//! Reconstructs past months from payslips, predicts future months from
//! declared income, and reconciles manual entries, transfers and credit card
//! payments into one ordered transaction list per account per month.

pub mod aggregate;
pub mod cache;
pub mod credit_card;
pub mod engine;
pub mod error;
pub mod formula;
pub mod income;
pub mod manual;
pub mod months;
pub mod projector;
pub mod rates;
pub mod transfers;
pub mod types;

#[cfg(test)]
mod tests;

#[cfg(test)]
mod formula_props;

#[cfg(test)]
mod rates_props;

pub use aggregate::{NameMatcher, PlanningSummary, sum_computed_transactions_by_name};
pub use cache::ProjectionCache;
pub use credit_card::{CreditCard, CreditCardPayment, CreditCardPredictor};
pub use engine::PlanningEngine;
pub use error::{FormulaError, PlanningError, UnknownTransactionName};
pub use formula::FormulaEvaluator;
pub use income::{IncomeTransactionBuilder, IncomeTransactions};
pub use manual::manual_transactions_for_account_at_month;
pub use months::{PlanningMonth, START_MONTH, financial_year, fill_months, horizon, planning_months};
pub use projector::{AccountMonth, MonthlyAccountProjector};
pub use rates::{IncomeRates, RatesTable, TaxCalculator};
pub use transfers::transfer_transactions_for_account_at_month;
pub use types::{
    Account, AccountCreditCardPayment, AccountTransaction, AccountValue, ComputedTransactionName,
    Deduction, IncomeGroup, MonthByAccount, PastIncomeRecord, PlanningData, PlanningValue,
    ProjectionInput, ProjectionResult, RecordedValue,
};
