//! Planning data types.

use chrono::NaiveDate;
use pennyplan_shared::types::{AccountId, CreditCardId, MinorUnits, PlanningValueId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::credit_card::CreditCard;
use super::error::UnknownTransactionName;
use super::months::PlanningMonth;
use super::rates::RatesTable;

/// Names of the transactions the engine synthesises from declared income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComputedTransactionName {
    /// Gross monthly salary.
    GrossIncome,
    /// Salary-sacrifice pension contribution.
    Pension,
    /// PAYE income tax.
    IncomeTax,
    /// National Insurance.
    NI,
    /// Student loan repayment.
    StudentLoan,
}

impl ComputedTransactionName {
    /// Every computed transaction name, in emission order.
    pub const ALL: [Self; 5] = [
        Self::GrossIncome,
        Self::Pension,
        Self::IncomeTax,
        Self::NI,
        Self::StudentLoan,
    ];

    /// Variant name, as used when referring to the transaction in code.
    #[must_use]
    pub const fn variant_name(self) -> &'static str {
        match self {
            Self::GrossIncome => "GrossIncome",
            Self::Pension => "Pension",
            Self::IncomeTax => "IncomeTax",
            Self::NI => "NI",
            Self::StudentLoan => "StudentLoan",
        }
    }

    /// Display name used on the transaction.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GrossIncome => "Salary",
            Self::Pension => "Pension (SalSac)",
            Self::IncomeTax => "Income tax",
            Self::NI => "NI",
            Self::StudentLoan => "Student loan",
        }
    }
}

impl std::str::FromStr for ComputedTransactionName {
    type Err = UnknownTransactionName;

    /// Parses either the variant name (`IncomeTax`) or the display name (`Income tax`).
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|computed| computed.variant_name() == name || computed.as_str() == name)
            .ok_or_else(|| UnknownTransactionName(name.to_string()))
    }
}

impl std::fmt::Display for ComputedTransactionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared income arrangement (salary, pension sacrifice, tax code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeGroup {
    /// First day the arrangement applies.
    pub start_date: NaiveDate,
    /// Last day the arrangement applies.
    pub end_date: NaiveDate,
    /// Annual gross salary.
    pub salary: MinorUnits,
    /// Salary-sacrifice pension contribution as a fraction of gross.
    pub pension_contrib: Decimal,
    /// PAYE tax code; empty if not yet known.
    #[serde(default)]
    pub tax_code: String,
    /// Whether student loan repayments are due.
    #[serde(default)]
    pub student_loan: bool,
}

/// A named deduction on a realised payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deduction {
    /// Deduction name (e.g. "Income tax").
    pub name: String,
    /// Signed amount; deductions are negative.
    pub value: MinorUnits,
}

/// A realised payslip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastIncomeRecord {
    /// Payment date.
    pub date: NaiveDate,
    /// Gross pay.
    pub gross: MinorUnits,
    /// Named deductions.
    #[serde(default)]
    pub deductions: Vec<Deduction>,
}

/// A manually entered line item for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningValue {
    /// Persisted ID, if saved.
    #[serde(default)]
    pub id: Option<PlanningValueId>,
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Line item name.
    pub name: String,
    /// Literal amount, used when there is no formula.
    #[serde(default)]
    pub value: Option<MinorUnits>,
    /// Arithmetic formula in major units; takes precedence over `value`.
    #[serde(default)]
    pub formula: Option<String>,
    /// Account receiving this amount, if the entry is a transfer.
    #[serde(default)]
    pub transfer_to_account_id: Option<AccountId>,
}

impl PlanningValue {
    /// Returns true if the entry belongs to the given month.
    #[must_use]
    pub fn is_in(&self, month: &PlanningMonth) -> bool {
        self.year == month.year && self.month == month.month
    }
}

/// A recorded balance for an account (from a net-worth snapshot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedValue {
    /// Snapshot date.
    pub date: NaiveDate,
    /// Balance.
    pub value: MinorUnits,
}

/// An account as seen by the planning engine. Read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Persisted ID; unsaved accounts cannot receive transfers.
    #[serde(default)]
    pub id: Option<AccountId>,
    /// Account name.
    pub name: String,
    /// Declared income arrangements.
    #[serde(default)]
    pub income: Vec<IncomeGroup>,
    /// Realised payslips.
    #[serde(default)]
    pub past_income: Vec<PastIncomeRecord>,
    /// Manual line items.
    #[serde(default)]
    pub values: Vec<PlanningValue>,
    /// Credit cards paid from this account.
    #[serde(default)]
    pub credit_cards: Vec<CreditCard>,
    /// Recorded balances.
    #[serde(default)]
    pub recorded_values: Vec<RecordedValue>,
}

/// One named transaction on an account in one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTransaction {
    /// Stable row identifier.
    pub id: String,
    /// Transaction name.
    pub name: String,
    /// Resolved amount; `None` when unknown or unparseable.
    pub computed_value: Option<MinorUnits>,
    /// Literal amount as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<MinorUnits>,
    /// Formula as entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<String>,
    /// Synthesised by the engine rather than entered by hand.
    pub is_computed: bool,
    /// Derived from realised data for a past month.
    pub is_verified: bool,
    /// Part of an inter-account transfer.
    #[serde(default)]
    pub is_transfer: bool,
}

/// A credit card payment, recorded or predicted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCreditCardPayment {
    /// Card identifier.
    pub credit_card_id: CreditCardId,
    /// Card name.
    pub name: String,
    /// Payment amount; `None` when it cannot be predicted yet.
    pub value: Option<MinorUnits>,
    /// Whether the payment was recorded.
    pub is_verified: bool,
}

/// An opening or closing balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountValue {
    /// Stable row identifier.
    pub id: String,
    /// Account name.
    pub name: String,
    /// Balance; `None` when there is no recorded starting point.
    pub computed_value: Option<MinorUnits>,
    /// Whether the balance was recorded.
    pub is_verified: bool,
}

/// Projection of one account for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthByAccount {
    /// Account ID.
    pub account_id: Option<AccountId>,
    /// Account name.
    pub account_name: String,
    /// Opening balance.
    pub start_value: AccountValue,
    /// Income, then manual, then transfer transactions.
    pub transactions: Vec<AccountTransaction>,
    /// Credit card payments.
    pub credit_cards: Vec<AccountCreditCardPayment>,
    /// Pension tax relief earned this month.
    pub tax_relief: MinorUnits,
    /// Relief earned over the previous financial year; non-zero in April only.
    pub previous_year_tax_relief: MinorUnits,
    /// Closing balance.
    pub end_value: AccountValue,
}

/// One row of the projection table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningData {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Last day of the month.
    pub date: NaiveDate,
    /// Whether "today" falls in this month.
    pub is_current_month: bool,
    /// Per-account projections, in input account order.
    pub accounts: Vec<MonthByAccount>,
}

/// Everything a projection run reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionInput {
    /// Reference date separating past from future.
    pub today: NaiveDate,
    /// Accounts, in display order.
    pub accounts: Vec<Account>,
    /// Planning horizon, ascending.
    pub months: Vec<PlanningMonth>,
    /// Rates by financial year.
    #[serde(default)]
    pub rates: RatesTable,
}

/// Result of a (possibly cached) projection run.
#[derive(Debug, Clone)]
pub struct ProjectionResult {
    /// Projection rows.
    pub rows: std::sync::Arc<Vec<PlanningData>>,
    /// Hash of the input used as cache key.
    pub input_hash: String,
    /// Whether the rows came from the cache.
    pub cached: bool,
}
