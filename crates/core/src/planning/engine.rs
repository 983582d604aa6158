//! Planning engine: folds the horizon month by month into projection rows.

use chrono::Datelike;
use pennyplan_shared::types::MinorUnits;
use uuid::Uuid;

use super::credit_card::CreditCardPredictor;
use super::error::PlanningError;
use super::months::{PlanningMonth, START_MONTH, fill_months, financial_year};
use super::projector::{AccountMonth, MonthlyAccountProjector};
use super::types::{
    Account, AccountCreditCardPayment, AccountTransaction, AccountValue, MonthByAccount,
    PlanningData, ProjectionInput, RecordedValue,
};

/// Engine for running planning projections.
pub struct PlanningEngine;

impl PlanningEngine {
    /// Checks that the horizon is non-empty, valid and strictly ascending.
    ///
    /// # Errors
    ///
    /// Returns `EmptyHorizon`, `InvalidMonth` or `UnorderedHorizon`.
    pub fn validate_horizon(months: &[PlanningMonth]) -> Result<(), PlanningError> {
        if months.is_empty() {
            return Err(PlanningError::EmptyHorizon);
        }

        for month in months {
            let expected = PlanningMonth::new(month.year, month.month)?;
            if expected.date != month.date {
                return Err(PlanningError::InvalidMonth {
                    year: month.year,
                    month: month.month,
                });
            }
        }

        if let Some(pair) = months
            .windows(2)
            .find(|pair| (pair[0].year, pair[0].month) >= (pair[1].year, pair[1].month))
        {
            return Err(PlanningError::UnorderedHorizon {
                year: pair[1].year,
                month: pair[1].month,
            });
        }

        Ok(())
    }

    /// Months between the latest recorded balance on or before the start of
    /// the horizon and the horizon itself.
    ///
    /// The run starts from the month of that balance so the balance chain
    /// reaches the first planning month. Empty when there is no such balance
    /// or it already sits in the first planning month.
    ///
    /// # Errors
    ///
    /// Returns `PlanningError::InvalidMonth` if the recorded date is out of range.
    pub fn lead_in_months(input: &ProjectionInput) -> Result<Vec<PlanningMonth>, PlanningError> {
        let Some(first) = input.months.first() else {
            return Ok(Vec::new());
        };

        let latest = input
            .accounts
            .iter()
            .flat_map(|account| account.recorded_values.iter())
            .map(|recorded| recorded.date)
            .filter(|date| *date <= first.date)
            .max();
        let Some(latest) = latest else {
            return Ok(Vec::new());
        };

        let start = PlanningMonth::new(latest.year(), latest.month())?;
        let gap = (i64::from(first.year) - i64::from(start.year)) * 12 + i64::from(first.month)
            - i64::from(start.month);
        let count = usize::try_from(gap).unwrap_or(0);

        fill_months(start, count)
    }

    /// Runs a full projection.
    ///
    /// Rows are produced in horizon order; each month sees every earlier row
    /// for credit card prediction, balances and tax relief carry-over.
    /// Lead-in months are projected first and dropped from the result.
    ///
    /// # Errors
    ///
    /// Returns a `PlanningError` if the horizon is invalid.
    pub fn run(input: &ProjectionInput) -> Result<Vec<PlanningData>, PlanningError> {
        Self::validate_horizon(&input.months)?;

        let lead_in = Self::lead_in_months(input)?;
        let skipped = lead_in.len();
        if skipped > 0 {
            tracing::debug!(
                lead_in = skipped,
                year = lead_in[0].year,
                month = lead_in[0].month,
                "Projecting from latest recorded balance"
            );
        }

        let months: Vec<PlanningMonth> = lead_in
            .into_iter()
            .chain(input.months.iter().copied())
            .collect();
        let mut rows: Vec<PlanningData> = Vec::with_capacity(months.len());

        for month in &months {
            let rates = input.rates.for_financial_year(month.financial_year());
            let projected =
                MonthlyAccountProjector::project_month(input.today, &rates, &input.accounts, month);

            let accounts = input
                .accounts
                .iter()
                .zip(projected)
                .enumerate()
                .map(|(index, (account, projection))| {
                    Self::month_by_account(&rows, month, account, index, projection)
                })
                .collect::<Result<Vec<_>, PlanningError>>()?;

            tracing::debug!(
                year = month.year,
                month = month.month,
                is_past = month.is_past(input.today),
                accounts = accounts.len(),
                "Projected planning month"
            );

            rows.push(PlanningData {
                year: month.year,
                month: month.month,
                date: month.date,
                is_current_month: month.is_current(input.today),
                accounts,
            });
        }

        Ok(rows.split_off(skipped))
    }

    fn month_by_account(
        prior: &[PlanningData],
        month: &PlanningMonth,
        account: &Account,
        account_index: usize,
        projection: AccountMonth,
    ) -> Result<MonthByAccount, PlanningError> {
        let key = account
            .id
            .map_or_else(|| format!("new_{}", account.name), |id| id.to_string());

        let previous_row = prior.last().and_then(|row| row.accounts.get(account_index));
        let (start, start_verified) = match previous_row {
            Some(previous) => (
                previous.end_value.computed_value,
                previous.end_value.is_verified,
            ),
            None => {
                let recorded = recorded_value_in(&account.recorded_values, &month.previous()?);
                (recorded, recorded.is_some())
            }
        };

        let credit_cards =
            CreditCardPredictor::for_account_at_month(prior, month, account, account_index);

        let recorded_end = recorded_value_in(&account.recorded_values, month);
        let end = recorded_end.or_else(|| {
            start.map(|start| {
                start
                    .saturating_add(transactions_total(&projection.transactions))
                    .saturating_add(credit_cards_total(&credit_cards))
            })
        });

        let previous_year_tax_relief = if month.month == START_MONTH {
            let previous_year = month.financial_year() - 1;
            prior
                .iter()
                .filter(|row| financial_year(row.year, row.month) == previous_year)
                .filter_map(|row| row.accounts.get(account_index))
                .map(|row| row.tax_relief)
                .fold(0, MinorUnits::saturating_add)
        } else {
            0
        };

        Ok(MonthByAccount {
            account_id: account.id,
            account_name: account.name.clone(),
            start_value: AccountValue {
                id: format!("{key}_start"),
                name: account.name.clone(),
                computed_value: start,
                is_verified: start_verified,
            },
            transactions: projection.transactions,
            credit_cards,
            tax_relief: projection.tax_relief,
            previous_year_tax_relief,
            end_value: AccountValue {
                id: format!("{key}_end"),
                name: account.name.clone(),
                computed_value: end,
                is_verified: recorded_end.is_some(),
            },
        })
    }

    /// Returns a deterministic hash of the projection input.
    #[must_use]
    pub fn hash_input(input: &ProjectionInput) -> String {
        let serialized = serde_json::to_string(input).unwrap_or_else(|_| format!("{input:?}"));
        Uuid::new_v5(&Uuid::NAMESPACE_OID, serialized.as_bytes()).to_string()
    }
}

fn recorded_value_in(recorded: &[RecordedValue], month: &PlanningMonth) -> Option<MinorUnits> {
    recorded
        .iter()
        .filter(|value| month.contains(value.date))
        .max_by_key(|value| value.date)
        .map(|value| value.value)
}

fn transactions_total(transactions: &[AccountTransaction]) -> MinorUnits {
    transactions
        .iter()
        .map(|transaction| transaction.computed_value.unwrap_or(0))
        .fold(0, MinorUnits::saturating_add)
}

fn credit_cards_total(payments: &[AccountCreditCardPayment]) -> MinorUnits {
    payments
        .iter()
        .map(|payment| payment.value.unwrap_or(0))
        .fold(0, MinorUnits::saturating_add)
}
