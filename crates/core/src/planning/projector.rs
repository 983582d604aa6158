//! Per-month assembly of each account's transaction list.

use chrono::NaiveDate;
use pennyplan_shared::types::MinorUnits;

use super::income::{IncomeTransactionBuilder, IncomeTransactions};
use super::manual::manual_transactions_for_account_at_month;
use super::months::PlanningMonth;
use super::rates::IncomeRates;
use super::transfers::transfer_transactions_for_account_at_month;
use super::types::{Account, AccountTransaction};

/// Transactions and tax relief for one account in one month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountMonth {
    /// Income (non-zero), then manual, then transfer (non-zero) transactions.
    pub transactions: Vec<AccountTransaction>,
    /// Tax relief on manual pension contributions.
    pub tax_relief: MinorUnits,
}

fn is_nonzero(transaction: &AccountTransaction) -> bool {
    transaction.computed_value.unwrap_or(0) != 0
}

/// Projects accounts month by month.
pub struct MonthlyAccountProjector;

impl MonthlyAccountProjector {
    fn own_transactions(
        today: NaiveDate,
        rates: &IncomeRates,
        account: &Account,
        month: &PlanningMonth,
    ) -> (IncomeTransactions, Vec<AccountTransaction>) {
        let is_past = month.is_past(today);
        let manual = manual_transactions_for_account_at_month(month, is_past, account);
        let income = if is_past {
            IncomeTransactionBuilder::past_at_month(month, account, &manual, rates)
        } else {
            IncomeTransactionBuilder::predicted_at_month(month, account, &manual, rates)
        };
        (income, manual)
    }

    fn assemble(
        income: IncomeTransactions,
        manual: Vec<AccountTransaction>,
        transfers: Vec<AccountTransaction>,
    ) -> AccountMonth {
        let mut transactions: Vec<AccountTransaction> =
            income.transactions.into_iter().filter(is_nonzero).collect();
        transactions.extend(manual);
        transactions.extend(transfers.into_iter().filter(is_nonzero));

        AccountMonth {
            transactions,
            tax_relief: income.tax_relief,
        }
    }

    /// Projects a single account for one month.
    #[must_use]
    pub fn project_account(
        today: NaiveDate,
        rates: &IncomeRates,
        accounts: &[Account],
        account_index: usize,
        month: &PlanningMonth,
    ) -> AccountMonth {
        let Some(account) = accounts.get(account_index) else {
            return AccountMonth::default();
        };
        let (income, manual) = Self::own_transactions(today, rates, account, month);
        let transfers = transfer_transactions_for_account_at_month(
            month,
            month.is_past(today),
            accounts,
            account_index,
        );
        Self::assemble(income, manual, transfers)
    }

    /// Projects every account for one month.
    ///
    /// Income and manual transactions are computed for all accounts first;
    /// transfer legs are then resolved against that full monthly snapshot.
    #[must_use]
    pub fn project_month(
        today: NaiveDate,
        rates: &IncomeRates,
        accounts: &[Account],
        month: &PlanningMonth,
    ) -> Vec<AccountMonth> {
        let is_past = month.is_past(today);

        let own: Vec<_> = accounts
            .iter()
            .map(|account| Self::own_transactions(today, rates, account, month))
            .collect();

        own.into_iter()
            .enumerate()
            .map(|(index, (income, manual))| {
                let transfers =
                    transfer_transactions_for_account_at_month(month, is_past, accounts, index);
                Self::assemble(income, manual, transfers)
            })
            .collect()
    }
}
