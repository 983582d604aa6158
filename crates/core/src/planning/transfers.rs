//! Receiving legs of inter-account transfers.

use super::formula::FormulaEvaluator;
use super::manual::manual_transaction_id;
use super::months::PlanningMonth;
use super::types::{Account, AccountTransaction};

/// Materialises the credit leg on `accounts[target_index]` for every manual
/// entry, on any account, that transfers into it during `month`.
///
/// The sending account already carries the debit as its own manual entry.
/// A target without a persisted ID cannot receive transfers.
#[must_use]
pub fn transfer_transactions_for_account_at_month(
    month: &PlanningMonth,
    is_past: bool,
    accounts: &[Account],
    target_index: usize,
) -> Vec<AccountTransaction> {
    let Some(target_id) = accounts.get(target_index).and_then(|account| account.id) else {
        return Vec::new();
    };

    accounts
        .iter()
        .flat_map(|source| {
            source
                .values
                .iter()
                .filter(move |entry| {
                    entry.is_in(month) && entry.transfer_to_account_id == Some(target_id)
                })
                .map(move |entry| AccountTransaction {
                    id: format!("{}-transfer", manual_transaction_id(entry)),
                    name: format!("{} transfer", source.name),
                    computed_value: FormulaEvaluator::resolve(entry).map(i64::saturating_neg),
                    value: None,
                    formula: None,
                    is_computed: true,
                    is_verified: is_past,
                    is_transfer: true,
                })
        })
        .collect()
}
