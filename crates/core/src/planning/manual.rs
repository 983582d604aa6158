//! Manual line items for an account-month.

use uuid::Uuid;

use super::formula::FormulaEvaluator;
use super::months::PlanningMonth;
use super::types::{Account, AccountTransaction, PlanningValue};

/// Stable row identifier for a manual entry.
///
/// Saved entries use their persisted ID. Unsaved entries get a name-based
/// UUID derived from their content, so unchanged rows keep their identity.
#[must_use]
pub fn manual_transaction_id(entry: &PlanningValue) -> String {
    match entry.id {
        Some(id) => format!("manual-transaction-{id}"),
        None => {
            let content = format!(
                "{}|{}|{}|{}|{}",
                entry.year,
                entry.month,
                entry.name,
                entry.value.map(|value| value.to_string()).unwrap_or_default(),
                entry.formula.as_deref().unwrap_or_default(),
            );
            let synthetic = Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes());
            format!("manual-transaction-new-{synthetic}")
        }
    }
}

/// Maps an account's manual entries for a month to transactions.
#[must_use]
pub fn manual_transactions_for_account_at_month(
    month: &PlanningMonth,
    is_past: bool,
    account: &Account,
) -> Vec<AccountTransaction> {
    account
        .values
        .iter()
        .filter(|entry| entry.is_in(month))
        .map(|entry| AccountTransaction {
            id: manual_transaction_id(entry),
            name: entry.name.clone(),
            computed_value: FormulaEvaluator::resolve(entry),
            value: entry.value,
            formula: entry.formula.clone(),
            is_computed: false,
            is_verified: is_past,
            is_transfer: entry.transfer_to_account_id.is_some(),
        })
        .collect()
}
