//! Credit card payment lookup and median-based prediction.

use pennyplan_shared::types::money::round_to_minor;
use pennyplan_shared::types::{CreditCardId, MinorUnits};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::months::PlanningMonth;
use super::types::{Account, AccountCreditCardPayment, PlanningData};

/// A recorded monthly payment towards a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCardPayment {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: u32,
    /// Amount paid; negative when leaving the account.
    pub value: MinorUnits,
}

/// A credit card paid from an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCard {
    /// Card identifier.
    pub id: CreditCardId,
    /// Card name.
    pub name: String,
    /// Recorded payments.
    #[serde(default)]
    pub payments: Vec<CreditCardPayment>,
}

/// Returns the median, averaging (and rounding) the middle pair for even counts.
#[must_use]
pub fn median(values: &mut [MinorUnits]) -> Option<MinorUnits> {
    if values.is_empty() {
        return None;
    }

    values.sort_unstable();

    let middle = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[middle])
    } else {
        let pair = Decimal::from(values[middle - 1]) + Decimal::from(values[middle]);
        Some(round_to_minor(pair / Decimal::TWO))
    }
}

/// Predicts and looks up credit card payments.
pub struct CreditCardPredictor;

impl CreditCardPredictor {
    /// Predicts a card payment from the median of its verified payments in
    /// earlier rows of the same account.
    ///
    /// Returns `None` when there is no verified history.
    #[must_use]
    pub fn predict(
        prior_months: &[PlanningData],
        account_index: usize,
        card_id: CreditCardId,
    ) -> Option<MinorUnits> {
        median(&mut Self::verified_in_rows(prior_months, account_index, card_id))
    }

    fn verified_in_rows(
        prior_months: &[PlanningData],
        account_index: usize,
        card_id: CreditCardId,
    ) -> Vec<MinorUnits> {
        prior_months
            .iter()
            .filter_map(|row| row.accounts.get(account_index))
            .flat_map(|account| account.credit_cards.iter())
            .filter(|payment| payment.credit_card_id == card_id && payment.is_verified)
            .filter_map(|payment| payment.value)
            .collect()
    }

    /// Predicts from the verified payments in earlier rows together with the
    /// card's recorded payments from before the first row.
    #[must_use]
    pub fn predict_with_history(
        prior_months: &[PlanningData],
        month: &PlanningMonth,
        card: &CreditCard,
        account_index: usize,
    ) -> Option<MinorUnits> {
        let before = prior_months
            .first()
            .map_or((month.year, month.month), |row| (row.year, row.month));

        let mut verified = Self::verified_in_rows(prior_months, account_index, card.id);
        verified.extend(
            card.payments
                .iter()
                .filter(|payment| (payment.year, payment.month) < before)
                .map(|payment| payment.value),
        );

        median(&mut verified)
    }

    /// Returns one payment per registered card: the recorded payment for the
    /// month if there is one, otherwise a prediction from all earlier
    /// verified payments.
    #[must_use]
    pub fn for_account_at_month(
        prior_months: &[PlanningData],
        month: &PlanningMonth,
        account: &Account,
        account_index: usize,
    ) -> Vec<AccountCreditCardPayment> {
        account
            .credit_cards
            .iter()
            .map(|card| {
                let recorded = card
                    .payments
                    .iter()
                    .find(|payment| payment.year == month.year && payment.month == month.month)
                    .map(|payment| payment.value);

                AccountCreditCardPayment {
                    credit_card_id: card.id,
                    name: card.name.clone(),
                    value: recorded.or_else(|| {
                        Self::predict_with_history(prior_months, month, card, account_index)
                    }),
                    is_verified: recorded.is_some(),
                }
            })
            .collect()
    }
}
