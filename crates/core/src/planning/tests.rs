//! End-to-end projection tests.

use chrono::NaiveDate;
use pennyplan_shared::types::{AccountId, CreditCardId};
use proptest::prelude::*;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::aggregate::{NameMatcher, PlanningSummary, sum_computed_transactions_by_name};
use super::credit_card::{CreditCard, CreditCardPayment};
use super::engine::PlanningEngine;
use super::months::{PlanningMonth, fill_months, horizon, planning_months};
use super::rates::{IncomeRates, RatesTable};
use super::types::{
    Account, ComputedTransactionName, Deduction, IncomeGroup, PastIncomeRecord, PlanningData,
    PlanningValue, ProjectionInput, RecordedValue,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn uk_rates() -> IncomeRates {
    IncomeRates {
        tax_basic_rate: dec!(0.2),
        tax_higher_rate: dec!(0.4),
        tax_additional_rate: dec!(0.45),
        tax_basic_allowance: 3_770_000,
        tax_additional_threshold: 12_514_000,
        ni_lower_rate: dec!(0.08),
        ni_higher_rate: dec!(0.02),
        ni_payment_threshold: 104_800,
        ni_upper_earnings_limit: 418_900,
        student_loan_rate: dec!(0.09),
        student_loan_threshold: 2_729_500,
    }
}

fn rates_table() -> RatesTable {
    let mut table = RatesTable::new();
    table.insert(2023, uk_rates());
    table.insert(2024, uk_rates());
    table
}

fn empty_account(name: &str, id: Option<AccountId>) -> Account {
    Account {
        id,
        name: name.to_string(),
        income: vec![],
        past_income: vec![],
        values: vec![],
        credit_cards: vec![],
        recorded_values: vec![],
    }
}

fn entry(year: i32, month: u32, name: &str, value: i64) -> PlanningValue {
    PlanningValue {
        id: None,
        year,
        month,
        name: name.to_string(),
        value: Some(value),
        formula: None,
        transfer_to_account_id: None,
    }
}

fn card_id() -> CreditCardId {
    CreditCardId::from_uuid(Uuid::from_u128(42))
}

/// A salaried current account paying into savings, with payslips up to
/// August 2024 and a card with three recorded payments.
fn household() -> Vec<Account> {
    let current_id = AccountId::from_uuid(Uuid::from_u128(1));
    let savings_id = AccountId::from_uuid(Uuid::from_u128(2));

    let mut current = empty_account("Current", Some(current_id));
    current.income.push(IncomeGroup {
        start_date: date(2023, 4, 1),
        end_date: date(2026, 3, 31),
        salary: 6_000_000,
        pension_contrib: dec!(0.05),
        tax_code: "1257L".to_string(),
        student_loan: false,
    });
    for month in 4..=8 {
        current.past_income.push(PastIncomeRecord {
            date: date(2024, month, 25),
            gross: 500_000,
            deductions: vec![
                Deduction {
                    name: "Income tax".to_string(),
                    value: -74_050,
                },
                Deduction {
                    name: "NI".to_string(),
                    value: -27_128,
                },
                Deduction {
                    name: "Pension".to_string(),
                    value: -25_000,
                },
            ],
        });
    }
    for month in 4..=12 {
        let mut transfer = entry(2024, month, "Savings", -100_000);
        transfer.transfer_to_account_id = Some(savings_id);
        current.values.push(transfer);
    }
    current.values.push(entry(2024, 6, "Pension SIPP", -40_000));
    current.values.push(entry(2024, 10, "Gift", 0));
    current.values.push(PlanningValue {
        formula: Some("12.50*3".to_string()),
        value: None,
        ..entry(2024, 11, "Dinner", 0)
    });
    current.credit_cards.push(CreditCard {
        id: card_id(),
        name: "Card".to_string(),
        payments: vec![
            CreditCardPayment {
                year: 2024,
                month: 4,
                value: -10,
            },
            CreditCardPayment {
                year: 2024,
                month: 5,
                value: -30,
            },
            CreditCardPayment {
                year: 2024,
                month: 6,
                value: -20,
            },
        ],
    });
    current.recorded_values.push(RecordedValue {
        date: date(2024, 3, 31),
        value: 1_000_000,
    });

    let mut savings = empty_account("Savings", Some(savings_id));
    savings.recorded_values.push(RecordedValue {
        date: date(2024, 3, 20),
        value: 5_000_000,
    });
    savings.recorded_values.push(RecordedValue {
        date: date(2024, 5, 31),
        value: 5_300_000,
    });

    vec![current, savings]
}

fn household_input(today: NaiveDate) -> ProjectionInput {
    ProjectionInput {
        today,
        accounts: household(),
        months: planning_months(2024).unwrap(),
        rates: rates_table(),
    }
}

fn row(rows: &[PlanningData], year: i32, month: u32) -> &PlanningData {
    rows.iter()
        .find(|row| row.year == year && row.month == month)
        .unwrap()
}

#[test]
fn test_past_income_is_verified_and_future_is_not() {
    let today = date(2024, 9, 10);
    let rows = PlanningEngine::run(&household_input(today)).unwrap();

    for data in &rows {
        let is_past = PlanningMonth::new(data.year, data.month).unwrap().is_past(today);
        for transaction in data.accounts[0]
            .transactions
            .iter()
            .filter(|t| t.is_computed && !t.is_transfer)
        {
            assert_eq!(transaction.is_verified, is_past, "{}-{}", data.year, data.month);
        }
    }
}

#[test]
fn test_past_month_uses_payslip_values() {
    let rows = PlanningEngine::run(&household_input(date(2024, 9, 10))).unwrap();
    let may = &row(&rows, 2024, 5).accounts[0];

    let income: Vec<_> = may
        .transactions
        .iter()
        .filter(|t| t.is_computed && !t.is_transfer)
        .map(|t| (t.name.as_str(), t.computed_value))
        .collect();
    assert_eq!(
        income,
        vec![
            ("Salary", Some(500_000)),
            ("Income tax", Some(-74_050)),
            ("NI", Some(-27_128)),
            ("Pension", Some(-25_000)),
        ]
    );
}

#[test]
fn test_future_month_predicts_from_income_group() {
    let rows = PlanningEngine::run(&household_input(date(2024, 9, 10))).unwrap();
    let october = &row(&rows, 2024, 10).accounts[0];

    let names: Vec<_> = october.transactions.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Salary", "Income tax", "NI", "Pension (SalSac)", "Savings", "Gift"]
    );
    assert!(october.transactions[..4].iter().all(|t| !t.is_verified));
    assert_eq!(october.transactions[3].computed_value, Some(-25_000));
}

#[test]
fn test_transfer_symmetry() {
    let rows = PlanningEngine::run(&household_input(date(2024, 9, 10))).unwrap();

    for data in &rows {
        let sent: i64 = data.accounts[0]
            .transactions
            .iter()
            .filter(|t| t.is_transfer && !t.is_computed)
            .filter_map(|t| t.computed_value)
            .sum();
        let received: Vec<_> = data.accounts[1]
            .transactions
            .iter()
            .filter(|t| t.is_transfer)
            .collect();

        if sent == 0 {
            assert!(received.is_empty());
        } else {
            assert_eq!(received.len(), 1);
            assert_eq!(received[0].name, "Current transfer");
            assert_eq!(received[0].computed_value, Some(-sent));
        }
    }
}

#[test]
fn test_projection_is_idempotent() {
    let input = household_input(date(2024, 9, 10));
    assert_eq!(
        PlanningEngine::run(&input).unwrap(),
        PlanningEngine::run(&input).unwrap()
    );
}

#[test]
fn test_manual_zero_kept_and_formula_evaluated() {
    let rows = PlanningEngine::run(&household_input(date(2024, 9, 10))).unwrap();

    let gift = row(&rows, 2024, 10).accounts[0]
        .transactions
        .iter()
        .find(|t| t.name == "Gift")
        .unwrap();
    assert_eq!(gift.computed_value, Some(0));
    assert!(!gift.is_computed);

    let dinner = row(&rows, 2024, 11).accounts[0]
        .transactions
        .iter()
        .find(|t| t.name == "Dinner")
        .unwrap();
    assert_eq!(dinner.computed_value, Some(3750));
}

#[test]
fn test_no_zero_income_or_transfer_transactions() {
    let rows = PlanningEngine::run(&household_input(date(2024, 9, 10))).unwrap();
    for data in &rows {
        for account in &data.accounts {
            assert!(
                account
                    .transactions
                    .iter()
                    .filter(|t| t.is_computed)
                    .all(|t| t.computed_value.unwrap_or(0) != 0)
            );
        }
    }
}

#[test]
fn test_credit_card_median_prediction() {
    let rows = PlanningEngine::run(&household_input(date(2024, 9, 10))).unwrap();

    let june = &row(&rows, 2024, 6).accounts[0].credit_cards[0];
    assert_eq!((june.value, june.is_verified), (Some(-20), true));

    let july = &row(&rows, 2024, 7).accounts[0].credit_cards[0];
    assert_eq!((july.value, july.is_verified), (Some(-20), false));

    let savings = &row(&rows, 2024, 7).accounts[1];
    assert!(savings.credit_cards.is_empty());
}

#[test]
fn test_credit_card_without_history_is_unknown() {
    let mut input = household_input(date(2024, 9, 10));
    input.accounts[0].credit_cards[0].payments.clear();
    let rows = PlanningEngine::run(&input).unwrap();
    assert!(
        rows.iter()
            .all(|data| data.accounts[0].credit_cards[0].value.is_none())
    );
}

#[test]
fn test_start_and_end_values() {
    let rows = PlanningEngine::run(&household_input(date(2024, 9, 10))).unwrap();

    let april = &rows[0].accounts[0];
    assert_eq!(april.start_value.computed_value, Some(1_000_000));
    assert!(april.start_value.is_verified);
    let april_total: i64 = april
        .transactions
        .iter()
        .filter_map(|t| t.computed_value)
        .sum::<i64>()
        + april
            .credit_cards
            .iter()
            .filter_map(|c| c.value)
            .sum::<i64>();
    assert_eq!(april.end_value.computed_value, Some(1_000_000 + april_total));
    assert!(!april.end_value.is_verified);

    let may = &rows[1].accounts[0];
    assert_eq!(may.start_value.computed_value, april.end_value.computed_value);

    let savings_may = &rows[1].accounts[1];
    assert_eq!(savings_may.end_value.computed_value, Some(5_300_000));
    assert!(savings_may.end_value.is_verified);
    assert!(rows[2].accounts[1].start_value.is_verified);
    assert_eq!(rows[2].accounts[1].start_value.computed_value, Some(5_300_000));
    assert_eq!(
        rows[2].accounts[1].end_value.computed_value,
        Some(5_300_000 + 100_000)
    );
}

#[test]
fn test_balances_chain_from_older_recorded_value() {
    let mut input = household_input(date(2024, 9, 10));
    for (account, value) in input.accounts.iter_mut().zip([1_000_000, 5_000_000]) {
        account.recorded_values = vec![RecordedValue {
            date: date(2024, 2, 29),
            value,
        }];
    }

    let rows = PlanningEngine::run(&input).unwrap();

    assert_eq!(rows.len(), 12);
    assert_eq!((rows[0].year, rows[0].month), (2024, 4));
    let april = &rows[0].accounts;
    assert_eq!(april[0].start_value.computed_value, Some(1_000_000));
    assert!(!april[0].start_value.is_verified);
    assert_eq!(april[1].start_value.computed_value, Some(5_000_000));
    assert!(
        rows.iter()
            .flat_map(|data| data.accounts.iter())
            .all(|account| account.end_value.computed_value.is_some())
    );
}

#[test]
fn test_card_history_before_horizon_feeds_prediction() {
    let mut input = household_input(date(2024, 9, 10));
    input.months = planning_months(2025).unwrap();
    for account in &mut input.accounts {
        account.recorded_values.clear();
    }

    let rows = PlanningEngine::run(&input).unwrap();

    let april = &rows[0].accounts[0].credit_cards[0];
    assert_eq!((april.value, april.is_verified), (Some(-20), false));
}

#[test]
fn test_unknown_start_leaves_balances_unknown() {
    let mut input = household_input(date(2024, 9, 10));
    input.accounts[0].recorded_values.clear();
    let rows = PlanningEngine::run(&input).unwrap();
    assert!(
        rows.iter()
            .all(|data| data.accounts[0].end_value.computed_value.is_none())
    );
}

#[test]
fn test_tax_relief_and_previous_year_carry_over() {
    let mut input = household_input(date(2024, 9, 10));
    input.months = horizon(2024, 2).unwrap();
    input.accounts[0].values.push(entry(2024, 11, "Pension SIPP", -40_000));
    let rows = PlanningEngine::run(&input).unwrap();

    let june = &row(&rows, 2024, 6).accounts[0];
    // 40000 of sacrifice, all within the higher band
    assert_eq!(june.tax_relief, 16_000);

    let november = &row(&rows, 2024, 11).accounts[0];
    assert_eq!(november.tax_relief, 16_000);

    let next_april = &row(&rows, 2025, 4).accounts[0];
    assert_eq!(next_april.previous_year_tax_relief, 32_000);
    assert!(
        rows.iter()
            .filter(|data| data.month != 4)
            .all(|data| data.accounts[0].previous_year_tax_relief == 0)
    );
}

#[test]
fn test_missing_rates_fall_back_to_zero() {
    let mut input = household_input(date(2024, 3, 1));
    input.rates = RatesTable::new();
    let rows = PlanningEngine::run(&input).unwrap();
    let april = &rows[0].accounts[0];

    let names: Vec<_> = april
        .transactions
        .iter()
        .filter(|t| t.is_computed && !t.is_transfer)
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(names, vec!["Salary", "Pension (SalSac)"]);
    assert_eq!(april.tax_relief, 0);
}

#[test]
fn test_unsaved_target_skips_transfers() {
    let mut input = household_input(date(2024, 9, 10));
    input.accounts[1].id = None;
    let rows = PlanningEngine::run(&input).unwrap();
    assert!(
        rows.iter()
            .all(|data| data.accounts[1].transactions.iter().all(|t| !t.is_transfer))
    );
}

#[test]
fn test_aggregation_scenario() {
    let rows = PlanningEngine::run(&household_input(date(2024, 9, 10))).unwrap();

    let expected: i64 = rows
        .iter()
        .flat_map(|data| data.accounts.iter())
        .flat_map(|account| account.transactions.iter())
        .filter(|t| t.name == ComputedTransactionName::IncomeTax.as_str())
        .map(|t| t.computed_value.unwrap_or(0))
        .sum();
    let total = sum_computed_transactions_by_name(
        &rows,
        &[NameMatcher::from(ComputedTransactionName::IncomeTax)],
    );
    assert_eq!(total, expected);
    assert!(total < 0);

    let summary = PlanningSummary::from_table(&rows);
    assert_eq!(summary.income_tax, total);
    assert_eq!(summary.gross_income, 12 * 500_000);
}

fn arbitrary_values() -> impl Strategy<Value = Vec<(u32, i64, bool)>> {
    prop::collection::vec((1u32..=12, -500_000i64..500_000, any::<bool>()), 0..20)
}

proptest! {
    /// Past months carry only verified income; future months only predicted income.
    #[test]
    fn test_verification_follows_today(
        day_offset in 0i64..800,
        values in arbitrary_values(),
    ) {
        let today = date(2024, 1, 1) + chrono::Duration::days(day_offset);
        let mut input = household_input(today);
        let savings_id = input.accounts[1].id;
        for (month, value, is_transfer) in values {
            let year = if month >= 4 { 2024 } else { 2025 };
            let mut extra = entry(year, month, "Extra", value);
            if is_transfer {
                extra.transfer_to_account_id = savings_id;
            }
            input.accounts[0].values.push(extra);
        }

        let rows = PlanningEngine::run(&input).unwrap();

        for data in &rows {
            let is_past = PlanningMonth::new(data.year, data.month).unwrap().is_past(today);
            for account in &data.accounts {
                for transaction in &account.transactions {
                    prop_assert_eq!(transaction.is_verified, is_past);
                }
            }
        }
    }

    /// Every transfer out of one account is received, negated, by its target.
    #[test]
    fn test_transfers_balance(values in arbitrary_values()) {
        let mut input = household_input(date(2024, 9, 10));
        let savings_id = input.accounts[1].id;
        for (month, value, _) in values {
            let year = if month >= 4 { 2024 } else { 2025 };
            let mut transfer = entry(year, month, "Extra", value);
            transfer.transfer_to_account_id = savings_id;
            input.accounts[0].values.push(transfer);
        }

        let rows = PlanningEngine::run(&input).unwrap();

        for data in &rows {
            let sent: i64 = data.accounts[0]
                .transactions
                .iter()
                .filter(|t| t.is_transfer)
                .filter_map(|t| t.computed_value)
                .sum();
            let received: i64 = data.accounts[1]
                .transactions
                .iter()
                .filter(|t| t.is_transfer)
                .filter_map(|t| t.computed_value)
                .sum();
            prop_assert_eq!(sent, -received);
        }
    }

    /// Consecutive months line up: each start value is the previous end value.
    #[test]
    fn test_balances_chain(start_month in 1u32..=12, count in 1usize..18) {
        let mut input = household_input(date(2024, 9, 10));
        input.months = fill_months(PlanningMonth::new(2024, start_month).unwrap(), count).unwrap();

        let rows = PlanningEngine::run(&input).unwrap();

        prop_assert_eq!(rows.len(), count);
        for pair in rows.windows(2) {
            for (previous, next) in pair[0].accounts.iter().zip(&pair[1].accounts) {
                prop_assert_eq!(previous.end_value.computed_value, next.start_value.computed_value);
                prop_assert_eq!(previous.end_value.is_verified, next.start_value.is_verified);
            }
        }
    }
}
