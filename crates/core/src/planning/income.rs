//! Income transactions: realised payslips for past months, predicted
//! salary breakdowns for future months.

use chrono::Datelike;
use once_cell::sync::Lazy;
use pennyplan_shared::types::money::round_to_minor;
use pennyplan_shared::types::MinorUnits;
use regex::Regex;
use rust_decimal::Decimal;

use super::months::{PlanningMonth, end_of_month};
use super::rates::{IncomeRates, TaxCalculator};
use super::types::{Account, AccountTransaction, ComputedTransactionName, IncomeGroup};

static SALARY_SACRIFICE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(SalSac\)").expect("salary sacrifice pattern is valid"));

static PENSION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Pension").expect("pension prefix pattern is valid"));

const PENSION_DEDUCTION: &str = "Pension";

/// Income transactions for one account-month plus the pension tax relief earned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomeTransactions {
    /// Income transactions, gross salary first.
    pub transactions: Vec<AccountTransaction>,
    /// Tax relief on manual pension contributions.
    pub tax_relief: MinorUnits,
}

impl IncomeGroup {
    /// Returns true if the arrangement covers the month's end date.
    #[must_use]
    pub fn applies_to(&self, month: &PlanningMonth) -> bool {
        let last_day =
            end_of_month(self.end_date.year(), self.end_date.month()).unwrap_or(self.end_date);
        self.start_date <= month.date && month.date <= last_day
    }
}

/// Returns true if a payslip deduction is taken before tax.
#[must_use]
pub fn is_salary_sacrifice(name: &str) -> bool {
    name == PENSION_DEDUCTION || SALARY_SACRIFICE.is_match(name)
}

/// Sum of manual pension contributions made outside payroll, as a positive amount.
#[must_use]
pub fn manual_pension_deductions(manual: &[AccountTransaction]) -> MinorUnits {
    manual
        .iter()
        .filter(|transaction| !transaction.is_computed && PENSION_PREFIX.is_match(&transaction.name))
        .map(|transaction| transaction.computed_value.unwrap_or(0))
        .fold(0, MinorUnits::saturating_add)
        .saturating_neg()
}

/// Sorts income transactions with gross salary first, then by name.
pub fn sort_income_transactions(transactions: &mut [AccountTransaction]) {
    let salary = ComputedTransactionName::GrossIncome.as_str();
    transactions.sort_by(|a, b| {
        (a.name != salary)
            .cmp(&(b.name != salary))
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn transaction_id(month: &PlanningMonth, name: &str) -> String {
    format!("income-{}-{:02}-{name}", month.year, month.month)
}

fn computed(
    month: &PlanningMonth,
    name: &str,
    value: MinorUnits,
    is_verified: bool,
) -> AccountTransaction {
    AccountTransaction {
        id: transaction_id(month, name),
        name: name.to_string(),
        computed_value: Some(value),
        value: None,
        formula: None,
        is_computed: true,
        is_verified,
        is_transfer: false,
    }
}

/// Builds income transactions for an account-month.
pub struct IncomeTransactionBuilder;

impl IncomeTransactionBuilder {
    /// Reconstructs a past month from the payslips recorded in it.
    ///
    /// Gross pay is summed into one salary transaction and deductions are
    /// summed by name. All transactions are verified.
    #[must_use]
    pub fn past_at_month(
        month: &PlanningMonth,
        account: &Account,
        manual: &[AccountTransaction],
        rates: &IncomeRates,
    ) -> IncomeTransactions {
        let records: Vec<_> = account
            .past_income
            .iter()
            .filter(|record| month.contains(record.date))
            .collect();

        if records.is_empty() {
            return IncomeTransactions::default();
        }

        let gross = records
            .iter()
            .map(|record| record.gross)
            .fold(0, MinorUnits::saturating_add);

        let mut deductions: Vec<(String, MinorUnits)> = Vec::new();
        for deduction in records.iter().flat_map(|record| record.deductions.iter()) {
            match deductions.iter_mut().find(|(name, _)| *name == deduction.name) {
                Some((_, total)) => *total = total.saturating_add(deduction.value),
                None => deductions.push((deduction.name.clone(), deduction.value)),
            }
        }

        let taxable_income = deductions
            .iter()
            .filter(|(name, _)| is_salary_sacrifice(name))
            .map(|(_, value)| *value)
            .fold(gross, MinorUnits::saturating_add);

        let tax_code = account
            .income
            .iter()
            .find(|group| group.applies_to(month))
            .map_or("", |group| group.tax_code.as_str());

        let tax_relief = TaxCalculator::monthly_tax_relief(
            taxable_income,
            tax_code,
            manual_pension_deductions(manual),
            rates,
        );

        let mut transactions = vec![computed(
            month,
            ComputedTransactionName::GrossIncome.as_str(),
            gross,
            true,
        )];
        transactions.extend(
            deductions
                .iter()
                .map(|(name, value)| computed(month, name, *value, true)),
        );
        sort_income_transactions(&mut transactions);

        IncomeTransactions {
            transactions,
            tax_relief,
        }
    }

    /// Predicts a future month from the income arrangements covering it.
    ///
    /// Always emits the five computed transactions (some may be zero); none
    /// are verified.
    #[must_use]
    pub fn predicted_at_month(
        month: &PlanningMonth,
        account: &Account,
        manual: &[AccountTransaction],
        rates: &IncomeRates,
    ) -> IncomeTransactions {
        let extra_deductions = manual_pension_deductions(manual);

        let mut gross_total: MinorUnits = 0;
        let mut pension_total: MinorUnits = 0;
        let mut taxable_total: MinorUnits = 0;
        let mut tax_total: MinorUnits = 0;
        let mut ni_total: MinorUnits = 0;
        let mut tax_relief: MinorUnits = 0;
        let mut student_loan = false;

        for group in account.income.iter().filter(|group| group.applies_to(month)) {
            let gross = group.salary.div_euclid(12);
            let pension = round_to_minor(group.pension_contrib * Decimal::from(gross));
            let taxable_income = gross.saturating_sub(pension);

            gross_total = gross_total.saturating_add(gross);
            pension_total = pension_total.saturating_add(pension);
            taxable_total = taxable_total.saturating_add(taxable_income);
            tax_total = tax_total.saturating_add(TaxCalculator::monthly_income_tax(
                taxable_income,
                &group.tax_code,
                rates,
            ));
            ni_total = ni_total
                .saturating_add(TaxCalculator::monthly_ni_contributions(taxable_income, rates));
            tax_relief = tax_relief.saturating_add(TaxCalculator::monthly_tax_relief(
                taxable_income,
                &group.tax_code,
                extra_deductions,
                rates,
            ));
            student_loan |= group.student_loan;
        }

        let student_loan_repayment = if student_loan {
            TaxCalculator::monthly_student_loan_repayment(
                taxable_total,
                rates.student_loan_rate,
                rates.student_loan_threshold,
            )
        } else {
            0
        };

        let mut transactions: Vec<AccountTransaction> = [
            (ComputedTransactionName::GrossIncome, gross_total),
            (ComputedTransactionName::Pension, pension_total.saturating_neg()),
            (ComputedTransactionName::IncomeTax, tax_total.saturating_neg()),
            (ComputedTransactionName::NI, ni_total.saturating_neg()),
            (
                ComputedTransactionName::StudentLoan,
                student_loan_repayment.saturating_neg(),
            ),
        ]
        .into_iter()
        .map(|(name, value)| computed(month, name.as_str(), value, false))
        .collect();
        sort_income_transactions(&mut transactions);

        IncomeTransactions {
            transactions,
            tax_relief,
        }
    }
}
