//! Jurisdictional rates and the monthly tax, NI and student-loan calculators.
//!
//! All amounts are integer minor units. Rates are decimal fractions and every
//! product is rounded back to minor units with [`round_to_minor`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use pennyplan_shared::config::{NamedParameter, ParameterSet};
use pennyplan_shared::types::money::round_to_minor;
use pennyplan_shared::types::MinorUnits;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Standard rate names.
pub mod rate_names {
    /// Basic income tax rate.
    pub const INCOME_TAX_BASIC_RATE: &str = "IncomeTaxBasicRate";
    /// Higher income tax rate.
    pub const INCOME_TAX_HIGHER_RATE: &str = "IncomeTaxHigherRate";
    /// Additional income tax rate.
    pub const INCOME_TAX_ADDITIONAL_RATE: &str = "IncomeTaxAdditionalRate";
    /// NI rate between the payment threshold and the upper earnings limit.
    pub const NI_LOWER_RATE: &str = "NILowerRate";
    /// NI rate above the upper earnings limit.
    pub const NI_HIGHER_RATE: &str = "NIHigherRate";
    /// Student loan repayment rate.
    pub const STUDENT_LOAN_RATE: &str = "StudentLoanRate";
}

/// Standard threshold names.
pub mod threshold_names {
    /// Width of the basic rate band (annual).
    pub const INCOME_TAX_BASIC_ALLOWANCE: &str = "IncomeTaxBasicAllowance";
    /// Income above which the additional rate applies (annual).
    pub const INCOME_TAX_ADDITIONAL_THRESHOLD: &str = "IncomeTaxAdditionalThreshold";
    /// NI primary threshold (monthly).
    pub const NI_PAYMENT_THRESHOLD: &str = "NIPT";
    /// NI upper earnings limit (monthly).
    pub const NI_UPPER_EARNINGS_LIMIT: &str = "NIUEL";
    /// Student loan repayment threshold (annual).
    pub const STUDENT_LOAN_THRESHOLD: &str = "StudentLoanThreshold";
}

/// Rates and thresholds for one financial year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncomeRates {
    /// Basic income tax rate.
    pub tax_basic_rate: Decimal,
    /// Higher income tax rate.
    pub tax_higher_rate: Decimal,
    /// Additional income tax rate.
    pub tax_additional_rate: Decimal,
    /// Width of the basic band, annual.
    pub tax_basic_allowance: MinorUnits,
    /// Start of the additional band, annual.
    pub tax_additional_threshold: MinorUnits,
    /// NI rate up to the upper earnings limit.
    pub ni_lower_rate: Decimal,
    /// NI rate above the upper earnings limit.
    pub ni_higher_rate: Decimal,
    /// NI primary threshold, monthly.
    pub ni_payment_threshold: MinorUnits,
    /// NI upper earnings limit, monthly.
    pub ni_upper_earnings_limit: MinorUnits,
    /// Student loan repayment rate.
    pub student_loan_rate: Decimal,
    /// Student loan threshold, annual.
    pub student_loan_threshold: MinorUnits,
}

fn find_value(parameters: &[NamedParameter], name: &str) -> Decimal {
    parameters
        .iter()
        .find(|parameter| parameter.name == name)
        .map_or(Decimal::ZERO, |parameter| parameter.value)
}

impl IncomeRates {
    /// Builds rates from named parameter rows, using zero for any missing name.
    #[must_use]
    pub fn from_parameters(rates: &[NamedParameter], thresholds: &[NamedParameter]) -> Self {
        use rate_names as r;
        use threshold_names as t;

        let threshold = |name| round_to_minor(find_value(thresholds, name));

        Self {
            tax_basic_rate: find_value(rates, r::INCOME_TAX_BASIC_RATE),
            tax_higher_rate: find_value(rates, r::INCOME_TAX_HIGHER_RATE),
            tax_additional_rate: find_value(rates, r::INCOME_TAX_ADDITIONAL_RATE),
            tax_basic_allowance: threshold(t::INCOME_TAX_BASIC_ALLOWANCE),
            tax_additional_threshold: threshold(t::INCOME_TAX_ADDITIONAL_THRESHOLD),
            ni_lower_rate: find_value(rates, r::NI_LOWER_RATE),
            ni_higher_rate: find_value(rates, r::NI_HIGHER_RATE),
            ni_payment_threshold: threshold(t::NI_PAYMENT_THRESHOLD),
            ni_upper_earnings_limit: threshold(t::NI_UPPER_EARNINGS_LIMIT),
            student_loan_rate: find_value(rates, r::STUDENT_LOAN_RATE),
            student_loan_threshold: threshold(t::STUDENT_LOAN_THRESHOLD),
        }
    }
}

/// Income rates keyed by financial year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesTable(BTreeMap<i32, IncomeRates>);

impl RatesTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from configured parameter sets.
    #[must_use]
    pub fn from_parameter_sets(sets: &[ParameterSet]) -> Self {
        Self(
            sets.iter()
                .map(|set| (set.year, IncomeRates::from_parameters(&set.rates, &set.thresholds)))
                .collect(),
        )
    }

    /// Sets the rates for a financial year.
    pub fn insert(&mut self, financial_year: i32, rates: IncomeRates) {
        self.0.insert(financial_year, rates);
    }

    /// Returns the rates for a financial year, or all zeros if none are configured.
    #[must_use]
    pub fn for_financial_year(&self, financial_year: i32) -> IncomeRates {
        self.0.get(&financial_year).copied().unwrap_or_default()
    }

    /// Returns true if no year has rates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

static ALLOWANCE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)L$").expect("allowance code pattern is valid"));

/// Minor units of allowance per unit of an `L` tax code number.
const ALLOWANCE_PER_CODE_UNIT: MinorUnits = 1000;

const MONTHS_PER_YEAR: i64 = 12;

fn monthly(annual: MinorUnits) -> MinorUnits {
    round_to_minor(Decimal::from(annual) / Decimal::from(MONTHS_PER_YEAR))
}

fn band(amount: MinorUnits, rate: Decimal) -> Decimal {
    Decimal::from(amount) * rate
}

/// Calculator for monthly statutory deductions.
pub struct TaxCalculator;

impl TaxCalculator {
    /// Returns the annual tax-free allowance encoded by a PAYE tax code.
    ///
    /// `OT` has no allowance; `<n>L` allows `n * 10` major units. Any other
    /// code is treated as having no allowance.
    #[must_use]
    pub fn tax_free_allowance(tax_code: &str) -> MinorUnits {
        ALLOWANCE_CODE
            .captures(tax_code.trim())
            .and_then(|caps| caps.get(1))
            .and_then(|digits| digits.as_str().parse::<i64>().ok())
            .and_then(|units| units.checked_mul(ALLOWANCE_PER_CODE_UNIT))
            .unwrap_or(0)
    }

    /// Monthly income tax on `taxable_income` under a progressive band scheme.
    ///
    /// An empty tax code means the code is not configured yet; no tax is charged.
    #[must_use]
    pub fn monthly_income_tax(
        taxable_income: MinorUnits,
        tax_code: &str,
        rates: &IncomeRates,
    ) -> MinorUnits {
        if tax_code.trim().is_empty() {
            return 0;
        }

        let allowance = Self::tax_free_allowance(tax_code);
        let allowance_monthly = monthly(allowance);
        let basic_band = monthly(rates.tax_basic_allowance);
        let higher_start = monthly(allowance.saturating_add(rates.tax_basic_allowance));
        let additional_start = monthly(rates.tax_additional_threshold);

        let basic = basic_band.min(taxable_income.saturating_sub(allowance_monthly).max(0));
        let higher = additional_start
            .min(taxable_income)
            .saturating_sub(higher_start)
            .max(0);
        let additional = taxable_income.saturating_sub(additional_start).max(0);

        let tax = band(basic, rates.tax_basic_rate)
            + band(higher, rates.tax_higher_rate)
            + band(additional, rates.tax_additional_rate);

        round_to_minor(tax).max(0)
    }

    /// Monthly NI contributions: the lower rate between the payment threshold
    /// and the upper earnings limit, the higher rate above it.
    #[must_use]
    pub fn monthly_ni_contributions(taxable_income: MinorUnits, rates: &IncomeRates) -> MinorUnits {
        let lower = taxable_income
            .min(rates.ni_upper_earnings_limit)
            .saturating_sub(rates.ni_payment_threshold)
            .max(0);
        let upper = taxable_income
            .saturating_sub(rates.ni_upper_earnings_limit)
            .max(0);

        round_to_minor(band(lower, rates.ni_lower_rate) + band(upper, rates.ni_higher_rate)).max(0)
    }

    /// Monthly student loan repayment: `rate * max(0, income - threshold / 12)`.
    ///
    /// `annual_threshold` is annual; it is spread over twelve months unrounded.
    #[must_use]
    pub fn monthly_student_loan_repayment(
        income: MinorUnits,
        rate: Decimal,
        annual_threshold: MinorUnits,
    ) -> MinorUnits {
        let above = Decimal::from(income)
            - Decimal::from(annual_threshold) / Decimal::from(MONTHS_PER_YEAR);
        round_to_minor((rate * above).max(Decimal::ZERO))
    }

    /// Tax saved by taking `extra_deductions` off `taxable_income` before tax.
    ///
    /// Never negative.
    #[must_use]
    pub fn monthly_tax_relief(
        taxable_income: MinorUnits,
        tax_code: &str,
        extra_deductions: MinorUnits,
        rates: &IncomeRates,
    ) -> MinorUnits {
        let full = Self::monthly_income_tax(taxable_income, tax_code, rates);
        let reduced = Self::monthly_income_tax(
            taxable_income.saturating_sub(extra_deductions),
            tax_code,
            rates,
        );
        full.saturating_sub(reduced).max(0)
    }
}
