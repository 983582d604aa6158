//! Property-based tests for the monthly deduction calculators.

use proptest::prelude::*;
use rust_decimal_macros::dec;

use super::rates::{IncomeRates, TaxCalculator};

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

fn tax_code() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("OT".to_string()),
        Just("BR".to_string()),
        (0u32..3000).prop_map(|n| format!("{n}L")),
    ]
}

proptest! {
    /// Tax relief is never negative, whatever the deduction.
    #[test]
    fn test_tax_relief_non_negative(
        income in -1_000_000i64..5_000_000,
        extra in -1_000_000i64..1_000_000,
        code in tax_code(),
    ) {
        let relief = TaxCalculator::monthly_tax_relief(income, &code, extra, &uk_rates());
        prop_assert!(relief >= 0);
    }

    /// Tax never decreases as income rises.
    #[test]
    fn test_income_tax_monotonic(
        income in 0i64..5_000_000,
        raise in 0i64..500_000,
        code in tax_code(),
    ) {
        let rates = uk_rates();
        let lower = TaxCalculator::monthly_income_tax(income, &code, &rates);
        let higher = TaxCalculator::monthly_income_tax(income + raise, &code, &rates);
        prop_assert!(lower >= 0);
        prop_assert!(higher >= lower);
    }

    /// NI and student loan are non-negative and never exceed income.
    #[test]
    fn test_contributions_bounded(income in 0i64..5_000_000) {
        let rates = uk_rates();
        let ni = TaxCalculator::monthly_ni_contributions(income, &rates);
        let loan = TaxCalculator::monthly_student_loan_repayment(
            income,
            rates.student_loan_rate,
            rates.student_loan_threshold,
        );
        prop_assert!((0..=income).contains(&ni));
        prop_assert!((0..=income).contains(&loan));
    }

    /// Calculators are referentially transparent.
    #[test]
    fn test_calculators_deterministic(income in -1_000_000i64..5_000_000, code in tax_code()) {
        let rates = uk_rates();
        prop_assert_eq!(
            TaxCalculator::monthly_income_tax(income, &code, &rates),
            TaxCalculator::monthly_income_tax(income, &code, &rates)
        );
        prop_assert_eq!(
            TaxCalculator::monthly_ni_contributions(income, &rates),
            TaxCalculator::monthly_ni_contributions(income, &rates)
        );
    }
}
