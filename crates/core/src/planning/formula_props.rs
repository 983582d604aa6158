//! Property-based tests for formula evaluation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::formula::FormulaEvaluator;

proptest! {
    /// Integer arithmetic agrees with the evaluator.
    #[test]
    fn test_matches_integer_arithmetic(
        a in -100_000i64..100_000,
        b in -100_000i64..100_000,
        c in 1i64..1_000,
    ) {
        let formula = format!("({a}) + ({b}) * {c}");
        let expected = Decimal::from(a) + Decimal::from(b) * Decimal::from(c);
        prop_assert_eq!(FormulaEvaluator::evaluate(&formula).unwrap(), expected);
    }

    /// A literal in major units maps to the same amount in minor units.
    #[test]
    fn test_major_units_scale_to_minor(pence in -10_000_000i64..10_000_000) {
        let major = Decimal::new(pence, 2);
        prop_assert_eq!(
            FormulaEvaluator::evaluate_value(None, Some(&major.to_string())).unwrap(),
            Some(pence)
        );
    }

    /// Without a formula the literal value passes through untouched.
    #[test]
    fn test_value_passes_through(value in proptest::option::of(any::<i64>())) {
        prop_assert_eq!(FormulaEvaluator::evaluate_value(value, None).unwrap(), value);
    }

    /// Arbitrary input never panics; any character outside the grammar is rejected.
    #[test]
    fn test_never_panics(input in ".{0,40}") {
        let result = FormulaEvaluator::evaluate(&input);
        let foreign = input
            .chars()
            .find(|c| !(c.is_ascii_digit() || c.is_whitespace() || "+-*/().".contains(*c)));
        if foreign.is_some() {
            prop_assert!(result.is_err());
        }
    }
}
