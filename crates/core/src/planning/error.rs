//! Planning error types.

use thiserror::Error;

/// Errors raised while evaluating a manual-entry formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// The formula contains no tokens.
    #[error("Formula is empty")]
    Empty,

    /// A character outside the arithmetic grammar was found.
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter {
        /// The offending character.
        character: char,
        /// Byte offset within the formula.
        position: usize,
    },

    /// A token appeared where the grammar does not allow it.
    #[error("Unexpected token at position {position}")]
    UnexpectedToken {
        /// Byte offset within the formula.
        position: usize,
    },

    /// The formula ended in the middle of an expression.
    #[error("Unexpected end of formula")]
    UnexpectedEnd,

    /// A numeric literal could not be parsed.
    #[error("Invalid number '{text}'")]
    InvalidNumber {
        /// The literal as written.
        text: String,
    },

    /// Division by zero.
    #[error("Division by zero")]
    DivisionByZero,

    /// The result does not fit in the decimal or minor-unit range.
    #[error("Formula result overflows")]
    Overflow,

    /// Parentheses are nested deeper than the evaluator allows.
    #[error("Formula nesting exceeds {limit} levels")]
    NestingTooDeep {
        /// Maximum nesting depth.
        limit: usize,
    },
}

/// A name that is neither a computed transaction variant nor its display name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown computed transaction name '{0}'")]
pub struct UnknownTransactionName(pub String);

/// Planning-related errors.
#[derive(Debug, Error)]
pub enum PlanningError {
    /// Month outside 1-12, or a date chrono cannot represent.
    #[error("Invalid planning month {year}-{month}")]
    InvalidMonth {
        /// Calendar year.
        year: i32,
        /// Calendar month.
        month: u32,
    },

    /// The planning horizon has no months.
    #[error("Planning horizon is empty")]
    EmptyHorizon,

    /// The planning horizon is not strictly ascending.
    #[error("Planning horizon is not in ascending order at {year}-{month}")]
    UnorderedHorizon {
        /// Year of the first out-of-order month.
        year: i32,
        /// Month of the first out-of-order month.
        month: u32,
    },
}
