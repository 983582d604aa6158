//! Arithmetic formula evaluation for manual entries.
//!
//! The grammar is deliberately minimal: decimal numbers, `+ - * /`,
//! parentheses and unary sign. Anything else is rejected.
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := ('+' | '-') factor | number | '(' expr ')'
//! ```

use std::str::FromStr;

use pennyplan_shared::types::money::major_to_minor;
use pennyplan_shared::types::MinorUnits;
use rust_decimal::Decimal;

use super::error::FormulaError;
use super::types::PlanningValue;

/// Maximum depth of parentheses and unary operators.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Number(Decimal),
    Plus,
    Minus,
    Star,
    Slash,
    Open,
    Close,
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, FormulaError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(position, character)) = chars.peek() {
        let token = match character {
            c if c.is_whitespace() => {
                chars.next();
                continue;
            }
            '0'..='9' | '.' => {
                let mut end = position;
                while let Some(&(index, c)) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        end = index + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }
                let text = &input[position..end];
                let number = Decimal::from_str(text).map_err(|_| FormulaError::InvalidNumber {
                    text: text.to_string(),
                })?;
                tokens.push((Token::Number(number), position));
                continue;
            }
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '(' => Token::Open,
            ')' => Token::Close,
            other => {
                return Err(FormulaError::UnexpectedCharacter {
                    character: other,
                    position,
                });
            }
        };
        tokens.push((token, position));
        chars.next();
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|(token, _)| token)
    }

    fn advance(&mut self) -> Option<(Token, usize)> {
        let next = self.tokens.get(self.cursor).cloned();
        if next.is_some() {
            self.cursor += 1;
        }
        next
    }

    fn descend(&mut self) -> Result<(), FormulaError> {
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(FormulaError::NestingTooDeep { limit: MAX_NESTING });
        }
        Ok(())
    }

    fn expression(&mut self) -> Result<Decimal, FormulaError> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.advance();
                    let rhs = self.term()?;
                    value = value.checked_add(rhs).ok_or(FormulaError::Overflow)?;
                }
                Some(Token::Minus) => {
                    self.advance();
                    let rhs = self.term()?;
                    value = value.checked_sub(rhs).ok_or(FormulaError::Overflow)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<Decimal, FormulaError> {
        let mut value = self.factor()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.advance();
                    let rhs = self.factor()?;
                    value = value.checked_mul(rhs).ok_or(FormulaError::Overflow)?;
                }
                Some(Token::Slash) => {
                    self.advance();
                    let rhs = self.factor()?;
                    if rhs.is_zero() {
                        return Err(FormulaError::DivisionByZero);
                    }
                    value = value.checked_div(rhs).ok_or(FormulaError::Overflow)?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn factor(&mut self) -> Result<Decimal, FormulaError> {
        match self.advance() {
            Some((Token::Number(number), _)) => Ok(number),
            Some((Token::Minus, _)) => {
                self.descend()?;
                let value = self.factor()?;
                self.depth -= 1;
                Ok(-value)
            }
            Some((Token::Plus, _)) => {
                self.descend()?;
                let value = self.factor()?;
                self.depth -= 1;
                Ok(value)
            }
            Some((Token::Open, _)) => {
                self.descend()?;
                let value = self.expression()?;
                match self.advance() {
                    Some((Token::Close, _)) => {
                        self.depth -= 1;
                        Ok(value)
                    }
                    Some((_, position)) => Err(FormulaError::UnexpectedToken { position }),
                    None => Err(FormulaError::UnexpectedEnd),
                }
            }
            Some((_, position)) => Err(FormulaError::UnexpectedToken { position }),
            None => Err(FormulaError::UnexpectedEnd),
        }
    }
}

/// Evaluator for manual-entry formulas.
pub struct FormulaEvaluator;

impl FormulaEvaluator {
    /// Evaluates an arithmetic expression exactly.
    ///
    /// # Errors
    ///
    /// Returns a `FormulaError` for empty input, tokens outside the grammar,
    /// division by zero, or overflow.
    pub fn evaluate(formula: &str) -> Result<Decimal, FormulaError> {
        let tokens = tokenize(formula)?;
        if tokens.is_empty() {
            return Err(FormulaError::Empty);
        }

        let mut parser = Parser {
            tokens,
            cursor: 0,
            depth: 0,
        };
        let value = parser.expression()?;

        match parser.advance() {
            Some((_, position)) => Err(FormulaError::UnexpectedToken { position }),
            None => Ok(value),
        }
    }

    /// Resolves a literal value or a major-unit formula to minor units.
    ///
    /// A blank formula counts as absent.
    ///
    /// # Errors
    ///
    /// Propagates formula errors; `Overflow` if the result does not fit.
    pub fn evaluate_value(
        value: Option<MinorUnits>,
        formula: Option<&str>,
    ) -> Result<Option<MinorUnits>, FormulaError> {
        match formula.filter(|formula| !formula.trim().is_empty()) {
            Some(formula) => {
                let major = Self::evaluate(formula)?;
                major_to_minor(major)
                    .map(Some)
                    .ok_or(FormulaError::Overflow)
            }
            None => Ok(value),
        }
    }

    /// Resolves a manual entry, degrading a broken formula to `None`.
    #[must_use]
    pub fn resolve(entry: &PlanningValue) -> Option<MinorUnits> {
        match Self::evaluate_value(entry.value, entry.formula.as_deref()) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(
                    name = %entry.name,
                    year = entry.year,
                    month = entry.month,
                    formula = entry.formula.as_deref().unwrap_or_default(),
                    %error,
                    "Failed to evaluate planning formula"
                );
                None
            }
        }
    }
}
