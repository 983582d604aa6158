//! Planning months and financial-year arithmetic.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::error::PlanningError;

/// First calendar month of the financial year (April).
pub const START_MONTH: u32 = 4;

/// Returns the financial year a calendar month belongs to.
///
/// Financial years are named after the calendar year in which they start.
#[must_use]
pub const fn financial_year(year: i32, month: u32) -> i32 {
    if month >= START_MONTH { year } else { year - 1 }
}

/// Returns the last day of a calendar month.
#[must_use]
pub fn end_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// One month of the planning horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlanningMonth {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Last day of the month.
    pub date: NaiveDate,
}

impl PlanningMonth {
    /// Creates a planning month ending on the last day of `year`-`month`.
    ///
    /// # Errors
    ///
    /// Returns `PlanningError::InvalidMonth` if the month is outside 1-12
    /// or the date cannot be represented.
    pub fn new(year: i32, month: u32) -> Result<Self, PlanningError> {
        if !(1..=12).contains(&month) {
            return Err(PlanningError::InvalidMonth { year, month });
        }
        let date = end_of_month(year, month).ok_or(PlanningError::InvalidMonth { year, month })?;
        Ok(Self { year, month, date })
    }

    /// Returns true if `today` is strictly after the end of this month.
    #[must_use]
    pub fn is_past(&self, today: NaiveDate) -> bool {
        today > self.date
    }

    /// Returns true if `today` falls inside this calendar month.
    #[must_use]
    pub fn is_current(&self, today: NaiveDate) -> bool {
        today.year() == self.year && today.month() == self.month
    }

    /// Returns true if `date` falls inside this calendar month.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Financial year this month belongs to.
    #[must_use]
    pub const fn financial_year(&self) -> i32 {
        financial_year(self.year, self.month)
    }

    /// Returns the month before this one.
    ///
    /// # Errors
    ///
    /// Returns `PlanningError::InvalidMonth` at the edge of the date range.
    pub fn previous(&self) -> Result<Self, PlanningError> {
        if self.month == 1 {
            let year = self.year.checked_sub(1).ok_or(PlanningError::InvalidMonth {
                year: self.year,
                month: 0,
            })?;
            Self::new(year, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    /// Returns the month after this one.
    ///
    /// # Errors
    ///
    /// Returns `PlanningError::InvalidMonth` at the edge of the date range.
    pub fn next(&self) -> Result<Self, PlanningError> {
        if self.month == 12 {
            let year = self.year.checked_add(1).ok_or(PlanningError::InvalidMonth {
                year: self.year,
                month: 13,
            })?;
            Self::new(year, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

/// Returns `count` consecutive months beginning with `start`.
///
/// # Errors
///
/// Returns `PlanningError::InvalidMonth` if the range leaves the representable dates.
pub fn fill_months(start: PlanningMonth, count: usize) -> Result<Vec<PlanningMonth>, PlanningError> {
    let mut months = Vec::with_capacity(count);
    let mut current = start;
    for index in 0..count {
        if index > 0 {
            current = current.next()?;
        }
        months.push(current);
    }
    Ok(months)
}

/// Returns the twelve months April..March of a financial year.
///
/// # Errors
///
/// Returns `PlanningError::InvalidMonth` if the year is out of range.
pub fn planning_months(financial_year: i32) -> Result<Vec<PlanningMonth>, PlanningError> {
    fill_months(PlanningMonth::new(financial_year, START_MONTH)?, 12)
}

/// Returns the months of `num_years` consecutive financial years.
///
/// # Errors
///
/// Returns `PlanningError::EmptyHorizon` if `num_years` is zero.
pub fn horizon(start_year: i32, num_years: u32) -> Result<Vec<PlanningMonth>, PlanningError> {
    if num_years == 0 {
        return Err(PlanningError::EmptyHorizon);
    }
    let count = usize::try_from(num_years)
        .ok()
        .and_then(|years| years.checked_mul(12))
        .ok_or(PlanningError::InvalidMonth {
            year: start_year,
            month: START_MONTH,
        })?;
    fill_months(PlanningMonth::new(start_year, START_MONTH)?, count)
}
