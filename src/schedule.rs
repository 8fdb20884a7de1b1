//! Forecast issue dates.
//!
//! Seasonal forecasts are issued once per calendar month on the 1st. A schedule
//! yields every month start in `[begin, end]`; iterating it again starts over.

use chrono::{Datelike, Months, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlySchedule {
    begin: NaiveDate,
    end: NaiveDate,
}

impl MonthlySchedule {
    pub fn new(begin: NaiveDate, end: NaiveDate) -> Self {
        Self { begin, end }
    }

    pub fn iter(&self) -> MonthStarts {
        MonthStarts {
            next: first_month_start_on_or_after(self.begin),
            end: self.end,
        }
    }
}

impl IntoIterator for &MonthlySchedule {
    type Item = NaiveDate;
    type IntoIter = MonthStarts;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over month starts up to an inclusive end date.
#[derive(Debug, Clone)]
pub struct MonthStarts {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for MonthStarts {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|d| *d <= self.end)?;
        self.next = current.checked_add_months(Months::new(1));
        Some(current)
    }
}

fn first_month_start_on_or_after(date: NaiveDate) -> Option<NaiveDate> {
    if date.day() == 1 {
        return Some(date);
    }
    date.with_day(1)?.checked_add_months(Months::new(1))
}
