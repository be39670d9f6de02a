//! Calendar month value type
//!
//! A `Month` is a year + month pair with no day or time component. It is the
//! unit of subscription boundaries and of cost aggregation.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::shared::{DomainError, DomainResult};

/// Calendar month. Ordering is chronological (year first, then month).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// Build a month, rejecting `month` outside `1..=12` and years that
    /// chrono cannot represent.
    pub fn new(year: i32, month: u32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::Validation(format!(
                "month must be between 1 and 12, got {}",
                month
            )));
        }
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(DomainError::Validation(format!("year {} is out of range", year)));
        }
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following calendar month, or `None` past the representable range.
    pub fn succ(&self) -> Option<Self> {
        let (year, month) = if self.month == 12 {
            (self.year.checked_add(1)?, 1)
        } else {
            (self.year, self.month + 1)
        };
        Month::new(year, month).ok()
    }

    /// First day of the month; the persisted form.
    pub fn first_day(&self) -> NaiveDate {
        // `new` guarantees the date exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Month containing `date`. The day component is discarded.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Wire form `MM-YYYY`.
    pub fn to_wire(&self) -> String {
        format!("{:02}-{:04}", self.month, self.year)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = DomainError;

    /// Parses `MM-YYYY` (e.g. `07-2025`). A single-digit month is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::Validation(format!("invalid month '{}', expected MM-YYYY", s));

        let (month, year) = s.trim().split_once('-').ok_or_else(invalid)?;
        if month.is_empty() || month.len() > 2 || year.len() != 4 {
            return Err(invalid());
        }
        if !month.bytes().all(|b| b.is_ascii_digit()) || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        Month::new(year, month)
    }
}

impl From<Month> for NaiveDate {
    fn from(m: Month) -> Self {
        m.first_day()
    }
}

impl Serialize for Month {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Inclusive, non-empty range of calendar months (`start <= end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    start: Month,
    end: Month,
}

impl MonthRange {
    pub fn new(start: Month, end: Month) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::Validation(format!(
                "invalid month range: {} is before {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Month {
        self.start
    }

    pub fn end(&self) -> Month {
        self.end
    }

    pub fn contains(&self, month: Month) -> bool {
        self.start <= month && month <= self.end
    }

    /// Every month from `start` to `end` inclusive, in order.
    pub fn months(&self) -> impl Iterator<Item = Month> {
        let end = self.end;
        std::iter::successors(Some(self.start), move |m| m.succ().filter(|next| *next <= end))
    }
}
