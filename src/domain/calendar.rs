//! Business-day calendar
//!
//! A [`Workdays`] set names the weekdays that count as working days
//! (0 = Sunday .. 6 = Saturday, Monday to Friday by default). The functions
//! here convert between date ranges and business-day counts under such a set.
//!
//! All arithmetic is done on [`NaiveDate`], so every value is already a whole
//! local day. Callers holding a timestamp go through [`to_day`] first.
//!
//! [`business_days_between`] and [`end_date_from_duration`] are consistent but
//! not strict inverses: feeding one's output into the other reproduces the
//! duration, but a start that falls on a non-workday is never moved here.
//! Snapping a start onto a workday is the caller's job ([`next_workday`]).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CalendarError {
    #[error("At least one workday is required")]
    Empty,

    #[error("Invalid weekday index {0}: expected 0 (Sunday) to 6 (Saturday)")]
    InvalidWeekday(u8),

    #[error("Unrecognized weekday: '{0}'")]
    UnknownDay(String),
}

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Set of weekday indices treated as working days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Workdays {
    mask: u8,
}

impl Default for Workdays {
    /// Monday to Friday
    fn default() -> Self {
        Self { mask: 0b0011_1110 }
    }
}

impl Workdays {
    /// Every day of the week
    pub const ALL: Workdays = Workdays { mask: 0b0111_1111 };

    /// Builds a set from weekday indices; duplicates are ignored
    pub fn from_indices(indices: impl IntoIterator<Item = u8>) -> Result<Self, CalendarError> {
        let mut mask = 0u8;
        for index in indices {
            if index > 6 {
                return Err(CalendarError::InvalidWeekday(index));
            }
            mask |= 1 << index;
        }

        if mask == 0 {
            return Err(CalendarError::Empty);
        }

        Ok(Self { mask })
    }

    /// Returns true if the weekday index is a workday
    pub fn contains_index(&self, index: u8) -> bool {
        index <= 6 && self.mask & (1 << index) != 0
    }

    /// Returns true if the date falls on a workday
    pub fn is_workday(&self, date: NaiveDate) -> bool {
        self.contains_index(weekday_index(date))
    }

    /// Sorted weekday indices in the set
    pub fn indices(&self) -> Vec<u8> {
        (0..7).filter(|i| self.contains_index(*i)).collect()
    }

    /// Number of workdays per week
    pub fn len(&self) -> usize {
        self.mask.count_ones() as usize
    }

    /// Always false; an empty set cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.mask == 0
    }
}

impl TryFrom<Vec<u8>> for Workdays {
    type Error = CalendarError;

    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(value)
    }
}

impl From<Workdays> for Vec<u8> {
    fn from(days: Workdays) -> Self {
        days.indices()
    }
}

impl fmt::Display for Workdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self
            .indices()
            .into_iter()
            .map(|i| DAY_NAMES[i as usize])
            .collect();
        write!(f, "{}", names.join(", "))
    }
}

/// Parses a single day token: an index (`3`) or a name (`wed`, `Wednesday`)
fn parse_day(token: &str) -> Result<u8, CalendarError> {
    let token = token.trim();
    if let Ok(index) = token.parse::<u8>() {
        return if index <= 6 {
            Ok(index)
        } else {
            Err(CalendarError::InvalidWeekday(index))
        };
    }

    let lower = token.to_ascii_lowercase();
    let prefix = lower.get(..3);
    DAY_NAMES
        .iter()
        .position(|name| prefix == Some(name.to_ascii_lowercase().as_str()))
        .map(|i| i as u8)
        .ok_or_else(|| CalendarError::UnknownDay(token.to_string()))
}

impl FromStr for Workdays {
    type Err = CalendarError;

    /// Accepts comma separated days and ranges: `1,2,3`, `mon-fri`, `sat,sun`, `0-6`.
    /// A range whose end precedes its start wraps around the week (`fri-mon`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut indices = Vec::new();

        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((from, to)) => {
                    let from = parse_day(from)?;
                    let to = parse_day(to)?;
                    let mut day = from;
                    loop {
                        indices.push(day);
                        if day == to {
                            break;
                        }
                        day = (day + 1) % 7;
                    }
                }
                None => indices.push(parse_day(part)?),
            }
        }

        Self::from_indices(indices)
    }
}

/// Weekday index of a date, 0 = Sunday
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Normalizes a timestamp to its calendar day (local midnight)
pub fn to_day(moment: NaiveDateTime) -> NaiveDate {
    moment.date()
}

/// Today's date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Shifts a date by a number of calendar days, or `None` when the result
/// falls outside the representable range
pub fn checked_shift_days(date: NaiveDate, delta: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(delta)?)
}

/// Shifts a date by a number of calendar days (negative moves backwards).
/// Saturates at the first or last representable day.
pub fn shift_days(date: NaiveDate, delta: i64) -> NaiveDate {
    checked_shift_days(date, delta).unwrap_or(if delta < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

/// First workday on or after `date`, or the last representable day if the
/// calendar runs out first
pub fn next_workday(date: NaiveDate, workdays: &Workdays) -> NaiveDate {
    let mut current = date;
    while !workdays.is_workday(current) {
        match checked_shift_days(current, 1) {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Counts workdays in `[start, end]` inclusive.
///
/// Returns 0 when `start > end`. Otherwise the count is floored at 1: a task
/// always occupies at least one business day, even when its whole range sits
/// on non-workdays. The floor is product policy, not a property of the range.
pub fn business_days_between(start: NaiveDate, end: NaiveDate, workdays: &Workdays) -> u32 {
    if start > end {
        return 0;
    }

    let count = start
        .iter_days()
        .take_while(|day| *day <= end)
        .filter(|day| workdays.is_workday(*day))
        .count() as u32;

    count.max(1)
}

/// Date of the `duration`-th workday counted from the first workday on or
/// after `start`. A non-positive duration returns `start` unchanged.
pub fn end_date_from_duration(start: NaiveDate, duration: i64, workdays: &Workdays) -> NaiveDate {
    if duration <= 0 {
        return start;
    }

    let mut current = next_workday(start, workdays);
    let mut counted = 1;

    while counted < duration {
        let Some(next) = checked_shift_days(current, 1) else {
            break;
        };
        current = next;
        if workdays.is_workday(current) {
            counted += 1;
        }
    }

    current
}
