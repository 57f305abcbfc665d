//! Timeline grid geometry
//!
//! Maps dates onto chart columns. A column is one day in [`Scale::Day`] and
//! one Sunday-start week in [`Scale::Week`]. Positions are fractional
//! columns so renderers can pick their own column width.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::calendar::{shift_days, Workdays};
use super::hierarchy::{Hierarchy, ProcessedTask};

/// Days of padding around the rows in day scale
const DAY_PADDING: i64 = 5;

/// Days shown when there is nothing to chart
const EMPTY_RANGE_DAYS: i64 = 30;

#[derive(Debug, Error, PartialEq)]
#[error("Unknown timeline scale '{0}': expected 'day' or 'week'")]
pub struct ScaleError(String);

/// Width of one timeline column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    #[default]
    Day,
    Week,
}

impl Scale {
    /// Calendar days per column
    pub fn days(&self) -> i64 {
        match self {
            Scale::Day => 1,
            Scale::Week => 7,
        }
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scale::Day => write!(f, "day"),
            Scale::Week => write!(f, "week"),
        }
    }
}

impl FromStr for Scale {
    type Err = ScaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "d" => Ok(Scale::Day),
            "week" | "w" => Ok(Scale::Week),
            _ => Err(ScaleError(s.to_string())),
        }
    }
}

/// Horizontal placement of a bar, in columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bar {
    pub offset: f64,
    pub width: f64,
}

impl Bar {
    pub fn end(&self) -> f64 {
        self.offset + self.width
    }
}

/// Sunday on or before `date`
fn start_of_week(date: NaiveDate) -> NaiveDate {
    shift_days(date, -i64::from(date.weekday().num_days_from_sunday()))
}

/// Visible date range and column layout of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    scale: Scale,
    start: NaiveDate,
    end: NaiveDate,
    columns: usize,
    today: NaiveDate,
}

impl Timeline {
    /// Lays out a grid around the visible rows.
    ///
    /// `exporting` drops the leading padding so an exported chart starts at
    /// the first bar.
    pub fn new(hierarchy: &Hierarchy, scale: Scale, today: NaiveDate, exporting: bool) -> Self {
        let bounds = hierarchy.rows().iter().map(|r| r.span).reduce(|a, b| a.union(&b));

        let Some(bounds) = bounds else {
            return Self {
                scale,
                start: today,
                end: shift_days(today, EMPTY_RANGE_DAYS),
                columns: EMPTY_RANGE_DAYS as usize + 1,
                today,
            };
        };

        let (start, end) = match scale {
            Scale::Day => {
                let lead = if exporting { 0 } else { DAY_PADDING };
                (
                    shift_days(bounds.start, -lead),
                    shift_days(bounds.end, DAY_PADDING),
                )
            }
            Scale::Week => {
                let lead = if exporting { 0 } else { 7 };
                let start = shift_days(start_of_week(bounds.start), -lead);
                let last_week_end = shift_days(start_of_week(bounds.end), 6);
                (start, shift_days(last_week_end, 7))
            }
        };

        let total_days = (end - start).num_days().max(0);
        let columns = match scale {
            Scale::Day => total_days,
            Scale::Week => (total_days + 6) / 7,
        } as usize;

        Self {
            scale,
            start,
            end,
            columns,
            today,
        }
    }

    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// First day of the grid
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the visible range
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// First day covered by a column
    pub fn column_date(&self, column: usize) -> NaiveDate {
        shift_days(self.start, column as i64 * self.scale.days())
    }

    /// Fractional column of the start of a day
    pub fn position(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.scale.days() as f64
    }

    /// Bar placement for a row; the end day is included
    pub fn bar(&self, row: &ProcessedTask) -> Bar {
        let days_per_column = self.scale.days() as f64;
        let first = (row.span.start - self.start).num_days();
        let length = (row.span.end - row.span.start).num_days() + 1;
        Bar {
            offset: first as f64 / days_per_column,
            width: length as f64 / days_per_column,
        }
    }

    /// Column position of the today marker, `None` outside the range
    pub fn today_column(&self) -> Option<f64> {
        if self.today < self.start || self.today > self.end {
            return None;
        }
        Some(self.position(self.today))
    }

    /// Returns true for a day column falling on a workday. Week columns always
    /// count as workdays.
    pub fn is_workday_column(&self, column: usize, workdays: &Workdays) -> bool {
        match self.scale {
            Scale::Day => workdays.is_workday(self.column_date(column)),
            Scale::Week => true,
        }
    }

    /// Month labels with the number of columns each spans
    pub fn month_headers(&self) -> Vec<(String, usize)> {
        let mut headers: Vec<(String, usize)> = Vec::new();
        for column in 0..self.columns {
            let label = self.column_date(column).format("%b %Y").to_string();
            match headers.last_mut() {
                Some((last, count)) if *last == label => *count += 1,
                _ => headers.push((label, 1)),
            }
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::TaskId;
    use crate::domain::task::Task;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn hierarchy(spans: &[(NaiveDate, NaiveDate)]) -> Hierarchy {
        let tasks: Vec<Task> = spans
            .iter()
            .enumerate()
            .map(|(i, (s, e))| Task::new_task(TaskId::new(i as u64 + 1), "T", *s, *e, 1))
            .collect();
        Hierarchy::derive(&tasks)
    }

    #[test]
    fn scale_parses() {
        assert_eq!("week".parse::<Scale>().unwrap(), Scale::Week);
        assert_eq!("Day".parse::<Scale>().unwrap(), Scale::Day);
        assert!("month".parse::<Scale>().is_err());
    }

    #[test]
    fn empty_chart_shows_a_month_from_today() {
        let today = date(2024, 6, 3);
        let timeline = Timeline::new(&Hierarchy::default(), Scale::Day, today, false);
        assert_eq!(timeline.start(), today);
        assert_eq!(timeline.end(), date(2024, 7, 3));
        assert_eq!(timeline.columns(), 31);
    }

    #[test]
    fn day_scale_pads_five_days() {
        let h = hierarchy(&[(date(2024, 6, 10), date(2024, 6, 14))]);
        let timeline = Timeline::new(&h, Scale::Day, date(2024, 6, 3), false);

        assert_eq!(timeline.start(), date(2024, 6, 5));
        assert_eq!(timeline.end(), date(2024, 6, 19));
        assert_eq!(timeline.columns(), 14);

        let bar = timeline.bar(&h.rows()[0]);
        assert_eq!(bar.offset, 5.0);
        assert_eq!(bar.width, 5.0);
    }

    #[test]
    fn exporting_drops_leading_padding() {
        let h = hierarchy(&[(date(2024, 6, 10), date(2024, 6, 14))]);
        let timeline = Timeline::new(&h, Scale::Day, date(2024, 6, 3), true);
        assert_eq!(timeline.start(), date(2024, 6, 10));
        assert_eq!(timeline.bar(&h.rows()[0]).offset, 0.0);
    }

    #[test]
    fn week_scale_aligns_to_sundays() {
        // Wednesday 12th .. Tuesday 25th
        let h = hierarchy(&[(date(2024, 6, 12), date(2024, 6, 25))]);
        let timeline = Timeline::new(&h, Scale::Week, date(2024, 6, 3), false);

        assert_eq!(timeline.start(), date(2024, 6, 2));
        assert_eq!(timeline.end(), date(2024, 7, 6));
        assert_eq!(timeline.columns(), 5);
        assert_eq!(timeline.column_date(1), date(2024, 6, 9));

        let bar = timeline.bar(&h.rows()[0]);
        assert_eq!(bar.width, 2.0);
    }

    #[test]
    fn whole_week_bars_have_exact_widths() {
        // Mondays through Sundays, one to four weeks long
        for weeks in 1..=4 {
            let start = date(2024, 6, 10);
            let end = shift_days(start, weeks * 7 - 1);
            let h = hierarchy(&[(start, end)]);
            let timeline = Timeline::new(&h, Scale::Week, date(2024, 6, 3), false);

            let bar = timeline.bar(&h.rows()[0]);
            assert_eq!(bar.width, weeks as f64);
        }
    }

    #[test]
    fn today_marker_only_inside_grid() {
        let h = hierarchy(&[(date(2024, 6, 10), date(2024, 6, 14))]);
        let inside = Timeline::new(&h, Scale::Day, date(2024, 6, 12), false);
        assert_eq!(inside.today_column(), Some(7.0));

        let outside = Timeline::new(&h, Scale::Day, date(2024, 8, 1), false);
        assert_eq!(outside.today_column(), None);
    }

    #[test]
    fn workday_columns_follow_calendar() {
        let h = hierarchy(&[(date(2024, 6, 10), date(2024, 6, 14))]);
        let timeline = Timeline::new(&h, Scale::Day, date(2024, 6, 3), false);
        // Column 0 is Wednesday 5th, column 3 is Saturday 8th
        assert!(timeline.is_workday_column(0, &Workdays::default()));
        assert!(!timeline.is_workday_column(3, &Workdays::default()));
    }

    #[test]
    fn month_headers_group_columns() {
        let h = hierarchy(&[(date(2024, 6, 28), date(2024, 7, 2))]);
        let timeline = Timeline::new(&h, Scale::Day, date(2024, 6, 3), false);
        let headers = timeline.month_headers();
        assert_eq!(headers[0], ("Jun 2024".to_string(), 8));
        assert_eq!(headers[1].0, "Jul 2024");
    }
}
