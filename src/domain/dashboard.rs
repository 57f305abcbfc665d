//! Project summary metrics
//!
//! Computed over a project's tasks (groups are skipped) relative to a
//! reference day. Every metric has a value even for an empty project.

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::shift_days;
use super::id::TaskId;
use super::task::{Span, Task, UNASSIGNED};

/// How far ahead a deadline counts as upcoming
pub const DEADLINE_WINDOW_DAYS: i64 = 7;

/// Task counts by schedule position relative to today
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    /// Ended before today
    pub completed: usize,
    /// Today falls inside the task
    pub in_progress: usize,
    /// Starts after today
    pub upcoming: usize,
}

/// Business days assigned to one person
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Workload {
    pub assignee: String,
    pub days: u64,
}

/// A task ending within the deadline window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deadline {
    pub id: TaskId,
    pub name: String,
    pub assignee: String,
    pub end: NaiveDate,
}

/// Summary of one project
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dashboard {
    /// Earliest start to latest end, `None` without tasks
    pub span: Option<Span>,
    /// Calendar days covered, inclusive and at least 1 (0 without tasks)
    pub total_days: i64,
    pub total_weeks: f64,
    /// Percentage of the span elapsed, 0..=100
    pub progress: u8,
    pub total_tasks: usize,
    pub total_users: usize,
    pub status: StatusCounts,
    /// Heaviest first
    pub workload: Vec<Workload>,
    /// Soonest first
    pub deadlines: Vec<Deadline>,
}

impl Dashboard {
    /// Summarizes `tasks` as of `today`
    pub fn summarize(tasks: &[Task], user_count: usize, today: NaiveDate) -> Self {
        let work: Vec<&Task> = tasks.iter().filter(|t| t.is_task()).collect();

        let (Some(min), Some(max)) = (
            work.iter().map(|t| t.start).min(),
            work.iter().map(|t| t.end).max(),
        ) else {
            return Self {
                total_users: user_count,
                ..Self::default()
            };
        };

        let span_days = (max - min).num_days();
        let total_days = (span_days + 1).max(1);
        let total_weeks = total_days as f64 / 7.0;

        let elapsed = (today - min).num_days().max(0);
        let progress = if span_days > 0 {
            let ratio = elapsed as f64 / span_days as f64;
            (ratio * 100.0).round().min(100.0) as u8
        } else {
            0
        };

        Self {
            span: Some(Span::new(min, max)),
            total_days,
            total_weeks,
            progress,
            total_tasks: work.len(),
            total_users: user_count,
            status: status_counts(&work, today),
            workload: workload(&work),
            deadlines: deadlines(&work, today),
        }
    }

    /// Weeks rounded to one decimal for display
    pub fn weeks_label(&self) -> String {
        format!("{:.1}", self.total_weeks)
    }

    pub fn is_empty(&self) -> bool {
        self.total_tasks == 0
    }
}

fn status_counts(tasks: &[&Task], today: NaiveDate) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for task in tasks {
        if task.end < today {
            counts.completed += 1;
        } else if task.start <= today {
            counts.in_progress += 1;
        } else {
            counts.upcoming += 1;
        }
    }
    counts
}

fn workload(tasks: &[&Task]) -> Vec<Workload> {
    let mut totals: Vec<Workload> = Vec::new();

    for task in tasks {
        let assignee = if task.assignee.trim().is_empty() {
            UNASSIGNED
        } else {
            task.assignee.as_str()
        };
        let days = u64::from(task.duration().unwrap_or(1).max(1));

        match totals.iter_mut().find(|w| w.assignee == assignee) {
            Some(entry) => entry.days += days,
            None => totals.push(Workload {
                assignee: assignee.to_string(),
                days,
            }),
        }
    }

    // Stable: ties keep first-appearance order
    totals.sort_by(|a, b| b.days.cmp(&a.days));
    totals
}

fn deadlines(tasks: &[&Task], today: NaiveDate) -> Vec<Deadline> {
    let horizon = shift_days(today, DEADLINE_WINDOW_DAYS);
    let mut upcoming: Vec<Deadline> = tasks
        .iter()
        .filter(|t| today <= t.end && t.end <= horizon)
        .map(|t| Deadline {
            id: t.id,
            name: t.name.clone(),
            assignee: t.assignee.clone(),
            end: t.end,
        })
        .collect();
    upcoming.sort_by_key(|d| d.end);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(raw: u64, assignee: &str, start: NaiveDate, end: NaiveDate, duration: u32) -> Task {
        let mut t = Task::new_task(TaskId::new(raw), format!("T{}", raw), start, end, duration);
        t.assignee = assignee.to_string();
        t
    }

    #[test]
    fn empty_project_yields_empty_dashboard() {
        let dash = Dashboard::summarize(&[], 4, date(2024, 6, 3));
        assert!(dash.is_empty());
        assert_eq!(dash.span, None);
        assert_eq!(dash.total_days, 0);
        assert_eq!(dash.progress, 0);
        assert_eq!(dash.total_users, 4);
        assert!(dash.workload.is_empty());
    }

    #[test]
    fn groups_are_ignored() {
        let group = Task::new_group(TaskId::new(1), "G", date(2020, 1, 1));
        let dash = Dashboard::summarize(&[group], 1, date(2024, 6, 3));
        assert!(dash.is_empty());
    }

    #[test]
    fn span_progress_and_status() {
        let tasks = vec![
            task(1, "Alice", date(2024, 6, 1), date(2024, 6, 5), 3),
            task(2, "Bob", date(2024, 6, 6), date(2024, 6, 12), 5),
            task(3, "Alice", date(2024, 6, 15), date(2024, 6, 21), 5),
        ];
        let today = date(2024, 6, 11);
        let dash = Dashboard::summarize(&tasks, 3, today);

        assert_eq!(dash.span, Some(Span::new(date(2024, 6, 1), date(2024, 6, 21))));
        assert_eq!(dash.total_days, 21);
        assert_eq!(dash.weeks_label(), "3.0");
        // 10 of 20 days elapsed
        assert_eq!(dash.progress, 50);
        assert_eq!(
            dash.status,
            StatusCounts {
                completed: 1,
                in_progress: 1,
                upcoming: 1
            }
        );
    }

    #[test]
    fn progress_is_capped_and_floored() {
        let tasks = vec![task(1, "A", date(2024, 6, 3), date(2024, 6, 7), 5)];
        assert_eq!(Dashboard::summarize(&tasks, 1, date(2025, 1, 1)).progress, 100);
        assert_eq!(Dashboard::summarize(&tasks, 1, date(2024, 1, 1)).progress, 0);
    }

    #[test]
    fn single_day_project_has_zero_progress() {
        let tasks = vec![task(1, "A", date(2024, 6, 3), date(2024, 6, 3), 1)];
        let dash = Dashboard::summarize(&tasks, 1, date(2024, 6, 10));
        assert_eq!(dash.total_days, 1);
        assert_eq!(dash.progress, 0);
    }

    #[test]
    fn workload_sums_and_sorts() {
        let tasks = vec![
            task(1, "Alice", date(2024, 6, 3), date(2024, 6, 4), 2),
            task(2, "", date(2024, 6, 3), date(2024, 6, 7), 5),
            task(3, "Bob", date(2024, 6, 3), date(2024, 6, 4), 2),
            task(4, "Alice", date(2024, 6, 3), date(2024, 6, 3), 0),
        ];
        let dash = Dashboard::summarize(&tasks, 2, date(2024, 6, 3));

        let summary: Vec<(&str, u64)> = dash
            .workload
            .iter()
            .map(|w| (w.assignee.as_str(), w.days))
            .collect();
        assert_eq!(summary, vec![("Unassigned", 5), ("Alice", 3), ("Bob", 2)]);
    }

    #[test]
    fn deadlines_within_a_week_ascending() {
        let today = date(2024, 6, 10);
        let tasks = vec![
            task(1, "A", date(2024, 6, 1), date(2024, 6, 17), 5),
            task(2, "A", date(2024, 6, 1), date(2024, 6, 10), 5),
            task(3, "A", date(2024, 6, 1), date(2024, 6, 9), 5),
            task(4, "A", date(2024, 6, 1), date(2024, 6, 18), 5),
            task(5, "A", date(2024, 6, 1), date(2024, 6, 12), 5),
        ];
        let dash = Dashboard::summarize(&tasks, 1, today);

        let ids: Vec<u64> = dash.deadlines.iter().map(|d| d.id.get()).collect();
        assert_eq!(ids, vec![2, 5, 1]);
    }
}
