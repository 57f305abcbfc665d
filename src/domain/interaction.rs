//! Drag and resize of a single bar
//!
//! A small state machine: `Idle` until a bar is pressed, then one active
//! gesture until release. Pointer movement is snapped to whole columns and
//! turned into a [`TaskPatch`] for the store; the origin is re-based by the
//! columns consumed so deltas never accumulate twice.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::calendar::checked_shift_days;
use super::id::TaskId;
use super::task::{Task, TaskPatch};
use super::timeline::Scale;

/// What the pointer grabbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    /// Whole bar: both dates move
    Drag,
    /// Left handle: start date moves
    ResizeStart,
    /// Right handle: end date moves
    ResizeEnd,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::Drag => write!(f, "both"),
            Gesture::ResizeStart => write!(f, "start"),
            Gesture::ResizeEnd => write!(f, "end"),
        }
    }
}

impl FromStr for Gesture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" | "drag" => Ok(Gesture::Drag),
            "start" => Ok(Gesture::ResizeStart),
            "end" => Ok(Gesture::ResizeEnd),
            other => Err(format!("Unknown edge '{}': expected start, end or both", other)),
        }
    }
}

/// Shifts one or both dates of a task by `days` calendar days.
///
/// Returns `None` for groups, for a zero shift, for a shift past the
/// representable calendar, and for a resize that would put the start after
/// the end.
pub fn edge_patch(task: &Task, gesture: Gesture, days: i64) -> Option<TaskPatch> {
    if task.is_group() || days == 0 {
        return None;
    }

    match gesture {
        Gesture::Drag => Some(TaskPatch::dates(
            checked_shift_days(task.start, days)?,
            checked_shift_days(task.end, days)?,
        )),
        Gesture::ResizeStart => {
            let start = checked_shift_days(task.start, days)?;
            (start <= task.end).then(|| TaskPatch::start(start))
        }
        Gesture::ResizeEnd => {
            let end = checked_shift_days(task.end, days)?;
            (end >= task.start).then(|| TaskPatch::end(end))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    Active {
        task: TaskId,
        gesture: Gesture,
        origin_x: f64,
    },
}

/// Pointer interaction with chart bars
#[derive(Debug, Clone)]
pub struct BarInteraction {
    state: InteractionState,
    scale: Scale,
    column_width: f64,
}

impl BarInteraction {
    pub fn new(scale: Scale, column_width: f64) -> Self {
        Self {
            state: InteractionState::Idle,
            scale,
            column_width: column_width.max(1.0),
        }
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == InteractionState::Idle
    }

    /// Starts a gesture on a bar. Groups cannot be dragged or resized.
    pub fn press(&mut self, task: &Task, gesture: Gesture, x: f64) -> bool {
        if task.is_group() {
            return false;
        }
        self.state = InteractionState::Active {
            task: task.id,
            gesture,
            origin_x: x,
        };
        true
    }

    /// Feeds a pointer position. Returns the edit to apply once the pointer
    /// has crossed at least one column.
    ///
    /// The origin advances by the consumed columns even when a resize is
    /// refused, matching where the handle visually stays.
    pub fn pointer_move(&mut self, task: &Task, x: f64) -> Option<TaskPatch> {
        let InteractionState::Active {
            task: active,
            gesture,
            origin_x,
        } = self.state
        else {
            return None;
        };
        if active != task.id {
            return None;
        }

        let columns = ((x - origin_x) / self.column_width).round() as i64;
        if columns == 0 {
            return None;
        }
        let days = columns.checked_mul(self.scale.days())?;

        self.state = InteractionState::Active {
            task: active,
            gesture,
            origin_x: origin_x + columns as f64 * self.column_width,
        };

        edge_patch(task, gesture, days)
    }

    /// Ends the current gesture
    pub fn release(&mut self) {
        self.state = InteractionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bar() -> Task {
        Task::new_task(TaskId::new(1), "Build", date(2024, 6, 3), date(2024, 6, 7), 5)
    }

    #[test]
    fn idle_ignores_movement() {
        let mut interaction = BarInteraction::new(Scale::Day, 40.0);
        assert!(interaction.pointer_move(&bar(), 500.0).is_none());
        assert!(interaction.is_idle());
    }

    #[test]
    fn groups_cannot_be_pressed() {
        let mut interaction = BarInteraction::new(Scale::Day, 40.0);
        let group = Task::new_group(TaskId::new(2), "G", date(2024, 6, 3));
        assert!(!interaction.press(&group, Gesture::Drag, 0.0));
        assert!(interaction.is_idle());
    }

    #[test]
    fn drag_shifts_both_dates_by_whole_columns() {
        let mut interaction = BarInteraction::new(Scale::Day, 40.0);
        let task = bar();
        interaction.press(&task, Gesture::Drag, 100.0);

        assert!(interaction.pointer_move(&task, 115.0).is_none());

        let patch = interaction.pointer_move(&task, 185.0).unwrap();
        assert_eq!(patch, TaskPatch::dates(date(2024, 6, 5), date(2024, 6, 9)));

        // Origin re-based to 180, so 190 rounds to zero columns
        assert!(interaction.pointer_move(&task, 190.0).is_none());

        interaction.release();
        assert!(interaction.is_idle());
    }

    #[test]
    fn week_scale_moves_seven_days_per_column() {
        let mut interaction = BarInteraction::new(Scale::Week, 80.0);
        let task = bar();
        interaction.press(&task, Gesture::Drag, 0.0);

        let patch = interaction.pointer_move(&task, -80.0).unwrap();
        assert_eq!(patch, TaskPatch::dates(date(2024, 5, 27), date(2024, 5, 31)));
    }

    #[test]
    fn resize_start_refused_past_end() {
        let task = bar();
        assert_eq!(
            edge_patch(&task, Gesture::ResizeStart, 4),
            Some(TaskPatch::start(date(2024, 6, 7)))
        );
        assert_eq!(edge_patch(&task, Gesture::ResizeStart, 5), None);
    }

    #[test]
    fn resize_end_refused_before_start() {
        let task = bar();
        assert_eq!(
            edge_patch(&task, Gesture::ResizeEnd, 3),
            Some(TaskPatch::end(date(2024, 6, 10)))
        );
        assert_eq!(edge_patch(&task, Gesture::ResizeEnd, -5), None);
    }

    #[test]
    fn refused_resize_still_consumes_columns() {
        let mut interaction = BarInteraction::new(Scale::Day, 10.0);
        let task = bar();
        interaction.press(&task, Gesture::ResizeEnd, 0.0);

        assert!(interaction.pointer_move(&task, -100.0).is_none());
        match interaction.state() {
            InteractionState::Active { origin_x, .. } => assert_eq!(origin_x, -100.0),
            InteractionState::Idle => panic!("gesture ended early"),
        }
    }

    #[test]
    fn shifts_off_the_calendar_are_refused() {
        let task = bar();
        assert_eq!(edge_patch(&task, Gesture::Drag, 200_000_000), None);
        assert_eq!(edge_patch(&task, Gesture::ResizeStart, i64::MIN), None);
        assert_eq!(edge_patch(&task, Gesture::ResizeEnd, i64::MAX), None);
    }

    #[test]
    fn extreme_pointer_positions_are_ignored() {
        let task = bar();

        let mut interaction = BarInteraction::new(Scale::Week, 1.0);
        interaction.press(&task, Gesture::Drag, 0.0);
        assert!(interaction.pointer_move(&task, f64::MAX).is_none());

        let mut interaction = BarInteraction::new(Scale::Day, 1.0);
        interaction.press(&task, Gesture::ResizeEnd, 0.0);
        assert!(interaction.pointer_move(&task, 1e300).is_none());
    }

    #[test]
    fn other_bars_are_ignored_while_active() {
        let mut interaction = BarInteraction::new(Scale::Day, 10.0);
        interaction.press(&bar(), Gesture::Drag, 0.0);
        let other = Task::new_task(TaskId::new(9), "Other", date(2024, 6, 3), date(2024, 6, 3), 1);
        assert!(interaction.pointer_move(&other, 100.0).is_none());
    }

    #[test]
    fn gesture_parses_edge_names() {
        assert_eq!("start".parse::<Gesture>().unwrap(), Gesture::ResizeStart);
        assert_eq!("both".parse::<Gesture>().unwrap(), Gesture::Drag);
        assert!("middle".parse::<Gesture>().is_err());
    }
}
