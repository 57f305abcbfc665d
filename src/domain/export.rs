//! Flat rows for spreadsheet export

use serde::Serialize;

use super::hierarchy::Hierarchy;

/// One exported row; field names are the spreadsheet column headers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    /// Name indented by two spaces per nesting level
    #[serde(rename = "Task Name")]
    pub name: String,
    #[serde(rename = "Type")]
    pub kind: &'static str,
    #[serde(rename = "Assignee")]
    pub assignee: String,
    #[serde(rename = "Start Date")]
    pub start: String,
    #[serde(rename = "End Date")]
    pub end: String,
    /// Empty for groups
    #[serde(rename = "Duration (workdays)")]
    pub duration: Option<u32>,
    #[serde(rename = "Color")]
    pub color: Option<String>,
}

/// Column headers in output order
pub const EXPORT_HEADERS: [&str; 7] = [
    "Task Name",
    "Type",
    "Assignee",
    "Start Date",
    "End Date",
    "Duration (workdays)",
    "Color",
];

/// Projects the visible rows for export. Group dates are the derived spans.
pub fn export_rows(hierarchy: &Hierarchy) -> Vec<ExportRow> {
    hierarchy
        .rows()
        .iter()
        .map(|row| ExportRow {
            name: format!("{}{}", " ".repeat(row.level * 2), row.name),
            kind: if row.is_group() { "group" } else { "task" },
            assignee: row.assignee.clone(),
            start: row.span.start.format("%Y-%m-%d").to_string(),
            end: row.span.end.format("%Y-%m-%d").to_string(),
            duration: row.duration(),
            color: row.color.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::TaskId;
    use crate::domain::task::Task;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn rows_are_indented_and_groups_have_no_duration() {
        let group = Task::new_group(TaskId::new(1), "Design", date(1));
        let mut child = Task::new_task(TaskId::new(2), "Wireframes", date(3), date(5), 3);
        child.parent_id = Some(TaskId::new(1));

        let rows = export_rows(&Hierarchy::derive(&[group, child]));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Design");
        assert_eq!(rows[0].kind, "group");
        assert_eq!(rows[0].duration, None);
        assert_eq!(rows[0].start, "2024-06-03");
        assert_eq!(rows[1].name, "  Wireframes");
        assert_eq!(rows[1].duration, Some(3));
    }

    #[test]
    fn json_uses_column_headers() {
        let task = Task::new_task(TaskId::new(1), "QA", date(3), date(3), 1);
        let rows = export_rows(&Hierarchy::derive(&[task]));
        let json = serde_json::to_value(&rows[0]).unwrap();

        for header in EXPORT_HEADERS {
            assert!(json.get(header).is_some(), "missing {}", header);
        }
    }
}
