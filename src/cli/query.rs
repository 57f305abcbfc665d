//! Read-only views of the active project

use anyhow::Result;
use chrono::NaiveDate;

use super::output::Output;
use crate::domain::{
    export_rows, Connector, Dashboard, DependencyGraph, Direction, Hierarchy, Portfolio,
    ProcessedTask, Project, Scale, Timeline, Workdays, EXPORT_HEADERS,
};
use crate::storage::Workspace;

/// Width of the name column in the chart
const LABEL_WIDTH: usize = 28;

fn load() -> Result<Portfolio> {
    Workspace::open_current()?.load()
}

fn indented_name(row: &ProcessedTask) -> String {
    let marker = match (row.is_group(), row.is_collapsed()) {
        (true, true) => "[+] ",
        (true, false) => "[-] ",
        _ => "",
    };
    format!("{}{}{}", "  ".repeat(row.level), marker, row.name)
}

fn fit(text: &str, width: usize) -> String {
    let mut fitted: String = text.chars().take(width).collect();
    let len = fitted.chars().count();
    fitted.push_str(&" ".repeat(width - len));
    fitted
}

fn row_label(row: &ProcessedTask) -> String {
    row.row_number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn list(output: &Output) -> Result<()> {
    let portfolio = load()?;
    let project = portfolio.active_project()?;
    let hierarchy = Hierarchy::derive(&project.tasks);

    if output.is_json() {
        let rows: Vec<_> = hierarchy
            .rows()
            .iter()
            .map(|row| {
                serde_json::json!({
                    "row": row.row_number,
                    "task": row,
                    "assignee_known": portfolio.users.is_known(&row.assignee),
                    "dependency_rows": hierarchy.dependency_labels(&row.dependencies),
                })
            })
            .collect();
        output.data(&serde_json::json!({
            "project": { "id": project.id, "name": project.name },
            "rows": rows,
        }));
        return Ok(());
    }

    println!("{} ({})", project.name, project.id);
    println!();

    if hierarchy.is_empty() {
        println!("No tasks yet. Add one with 'gantt task add'.");
        return Ok(());
    }

    println!(
        "{:<4} {:<5} {:<32} {:<20} {:<10} {:<10} {:>4}  DEPS",
        "ROW", "ID", "NAME", "ASSIGNEE", "START", "END", "DAYS"
    );
    println!("{}", "-".repeat(100));

    for row in hierarchy.rows() {
        let assignee = if portfolio.users.is_known(&row.assignee) {
            row.assignee.clone()
        } else {
            format!("{} (deleted)", row.assignee)
        };
        let days = row
            .duration()
            .map(|d| d.to_string())
            .unwrap_or_default();

        println!(
            "{:<4} {:<5} {:<32} {:<20} {:<10} {:<10} {:>4}  {}",
            row_label(row),
            row.id,
            fit(&indented_name(row), 32),
            fit(&assignee, 20),
            row.span.start,
            row.span.end,
            days,
            hierarchy.dependency_labels(&row.dependencies)
        );
    }

    Ok(())
}

/// One text cell of a row's track
fn cell(timeline: &Timeline, workdays: &Workdays, row: &ProcessedTask, column: usize) -> char {
    let bar = timeline.bar(row);
    let left = column as f64;

    if bar.offset < left + 1.0 && bar.end() > left {
        return if row.is_group() { '=' } else { '#' };
    }
    if timeline.today_column().map(f64::floor) == Some(left) {
        return '|';
    }
    if !timeline.is_workday_column(column, workdays) {
        return '.';
    }
    ' '
}

fn describe(hierarchy: &Hierarchy, connector: &Connector) -> (String, String) {
    let name = |id| {
        hierarchy
            .get(id)
            .map(|row| row.name.clone())
            .unwrap_or_default()
    };
    (name(connector.from), name(connector.to))
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Down => "down",
        Direction::Up => "up",
    }
}

pub fn gantt(output: &Output, scale: Scale, today: NaiveDate, exporting: bool) -> Result<()> {
    let portfolio = load()?;
    let project = portfolio.active_project()?;
    let hierarchy = Hierarchy::derive(&project.tasks);
    let timeline = Timeline::new(&hierarchy, scale, today, exporting);
    let connectors = DependencyGraph::build(&project.tasks, &hierarchy).connectors();

    if output.is_json() {
        let rows: Vec<_> = hierarchy
            .rows()
            .iter()
            .map(|row| {
                let bar = timeline.bar(row);
                serde_json::json!({
                    "id": row.id,
                    "name": row.name,
                    "type": if row.is_group() { "group" } else { "task" },
                    "level": row.level,
                    "row": row.row_number,
                    "color": row.color,
                    "start": row.span.start,
                    "end": row.span.end,
                    "offset": bar.offset,
                    "width": bar.width,
                })
            })
            .collect();
        let months: Vec<_> = timeline
            .month_headers()
            .into_iter()
            .map(|(label, columns)| serde_json::json!({ "label": label, "columns": columns }))
            .collect();

        output.data(&serde_json::json!({
            "project": { "id": project.id, "name": project.name },
            "scale": timeline.scale(),
            "start": timeline.start(),
            "end": timeline.end(),
            "columns": timeline.columns(),
            "today_column": timeline.today_column(),
            "months": months,
            "rows": rows,
            "connectors": connectors,
        }));
        return Ok(());
    }

    println!(
        "{} ({} to {}, {} scale)",
        project.name,
        timeline.start(),
        timeline.end(),
        timeline.scale()
    );
    println!();

    let mut header = " ".repeat(LABEL_WIDTH + 1);
    for (label, columns) in timeline.month_headers() {
        header.push_str(&fit(&label, columns));
    }
    println!("{}", header.trim_end());

    for row in hierarchy.rows() {
        let track: String = (0..timeline.columns())
            .map(|column| cell(&timeline, &portfolio.workdays, row, column))
            .collect();
        println!("{} {}", fit(&indented_name(row), LABEL_WIDTH), track.trim_end());
    }

    if !connectors.is_empty() {
        println!();
        println!("Dependencies:");
        for connector in &connectors {
            let (from, to) = describe(&hierarchy, connector);
            println!("  {} -> {}", from, to);
        }
    }

    Ok(())
}

pub fn deps(output: &Output) -> Result<()> {
    let portfolio = load()?;
    let project = portfolio.active_project()?;
    let hierarchy = Hierarchy::derive(&project.tasks);
    let connectors = DependencyGraph::build(&project.tasks, &hierarchy).connectors();

    if output.is_json() {
        output.data(&connectors);
        return Ok(());
    }

    if connectors.is_empty() {
        println!("No dependencies between visible rows.");
        return Ok(());
    }

    println!(
        "{:<30} {:<30} {:<6} {:>5}",
        "FROM", "TO", "DIR", "COUNT"
    );
    println!("{}", "-".repeat(74));
    for connector in &connectors {
        let (from, to) = describe(&hierarchy, connector);
        println!(
            "{:<30} {:<30} {:<6} {:>5}",
            fit(&from, 30),
            fit(&to, 30),
            direction_label(connector.direction),
            connector.count
        );
    }

    Ok(())
}

fn print_dashboard(project: &Project, dashboard: &Dashboard) {
    println!("{} Dashboard", project.name);
    println!("{}", "=".repeat(40));
    println!();

    match dashboard.span {
        Some(span) => println!(
            "Timeline: {} to {} ({} days, {} weeks)",
            span.start,
            span.end,
            dashboard.total_days,
            dashboard.weeks_label()
        ),
        None => println!("Timeline: no tasks scheduled"),
    }
    println!("Progress: {}%", dashboard.progress);
    println!(
        "Tasks:    {} total, {} users",
        dashboard.total_tasks, dashboard.total_users
    );
    println!("  [x] Completed:   {}", dashboard.status.completed);
    println!("  [~] In Progress: {}", dashboard.status.in_progress);
    println!("  [ ] Upcoming:    {}", dashboard.status.upcoming);

    if !dashboard.workload.is_empty() {
        println!();
        println!("Workload:");
        for entry in &dashboard.workload {
            println!("  {:<20} {:>4} days", entry.assignee, entry.days);
        }
    }

    println!();
    if dashboard.deadlines.is_empty() {
        println!("Upcoming deadlines: none");
    } else {
        println!("Upcoming deadlines:");
        for deadline in &dashboard.deadlines {
            println!(
                "  {}  {:<30} {}",
                deadline.end,
                fit(&deadline.name, 30),
                deadline.assignee
            );
        }
    }
}

pub fn dashboard(output: &Output, today: NaiveDate) -> Result<()> {
    let portfolio = load()?;
    let project = portfolio.active_project()?;
    let dashboard = Dashboard::summarize(&project.tasks, portfolio.users.len(), today);

    if output.is_json() {
        output.data(&dashboard);
    } else {
        print_dashboard(project, &dashboard);
    }

    Ok(())
}

pub fn export(output: &Output) -> Result<()> {
    let portfolio = load()?;
    let project = portfolio.active_project()?;
    let rows = export_rows(&Hierarchy::derive(&project.tasks));

    if output.is_json() {
        output.data(&rows);
        return Ok(());
    }

    output.row(&EXPORT_HEADERS);
    for row in &rows {
        let duration = row.duration.map(|d| d.to_string()).unwrap_or_default();
        output.row(&[
            row.name.as_str(),
            row.kind,
            row.assignee.as_str(),
            row.start.as_str(),
            row.end.as_str(),
            duration.as_str(),
            row.color.as_deref().unwrap_or_default(),
        ]);
    }

    Ok(())
}
