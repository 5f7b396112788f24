//! Plain-text rendering of a grouped report.

use super::types::ProjectReport;
use crate::types::Row;

/// Rows shorter than this carry no task name/status columns worth listing
const MIN_TASK_CELLS: usize = 8;

/// Column holding the task description
const TASK_COLUMN: usize = 3;

/// Column holding the task status
const STATUS_COLUMN: usize = 8;

const NO_STATUS: &str = "No Status";

/// Render one blank-line-prefixed block per project
///
/// Output shape:
/// ```text
///
/// ISB:
/// - Build login page (WIP)
/// - Review PR (No Status)
/// ```
/// Projects whose rows are all shorter than 8 cells produce nothing.
pub fn render_plain(report: &ProjectReport) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (project, tasks) in report.iter() {
        let task_lines: Vec<String> = tasks.iter().filter_map(task_line).collect();
        if task_lines.is_empty() {
            continue;
        }
        lines.push(format!("\n{}:", project));
        lines.extend(task_lines);
    }

    lines.join("\n")
}

fn task_line(task: &Row) -> Option<String> {
    if task.len() < MIN_TASK_CELLS {
        return None;
    }
    let status = task.get(STATUS_COLUMN).map(|s| s.as_str()).unwrap_or(NO_STATUS);
    Some(format!("- {} ({})", task[TASK_COLUMN], status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Row {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_status_column_present() {
        let task = row(&["1", "Asha", "", "Login page", "", "", "", "", "WIP"]);
        assert_eq!(task_line(&task).unwrap(), "- Login page (WIP)");
    }

    #[test]
    fn test_exactly_eight_cells_has_no_status() {
        let task = row(&["1", "Asha", "", "Login page", "", "", "", ""]);
        assert_eq!(task_line(&task).unwrap(), "- Login page (No Status)");
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let task = row(&["1", "Asha", "", "Login page", "", "", ""]);
        assert!(task_line(&task).is_none());
    }

    #[test]
    fn test_project_with_only_short_rows_is_omitted() {
        let mut report = ProjectReport::new();
        report.open("ISB");
        report.push("ISB", row(&["1", "Asha"]));
        report.open("Adhoc");
        report.push("Adhoc", row(&["", "", "", "Fix bug", "", "", "", "", "Done"]));

        assert_eq!(render_plain(&report), "\nAdhoc:\n- Fix bug (Done)");
    }

    #[test]
    fn test_empty_report_renders_empty_string() {
        assert_eq!(render_plain(&ProjectReport::new()), "");
    }
}
