//! Row classification and the project grouping pass.

use super::types::{ProjectLabels, ProjectReport};
use crate::types::{Grid, Row};
use log::debug;

/// Label cell that marks the summary table header
const SUMMARY_LABEL: &str = "Projects";

/// Count columns a summary header must also carry (one is enough)
const SUMMARY_COUNT_LABELS: [&str; 2] = ["WIP", "Done"];

/// Return the project name if `row` is a project header
///
/// A project header has empty first three cells and a known project name in
/// the fourth.
pub fn project_header<'a>(row: &'a Row, labels: &ProjectLabels) -> Option<&'a str> {
    if row.len() < 4 || !row[..3].iter().all(|c| c.is_empty()) {
        return None;
    }
    let name = row[3].as_str();
    if labels.contains(name) { Some(name) } else { None }
}

/// Check if `row` is the header of the summary table
pub fn is_summary_header(row: &Row) -> bool {
    row.iter().any(|c| c == SUMMARY_LABEL) && row.iter().any(|c| SUMMARY_COUNT_LABELS.contains(&c.as_str()))
}

/// Check if `row` is a data row of the summary table
///
/// Leading three cells empty, a non-empty label in the fourth, and at least
/// one purely numeric count from the fifth cell on.
pub fn is_summary_row(row: &Row) -> bool {
    row.len() > 4
        && row[..3].iter().all(|c| c.is_empty())
        && !row[3].is_empty()
        && row[4..].iter().any(|c| is_numeric(c))
}

/// Digits with at most one decimal point, surrounding whitespace allowed
pub(crate) fn is_numeric(cell: &str) -> bool {
    let cell = cell.trim();
    let mut seen_digit = false;
    let mut seen_point = false;
    for ch in cell.chars() {
        match ch {
            '0'..='9' => seen_digit = true,
            '.' if !seen_point => seen_point = true,
            _ => return false,
        }
    }
    seen_digit
}

/// Group task rows under the most recent project header
///
/// Rows before the first header, and rows with fewer than two cells, are
/// dropped. Seeing a project header again re-activates its existing group.
pub fn group_projects(grid: &Grid, labels: &ProjectLabels) -> ProjectReport {
    let mut report = ProjectReport::new();
    let mut current: Option<String> = None;

    for (idx, row) in grid.iter().enumerate() {
        if let Some(name) = project_header(row, labels) {
            debug!("row {}: project header '{}'", idx, name);
            report.open(name);
            current = Some(name.to_string());
        } else if let Some(ref project) = current
            && row.len() > 1
        {
            report.push(project, row.clone());
        }
    }

    report
}
