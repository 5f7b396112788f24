//! Report generation module - turns a raw sheet grid into the project report.
//!
//! This module handles:
//! - Detecting project header and summary header rows
//! - Grouping task rows under the project that precedes them
//! - Rendering the grouped report as plain text
//! - Rendering the sheet as HTML tables (summary block plus one table per project)
//! - Exporting a formatted grid as JSON for previews
//!
//! The transformation is total: malformed rows are skipped, never reported.
//!
//! # Module Organization
//!
//! - `types` - ProjectLabels, ProjectReport, RenderedReport
//! - `grouping` - Row predicates and the single grouping pass
//! - `text` - Plain-text rendering
//! - `html` - HTML table rendering
//! - `export` - JSON export for `--preview --json`

mod export;
mod grouping;
mod html;
mod text;
mod types;

pub use types::{ProjectLabels, ProjectReport, RenderedReport};

pub use export::write_json;

pub use html::{escape_html, render_html};
pub use text::render_plain;

/// Plain-text rendering of an empty grid
pub const NO_TASKS: &str = "No tasks available";

/// HTML rendering of an empty grid
pub const NO_TASKS_HTML: &str = "<p>No tasks available</p>";

use crate::types::Grid;

/// Formats grids into rendered reports using a fixed set of project labels
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    labels: ProjectLabels,
}

impl ReportFormatter {
    pub fn new(labels: ProjectLabels) -> Self {
        Self { labels }
    }

    /// Group task rows by project (insertion order preserved)
    pub fn group(&self, grid: &Grid) -> ProjectReport {
        grouping::group_projects(grid, &self.labels)
    }

    /// Render a grid as (plain text, HTML)
    ///
    /// The two renderings are independent passes and intentionally disagree
    /// in two places: plain text drops rows shorter than 8 cells and projects
    /// with no remaining rows, while HTML keeps both.
    pub fn format(&self, grid: &Grid) -> RenderedReport {
        if grid.is_empty() {
            return RenderedReport { plain: NO_TASKS.to_string(), html: NO_TASKS_HTML.to_string() };
        }

        let report = self.group(grid);
        RenderedReport { plain: render_plain(&report), html: render_html(grid, &self.labels) }
    }
}
