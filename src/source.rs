/// Data-source seam
///
/// This module handles:
/// - The `DataSource` trait the runner pulls grids through
/// - Reading grids from a directory of JSON files (offline runs)
///
/// A source never fails: a missing sheet and a failed fetch both come back
/// as an empty grid.
use crate::types::Grid;
use chrono::NaiveDate;
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Something that can produce the allocation grid for a date
pub trait DataSource {
    /// Grid for `date`, or an empty grid if none is available
    fn fetch_grid(&self, date: NaiveDate) -> Grid;
}

/// Reads `<dir>/<YYYY-MM-DD>.json`, each a JSON array of string arrays
#[derive(Debug, Clone)]
pub struct FileDataSource {
    dir: PathBuf,
}

impl FileDataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File a date's grid is read from
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }
}

impl DataSource for FileDataSource {
    fn fetch_grid(&self, date: NaiveDate) -> Grid {
        let path = self.path_for(date);
        if !path.exists() {
            debug!("no grid file at {:?}", path);
            return Grid::new();
        }
        match read_grid_file(&path) {
            Ok(grid) => grid,
            Err(e) => {
                warn!("ignoring grid file {:?}: {}", path, e);
                Grid::new()
            }
        }
    }
}

/// Parse a JSON grid file; non-string cells are stringified
pub fn read_grid_file(path: &Path) -> Result<Grid, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let rows: Vec<Vec<serde_json::Value>> =
        serde_json::from_str(&text).map_err(|e| format!("failed to parse {}: {}", path.display(), e))?;
    Ok(rows.into_iter().map(|row| row.into_iter().map(cell_text).collect()).collect())
}

/// Text form of a JSON cell value (null becomes an empty cell)
pub fn cell_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
