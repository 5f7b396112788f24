//! Report type definitions.

use crate::types::Row;
use indexmap::IndexMap;

/// The known project names a header row may carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLabels(Vec<String>);

impl ProjectLabels {
    /// Build from any list of names; blank names and duplicates are dropped
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if !name.is_empty() && !labels.contains(&name) {
                labels.push(name);
            }
        }
        ProjectLabels(labels)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|l| l == name)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Task rows grouped under the project header that precedes them
///
/// Every key was seen as a project header; a name seen twice keeps one group
/// and later rows are appended to it.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct ProjectReport {
    projects: IndexMap<String, Vec<Row>>,
}

impl ProjectReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `name` the active group, creating it if needed
    pub fn open(&mut self, name: &str) {
        self.projects.entry(name.to_string()).or_default();
    }

    /// Append a task row to an existing group
    pub fn push(&mut self, name: &str, row: Row) {
        if let Some(tasks) = self.projects.get_mut(name) {
            tasks.push(row);
        }
    }

    #[cfg(test)]
    pub fn tasks(&self, name: &str) -> Option<&[Row]> {
        self.projects.get(name).map(|t| t.as_slice())
    }

    /// Projects and their task rows, in the order headers were first seen
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Row])> {
        self.projects.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn project_names(&self) -> Vec<&str> {
        self.projects.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

/// A formatted report in both renderings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub plain: String,
    pub html: String,
}
