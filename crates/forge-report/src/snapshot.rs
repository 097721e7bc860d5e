//! JSON snapshot generation.
//!
//! This module provides [`JsonGenerator`] for serializing the assembled
//! report as a nested course snapshot: units contain themes, themes contain
//! their elements. The nesting is rebuilt from the flat sorted rows, so the
//! snapshot mirrors the course structure regardless of how far the run got.
//!
//! # Example
//!
//! ```rust
//! use forge_report::{CourseRunReport, ReportInput};
//! use forge_report::snapshot::JsonGenerator;
//!
//! let report = CourseRunReport::assemble(ReportInput::default());
//! let json = JsonGenerator::new(&report).generate_pretty().unwrap();
//! assert!(json.contains("\"units\""));
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{CourseDescriptor, CourseRunReport, ElementRow, Result, RunSummary};

/// JSON snapshot generator.
///
/// Wraps a [`CourseRunReport`] reference and serializes it with the rows
/// regrouped into their unit/theme hierarchy.
pub struct JsonGenerator<'a> {
    report: &'a CourseRunReport,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    course: &'a CourseDescriptor,
    mode: &'a str,
    course_url: Option<&'a str>,
    aborted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    abort_reason: Option<&'a str>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    summary: &'a RunSummary,
    units: Vec<SnapshotUnit<'a>>,
}

#[derive(Serialize)]
struct SnapshotUnit<'a> {
    unit: u32,
    themes: Vec<SnapshotTheme<'a>>,
}

#[derive(Serialize)]
struct SnapshotTheme<'a> {
    theme: u32,
    code: String,
    title: &'a str,
    elements: Vec<&'a ElementRow>,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a new JSON generator for the given report.
    #[must_use]
    pub const fn new(report: &'a CourseRunReport) -> Self {
        Self { report }
    }

    /// Serializes the snapshot as compact single-line JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Serialization` if serialization fails.
    pub fn generate(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.snapshot())?)
    }

    /// Serializes the snapshot as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Serialization` if serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    fn snapshot(&self) -> Snapshot<'a> {
        let mut units: Vec<SnapshotUnit<'a>> = Vec::new();
        // Rows are already in taxonomy order, so grouping is a single pass.
        for row in &self.report.rows {
            if units.last().map_or(true, |u| u.unit != row.unit) {
                units.push(SnapshotUnit {
                    unit: row.unit,
                    themes: Vec::new(),
                });
            }
            if let Some(unit) = units.last_mut() {
                if unit.themes.last().map_or(true, |t| t.theme != row.theme) {
                    unit.themes.push(SnapshotTheme {
                        theme: row.theme,
                        code: row.theme_code(),
                        title: &row.theme_title,
                        elements: Vec::new(),
                    });
                }
                if let Some(theme) = unit.themes.last_mut() {
                    theme.elements.push(row);
                }
            }
        }

        Snapshot {
            course: &self.report.course,
            mode: &self.report.mode,
            course_url: self.report.course_url.as_deref(),
            aborted: self.report.aborted,
            abort_reason: self.report.abort_reason.as_deref(),
            started_at: self.report.started_at,
            finished_at: self.report.finished_at,
            summary: &self.report.summary,
            units,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
