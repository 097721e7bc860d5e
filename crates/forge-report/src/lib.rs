//! Courseforge report generation.
//!
//! This crate assembles the run report and renders the three artifacts a
//! completed (or aborted) run leaves behind:
//!
//! - [`inventory::CsvGenerator`] - per-element CSV inventory
//! - [`snapshot::JsonGenerator`] - nested JSON course snapshot
//! - [`summary::SummaryGenerator`] - human-readable text summary
//!
//! # Types
//!
//! - [`ReportInput`] - raw per-run data handed over by the pipeline
//! - [`CourseRunReport`] - assembled report with sorted rows and tallies
//! - [`ElementRow`] - one element's final state
//! - [`RunSummary`] - aggregate counts and percentages
//!
//! The input types are local to this crate rather than imported from the
//! content and delivery crates, so the report stage has no dependency on
//! the rest of the pipeline and can be fed from tests directly.
//!
//! # Example
//!
//! ```rust
//! use forge_report::{CourseDescriptor, CourseRunReport, ReportInput};
//! use forge_report::inventory::CsvGenerator;
//!
//! let input = ReportInput {
//!     course: CourseDescriptor::default(),
//!     mode: "simulation".to_string(),
//!     ..Default::default()
//! };
//! let report = CourseRunReport::assemble(input);
//! let csv = CsvGenerator::new(&report).generate();
//! assert!(csv.starts_with("Unidad,"));
//! ```

pub mod inventory;
pub mod snapshot;
pub mod summary;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the CSV inventory artifact.
pub const INVENTORY_FILE: &str = "course_inventory.csv";

/// File name of the JSON snapshot artifact.
pub const SNAPSHOT_FILE: &str = "course_structure.json";

/// File name of the text summary artifact.
pub const SUMMARY_FILE: &str = "course_summary.txt";

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize the report to JSON.
    #[error("failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to write a report artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

// ============================================================================
// ValidationState (local copy to avoid cross-crate dependency)
// ============================================================================

/// Final validation state of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationState {
    /// Passed every hard check.
    Valid,
    /// At least one hard check failed.
    Invalid,
    /// Validation was skipped or never reached.
    #[default]
    Unvalidated,
}

impl ValidationState {
    /// Spanish label used in the artifacts.
    #[must_use]
    pub const fn label_es(&self) -> &'static str {
        match self {
            Self::Valid => "Válido",
            Self::Invalid => "Inválido",
            Self::Unvalidated => "Sin validar",
        }
    }
}

// ============================================================================
// DeliveryState (local copy to avoid cross-crate dependency)
// ============================================================================

/// Final delivery state of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// The element reached the platform.
    Delivered,
    /// Delivery was attempted and failed.
    Failed,
    /// Delivery was never attempted.
    #[default]
    Skipped,
}

impl DeliveryState {
    /// Status glyph used in the CSV inventory.
    #[must_use]
    pub const fn glyph(&self) -> &'static str {
        match self {
            Self::Delivered => "✅",
            Self::Failed => "❌",
            Self::Skipped => "⏭",
        }
    }

    /// Spanish label used in the artifacts.
    #[must_use]
    pub const fn label_es(&self) -> &'static str {
        match self {
            Self::Delivered => "Entregado",
            Self::Failed => "Fallido",
            Self::Skipped => "Omitido",
        }
    }
}

// ============================================================================
// ElementRow
// ============================================================================

/// One element's final state as reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElementRow {
    /// Unit number (1-based).
    pub unit: u32,

    /// Theme number within the unit (1-based).
    pub theme: u32,

    /// Position of the element kind within its theme (1-based).
    pub kind_order: u32,

    /// Spanish label of the element kind.
    pub kind_label: String,

    /// Title of the theme the element belongs to.
    pub theme_title: String,

    /// Element title.
    pub title: String,

    /// Visible word count of the body.
    pub words: usize,

    /// Validation outcome.
    pub validation: ValidationState,

    /// Hard validation findings.
    pub errors: Vec<String>,

    /// Soft validation findings.
    pub warnings: Vec<String>,

    /// Delivery outcome.
    pub delivery: DeliveryState,

    /// Platform id assigned on delivery.
    pub remote_id: Option<String>,

    /// Number of delivery retries spent.
    pub retries: u32,

    /// Final delivery error, for failed elements.
    pub delivery_error: Option<String>,

    /// When the delivery outcome was recorded.
    pub delivered_at: Option<DateTime<Utc>>,

    /// Measured per-kind metrics as free-form JSON.
    pub metrics: serde_json::Value,
}

impl ElementRow {
    /// Theme code in `unit.theme` form.
    #[must_use]
    pub fn theme_code(&self) -> String {
        format!("{}.{}", self.unit, self.theme)
    }
}

// ============================================================================
// CourseDescriptor
// ============================================================================

/// Course metadata carried into every artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDescriptor {
    /// Course title.
    pub title: String,
    /// Course code.
    pub code: String,
    /// Knowledge area.
    pub area: String,
    /// Academic level.
    pub level: String,
    /// Content language tag.
    pub language: String,
    /// Estimated total duration in hours.
    pub duration_hours: f64,
    /// Intended audience.
    pub audience: String,
}

impl Default for CourseDescriptor {
    fn default() -> Self {
        Self {
            title: String::new(),
            code: String::new(),
            area: String::new(),
            level: String::new(),
            language: "es".to_string(),
            duration_hours: 0.0,
            audience: String::new(),
        }
    }
}

// ============================================================================
// ReportInput
// ============================================================================

/// Raw run data handed over by the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    /// Course metadata.
    pub course: CourseDescriptor,

    /// Execution mode name.
    pub mode: String,

    /// Shareable course URL, when the course container was created.
    pub course_url: Option<String>,

    /// Whether the run aborted before completing.
    pub aborted: bool,

    /// Why the run aborted, when it did.
    pub abort_reason: Option<String>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished or aborted.
    pub finished_at: DateTime<Utc>,

    /// Per-element rows, in any order.
    pub elements: Vec<ElementRow>,
}

impl Default for ReportInput {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            course: CourseDescriptor::default(),
            mode: String::new(),
            course_url: None,
            aborted: false,
            abort_reason: None,
            started_at: now,
            finished_at: now,
            elements: Vec::new(),
        }
    }
}

// ============================================================================
// RunSummary
// ============================================================================

/// Aggregate counts over the reported elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total number of elements.
    pub total: usize,
    /// Elements that passed validation.
    pub valid: usize,
    /// Elements that failed validation.
    pub invalid: usize,
    /// Elements never validated.
    pub unvalidated: usize,
    /// Elements delivered to the platform.
    pub delivered: usize,
    /// Elements whose delivery failed.
    pub failed: usize,
    /// Elements whose delivery was never attempted.
    pub skipped: usize,
    /// Share of validated elements that passed, in percent.
    pub valid_pct: f64,
    /// Share of all elements that were delivered, in percent.
    pub delivered_pct: f64,
}

impl RunSummary {
    fn tally(rows: &[ElementRow]) -> Self {
        let mut summary = Self {
            total: rows.len(),
            ..Self::default()
        };
        for row in rows {
            match row.validation {
                ValidationState::Valid => summary.valid += 1,
                ValidationState::Invalid => summary.invalid += 1,
                ValidationState::Unvalidated => summary.unvalidated += 1,
            }
            match row.delivery {
                DeliveryState::Delivered => summary.delivered += 1,
                DeliveryState::Failed => summary.failed += 1,
                DeliveryState::Skipped => summary.skipped += 1,
            }
        }
        let validated = summary.valid + summary.invalid;
        summary.valid_pct = percentage(summary.valid, validated);
        summary.delivered_pct = percentage(summary.delivered, summary.total);
        summary
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        {
            part as f64 / whole as f64 * 100.0
        }
    }
}

// ============================================================================
// CourseRunReport
// ============================================================================

/// The assembled run report: sorted rows plus aggregate tallies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRunReport {
    /// Course metadata.
    pub course: CourseDescriptor,

    /// Execution mode name.
    pub mode: String,

    /// Shareable course URL, when the course container was created.
    pub course_url: Option<String>,

    /// Whether the run aborted before completing.
    pub aborted: bool,

    /// Why the run aborted, when it did.
    pub abort_reason: Option<String>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run finished or aborted.
    pub finished_at: DateTime<Utc>,

    /// Aggregate counts.
    pub summary: RunSummary,

    /// Per-element rows in taxonomy order.
    pub rows: Vec<ElementRow>,
}

impl CourseRunReport {
    /// Assembles a report from raw pipeline data: sorts the rows into
    /// taxonomy order and computes the aggregate summary.
    #[must_use]
    pub fn assemble(input: ReportInput) -> Self {
        let mut rows = input.elements;
        rows.sort_by_key(|r| (r.unit, r.theme, r.kind_order));
        let summary = RunSummary::tally(&rows);
        Self {
            course: input.course,
            mode: input.mode,
            course_url: input.course_url,
            aborted: input.aborted,
            abort_reason: input.abort_reason,
            started_at: input.started_at,
            finished_at: input.finished_at,
            summary,
            rows,
        }
    }

    /// Run duration in whole seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }

    /// Writes the three artifacts into `dir`, creating it if needed.
    /// Returns the paths written.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Io` if the directory or a file cannot be
    /// written, `ReportError::Serialization` if the snapshot cannot be
    /// serialized.
    pub fn write_artifacts(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)?;

        let inventory = dir.join(INVENTORY_FILE);
        std::fs::write(&inventory, inventory::CsvGenerator::new(self).generate())?;

        let structure = dir.join(SNAPSHOT_FILE);
        std::fs::write(
            &structure,
            snapshot::JsonGenerator::new(self).generate_pretty()?,
        )?;

        let text = dir.join(SUMMARY_FILE);
        std::fs::write(&text, summary::SummaryGenerator::new(self).generate())?;

        Ok(vec![inventory, structure, text])
    }
}

// ============================================================================
// Tests
// ============================================================================
