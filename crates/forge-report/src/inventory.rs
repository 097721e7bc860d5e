//! CSV inventory generation.
//!
//! This module provides [`CsvGenerator`] for rendering the per-element
//! inventory artifact. One data row per element, in taxonomy order, with
//! Spanish column headers matching the snapshot and summary artifacts.
//!
//! # Example
//!
//! ```rust
//! use forge_report::{CourseRunReport, ReportInput};
//! use forge_report::inventory::CsvGenerator;
//!
//! let report = CourseRunReport::assemble(ReportInput::default());
//! let csv = CsvGenerator::new(&report).generate();
//! assert_eq!(csv.lines().count(), 1); // header only
//! ```

use crate::{CourseRunReport, ElementRow};

/// Column headers of the inventory artifact.
pub const HEADERS: [&str; 9] = [
    "Unidad",
    "Tema",
    "Tipo",
    "Título",
    "Estado",
    "Palabras",
    "ID Remoto",
    "Timestamp",
    "Errores",
];

/// CSV inventory generator.
///
/// Wraps a [`CourseRunReport`] reference and renders it as CSV text.
pub struct CsvGenerator<'a> {
    report: &'a CourseRunReport,
}

impl<'a> CsvGenerator<'a> {
    /// Creates a new CSV generator for the given report.
    #[must_use]
    pub const fn new(report: &'a CourseRunReport) -> Self {
        Self { report }
    }

    /// Renders the inventory: a header line plus one line per element.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut out = String::new();
        out.push_str(&HEADERS.join(","));
        out.push('\n');
        for row in &self.report.rows {
            out.push_str(&render_row(row));
            out.push('\n');
        }
        out
    }
}

fn render_row(row: &ElementRow) -> String {
    let estado = format!("{} {}", row.delivery.glyph(), row.delivery.label_es());
    let timestamp = row
        .delivered_at
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    let errores = row.errors.join("; ");

    let fields = [
        row.unit.to_string(),
        row.theme_code(),
        row.kind_label.clone(),
        row.title.clone(),
        estado,
        row.words.to_string(),
        row.remote_id.clone().unwrap_or_default(),
        timestamp,
        errores,
    ];
    fields
        .iter()
        .map(|f| csv_escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quotes a field when it contains a comma, quote, or newline, doubling
/// any embedded quotes.
fn csv_escape(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tests::row;
    use crate::{DeliveryState, ReportInput, ValidationState};

    #[test]
    fn test_header_line() {
        let report = CourseRunReport::assemble(ReportInput::default());
        let csv = CsvGenerator::new(&report).generate();
        assert_eq!(
            csv.trim_end(),
            "Unidad,Tema,Tipo,Título,Estado,Palabras,ID Remoto,Timestamp,Errores"
        );
    }

    #[test]
    fn test_one_line_per_element() {
        let input = ReportInput {
            elements: vec![
                row(1, 1, 1, ValidationState::Valid, DeliveryState::Delivered),
                row(1, 1, 2, ValidationState::Valid, DeliveryState::Failed),
                row(1, 2, 1, ValidationState::Invalid, DeliveryState::Skipped),
            ],
            ..ReportInput::default()
        };
        let report = CourseRunReport::assemble(input);
        let csv = CsvGenerator::new(&report).generate();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("✅ Entregado"));
        assert!(lines[2].contains("❌ Fallido"));
        assert!(lines[3].contains("⏭ Omitido"));
        assert!(lines[3].starts_with("1,1.2,"));
    }

    #[test]
    fn test_fields_with_commas_are_quoted() {
        let mut element = row(2, 3, 4, ValidationState::Invalid, DeliveryState::Skipped);
        element.title = "Infografía: Modelos, Métodos y Herramientas".to_string();
        element.errors = vec![
            "word count 1700 outside band".to_string(),
            "section 'Rúbrica' not found".to_string(),
        ];
        let report = CourseRunReport::assemble(ReportInput {
            elements: vec![element],
            ..ReportInput::default()
        });
        let csv = CsvGenerator::new(&report).generate();
        assert!(csv.contains("\"Infografía: Modelos, Métodos y Herramientas\""));
        assert!(csv.contains("word count 1700 outside band; section 'Rúbrica' not found"));
    }

    #[test]
    fn test_csv_escape_doubles_quotes() {
        assert_eq!(csv_escape("plain"), "plain");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hola\""), "\"say \"\"hola\"\"\"");
    }
}
