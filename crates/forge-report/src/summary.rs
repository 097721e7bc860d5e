//! Text summary generation.
//!
//! This module provides [`SummaryGenerator`] for rendering the
//! human-readable summary artifact: course metadata, run outcome, aggregate
//! counts, and a per-unit delivery breakdown.
//!
//! # Example
//!
//! ```rust
//! use forge_report::{CourseRunReport, ReportInput};
//! use forge_report::summary::SummaryGenerator;
//!
//! let report = CourseRunReport::assemble(ReportInput::default());
//! let text = SummaryGenerator::new(&report).generate();
//! assert!(text.contains("RESUMEN DE GENERACIÓN DE CURSO"));
//! ```

use std::fmt::Write as _;

use crate::{CourseRunReport, DeliveryState};

const BANNER: &str =
    "================================================================================";
const RULE: &str =
    "--------------------------------------------------------------------------------";

/// Text summary generator.
///
/// Wraps a [`CourseRunReport`] reference and renders it as plain text.
pub struct SummaryGenerator<'a> {
    report: &'a CourseRunReport,
}

impl<'a> SummaryGenerator<'a> {
    /// Creates a new summary generator for the given report.
    #[must_use]
    pub const fn new(report: &'a CourseRunReport) -> Self {
        Self { report }
    }

    /// Renders the summary artifact.
    #[must_use]
    pub fn generate(&self) -> String {
        let report = self.report;
        let summary = &report.summary;
        let mut out = String::new();

        let _ = writeln!(out, "{BANNER}");
        let _ = writeln!(out, "  RESUMEN DE GENERACIÓN DE CURSO");
        let _ = writeln!(out, "{BANNER}");
        let _ = writeln!(out);
        let _ = writeln!(out, "Curso:     {}", report.course.title);
        let _ = writeln!(out, "Código:    {}", report.course.code);
        let _ = writeln!(out, "Área:      {}", report.course.area);
        let _ = writeln!(out, "Nivel:     {}", report.course.level);
        let _ = writeln!(out, "Idioma:    {}", report.course.language);
        let _ = writeln!(out, "Duración:  {} horas", report.course.duration_hours);
        let _ = writeln!(out, "Audiencia: {}", report.course.audience);
        let _ = writeln!(out);
        let _ = writeln!(out, "Modo:      {}", report.mode);
        let _ = writeln!(
            out,
            "Inicio:    {}",
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            out,
            "Fin:       {}",
            report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            out,
            "Ejecución: {} segundos",
            report.duration_seconds()
        );

        if report.aborted {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "⚠ EJECUCIÓN ABORTADA: {}",
                report.abort_reason.as_deref().unwrap_or("motivo desconocido")
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "  ELEMENTOS");
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(out, "Totales:     {}", summary.total);
        let _ = writeln!(
            out,
            "Válidos:     {} ({:.1}%)",
            summary.valid, summary.valid_pct
        );
        let _ = writeln!(out, "Inválidos:   {}", summary.invalid);
        let _ = writeln!(out, "Sin validar: {}", summary.unvalidated);
        let _ = writeln!(
            out,
            "Entregados:  {} ({:.1}%)",
            summary.delivered, summary.delivered_pct
        );
        let _ = writeln!(out, "Fallidos:    {}", summary.failed);
        let _ = writeln!(out, "Omitidos:    {}", summary.skipped);

        let breakdown = self.unit_breakdown();
        if !breakdown.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "Desglose por unidad:");
            for (unit, total, delivered) in breakdown {
                let _ = writeln!(
                    out,
                    "  Unidad {unit}: {total} elementos, {delivered} entregados"
                );
            }
        }

        if let Some(url) = &report.course_url {
            let _ = writeln!(out);
            let _ = writeln!(out, "URL del curso: {url}");
        }

        let _ = writeln!(out, "{BANNER}");
        out
    }

    /// Per-unit (unit, total, delivered) counts, in unit order.
    fn unit_breakdown(&self) -> Vec<(u32, usize, usize)> {
        let mut breakdown: Vec<(u32, usize, usize)> = Vec::new();
        for row in &self.report.rows {
            if breakdown.last().map_or(true, |(u, _, _)| *u != row.unit) {
                breakdown.push((row.unit, 0, 0));
            }
            if let Some((_, total, delivered)) = breakdown.last_mut() {
                *total += 1;
                if row.delivery == DeliveryState::Delivered {
                    *delivered += 1;
                }
            }
        }
        breakdown
    }
}

// ============================================================================
// Tests
// ============================================================================
