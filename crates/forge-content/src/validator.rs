//! Content validation against the per-kind specifications.
//!
//! Validation is pure and stateless: the same instance, spec, and theme code
//! always produce the same [`ValidationResult`], with errors and warnings in
//! a stable order. Checks run in a fixed sequence: word band, required
//! sections, concept range, then kind-specific checks.

use serde::{Deserialize, Serialize};

use crate::model::{ElementInstance, ElementKind};
use crate::spec::{ElementSpec, KindChecks, SubItemRange};

// ============================================================================
// ValidationResult
// ============================================================================

/// Outcome of validating one element instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` when no hard errors were found. Warnings alone do not
    /// invalidate an element.
    pub valid: bool,

    /// Hard violations, in check order.
    pub errors: Vec<String>,

    /// Advisory findings, in check order.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// A passing result with no findings.
    #[must_use]
    pub const fn passing() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

// ============================================================================
// validate
// ============================================================================

/// Validates `instance` against `spec`, labelling findings with the theme
/// `code` (e.g. `"2.3"`).
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use forge_content::{
///     validate, ElementInstance, ElementKind, ElementMetrics, GenerationSource,
///     Provenance, SpecTable,
/// };
///
/// let table = SpecTable::standard();
/// let instance = ElementInstance {
///     kind: ElementKind::Narrative,
///     title: "Narrativa".to_string(),
///     body: String::new(),
///     metrics: ElementMetrics {
///         words: 1820,
///         concepts: Some(4),
///         character: Some("Elena Martínez".to_string()),
///         ..Default::default()
///     },
///     provenance: Provenance { source: GenerationSource::Template, attempts: 1 },
///     created_at: Utc::now(),
/// };
/// let result = validate(&instance, table.get(ElementKind::Narrative), "1.1");
/// assert!(result.valid);
/// ```
#[must_use]
pub fn validate(instance: &ElementInstance, spec: &ElementSpec, code: &str) -> ValidationResult {
    let kind = spec.kind;
    let metrics = &instance.metrics;
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // 1. Word band
    if let Some(band) = spec.word_band {
        if !band.contains(metrics.words) {
            errors.push(format!(
                "{kind} {code}: word count {} outside {} ±{} (delta {:+})",
                metrics.words,
                band.target,
                band.tolerance,
                band.delta(metrics.words)
            ));
        }
    }

    // 2. Required sections, present and in relative order
    let mut last_pos = 0usize;
    for section in &spec.required_sections {
        match instance.body.find(section) {
            None => errors.push(format!(
                "{kind} {code}: required section '{section}' not found"
            )),
            Some(pos) => {
                if pos < last_pos {
                    errors.push(format!("{kind} {code}: section '{section}' out of order"));
                }
                last_pos = last_pos.max(pos);
            }
        }
    }

    // 3. Concept integration range
    if let Some(range) = spec.concepts {
        let count = metrics.concepts.unwrap_or(0);
        check_range(kind, code, "concept", count, range, &mut errors, &mut warnings);
    }

    // 4. Kind-specific checks
    match &spec.checks {
        KindChecks::Narrative { min_character_len } => {
            let ok = metrics
                .character
                .as_ref()
                .is_some_and(|c| c.chars().count() >= *min_character_len);
            if !ok {
                errors.push(format!(
                    "{kind} {code}: missing or too-short character name"
                ));
            }
        }
        KindChecks::AcademicText { min_references } => {
            let refs = metrics.references.unwrap_or(0);
            if refs < *min_references {
                warnings.push(format!(
                    "{kind} {code}: {refs} references cited, at least {min_references} recommended"
                ));
            }
        }
        KindChecks::VideoScript {
            min_visuals,
            examples,
        } => {
            let visuals = metrics.visuals.unwrap_or(0);
            if visuals < *min_visuals {
                errors.push(format!(
                    "{kind} {code}: {visuals} visual cues, at least {min_visuals} required"
                ));
            }
            let example_count = metrics.examples.unwrap_or(0);
            if examples.below(example_count) {
                warnings.push(format!(
                    "{kind} {code}: {example_count} examples, {}-{} recommended",
                    examples.min, examples.max
                ));
            }
        }
        KindChecks::Infographic {
            panels,
            min_width,
            min_height,
        } => {
            let count = metrics.panels.unwrap_or(0);
            check_range(kind, code, "panel", count, *panels, &mut errors, &mut warnings);
            let width = metrics.width_px.unwrap_or(0);
            let height = metrics.height_px.unwrap_or(0);
            if width < *min_width || height < *min_height {
                errors.push(format!(
                    "{kind} {code}: dimensions {width}x{height} below minimum {min_width}x{min_height}"
                ));
            }
        }
        KindChecks::Activity {
            rubric,
            duration_minutes,
            min_deliverables,
            min_success_criteria,
        } => {
            let criteria = metrics.rubric_criteria.unwrap_or(0);
            check_range(
                kind,
                code,
                "rubric criterion",
                criteria,
                *rubric,
                &mut errors,
                &mut warnings,
            );
            let duration = metrics.duration_minutes.unwrap_or(0);
            if duration != *duration_minutes {
                errors.push(format!(
                    "{kind} {code}: duration {duration} minutes, expected exactly {duration_minutes}"
                ));
            }
            let deliverables = metrics.deliverables.unwrap_or(0);
            if deliverables < *min_deliverables {
                errors.push(format!(
                    "{kind} {code}: {deliverables} deliverables, at least {min_deliverables} required"
                ));
            }
            let success = metrics.success_criteria.unwrap_or(0);
            if success < *min_success_criteria {
                warnings.push(format!(
                    "{kind} {code}: {success} success criteria, at least {min_success_criteria} recommended"
                ));
            }
        }
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Shared below-range-error / above-range-warning rule for sub-item counts.
fn check_range(
    kind: ElementKind,
    code: &str,
    label: &str,
    count: usize,
    range: SubItemRange,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    if range.below(count) {
        errors.push(format!(
            "{kind} {code}: {label} count {count} below minimum {}",
            range.min
        ));
    } else if range.above(count) {
        warnings.push(format!(
            "{kind} {code}: {label} count {count} above recommended maximum {}",
            range.max
        ));
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{ElementMetrics, GenerationSource, Provenance};
    use crate::spec::SpecTable;
    use chrono::Utc;

    fn instance(kind: ElementKind, body: &str, metrics: ElementMetrics) -> ElementInstance {
        ElementInstance {
            kind,
            title: format!("{kind} de prueba"),
            body: body.to_string(),
            metrics,
            provenance: Provenance {
                source: GenerationSource::Template,
                attempts: 1,
            },
            created_at: Utc::now(),
        }
    }

    fn narrative_metrics(words: usize) -> ElementMetrics {
        ElementMetrics {
            words,
            concepts: Some(4),
            character: Some("Elena Martínez".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_word_count_inside_band_passes() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::Narrative);
        for words in [1750, 1800, 1850] {
            let result = validate(&instance(spec.kind, "", narrative_metrics(words)), spec, "1.1");
            assert!(result.valid, "{words} words: {:?}", result.errors);
        }
    }

    #[test]
    fn test_word_count_outside_band_names_delta() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::Narrative);

        let result = validate(&instance(spec.kind, "", narrative_metrics(1700)), spec, "1.1");
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(
            result.errors[0],
            "narrative 1.1: word count 1700 outside 1800 ±50 (delta -100)"
        );

        let result = validate(&instance(spec.kind, "", narrative_metrics(1875)), spec, "1.1");
        assert_eq!(
            result.errors[0],
            "narrative 1.1: word count 1875 outside 1800 ±50 (delta +75)"
        );
    }

    #[test]
    fn test_validation_is_deterministic() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::Narrative);
        let inst = instance(spec.kind, "", narrative_metrics(1600));
        assert_eq!(validate(&inst, spec, "1.1"), validate(&inst, spec, "1.1"));
    }

    #[test]
    fn test_missing_section_reported_per_section() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::AcademicText);
        let metrics = ElementMetrics {
            words: 1900,
            concepts: Some(4),
            references: Some(3),
            ..Default::default()
        };

        let body = "## Tema\n\n### Introducción\n\ntexto";
        let result = validate(&instance(spec.kind, body, metrics.clone()), spec, "2.1");
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("'Conclusión' not found"));

        let result = validate(&instance(spec.kind, "", metrics), spec, "2.1");
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_sections_out_of_order() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::AcademicText);
        let metrics = ElementMetrics {
            words: 1900,
            concepts: Some(4),
            references: Some(3),
            ..Default::default()
        };
        let body = "### Conclusión\n\n### Introducción";
        let result = validate(&instance(spec.kind, body, metrics), spec, "2.1");
        assert!(!result.valid);
        assert!(result.errors[0].contains("'Conclusión' out of order"));
    }

    #[test]
    fn test_concepts_below_range_is_error_above_is_warning() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::Narrative);

        let mut metrics = narrative_metrics(1800);
        metrics.concepts = Some(2);
        let result = validate(&instance(spec.kind, "", metrics), spec, "1.2");
        assert!(!result.valid);
        assert!(result.errors[0].contains("concept count 2 below minimum 3"));

        let mut metrics = narrative_metrics(1800);
        metrics.concepts = Some(6);
        let result = validate(&instance(spec.kind, "", metrics), spec, "1.2");
        assert!(result.valid);
        assert!(result.warnings[0].contains("above recommended maximum 5"));
    }

    #[test]
    fn test_narrative_character_required() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::Narrative);
        let mut metrics = narrative_metrics(1800);
        metrics.character = Some("EM".to_string());
        let result = validate(&instance(spec.kind, "", metrics), spec, "1.3");
        assert!(!result.valid);
        assert!(result.errors[0].contains("character name"));
    }

    #[test]
    fn test_academic_references_warning_only() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::AcademicText);
        let metrics = ElementMetrics {
            words: 1900,
            concepts: Some(4),
            references: Some(1),
            ..Default::default()
        };
        let body = "### Introducción ... ### Conclusión";
        let result = validate(&instance(spec.kind, body, metrics), spec, "2.2");
        assert!(result.valid);
        assert!(result.warnings[0].contains("1 references cited"));
    }

    #[test]
    fn test_video_visuals_required_examples_recommended() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::VideoScript);
        let body = "[NARRACIÓN]: hola [VISUAL]: pantalla";
        let metrics = ElementMetrics {
            words: 950,
            concepts: Some(3),
            visuals: Some(1),
            examples: Some(1),
            ..Default::default()
        };
        let result = validate(&instance(spec.kind, body, metrics), spec, "3.3");
        assert!(!result.valid);
        assert!(result.errors[0].contains("1 visual cues, at least 2 required"));
        assert!(result.warnings[0].contains("1 examples, 2-3 recommended"));
    }

    #[test]
    fn test_infographic_dimensions_and_panels() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::Infographic);

        let good = ElementMetrics {
            panels: Some(5),
            width_px: Some(1200),
            height_px: Some(900),
            ..Default::default()
        };
        assert!(validate(&instance(spec.kind, "", good), spec, "4.1").valid);

        let small = ElementMetrics {
            panels: Some(3),
            width_px: Some(1200),
            height_px: Some(800),
            ..Default::default()
        };
        let result = validate(&instance(spec.kind, "", small), spec, "4.1");
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("panel count 3 below minimum 4"));
        assert!(result.errors[1].contains("1200x800 below minimum 1200x900"));
    }

    #[test]
    fn test_activity_duration_exact() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::Activity);
        let body = "### Objetivo\n### Instrucciones\n### Rúbrica\n### Entregables";
        let metrics = ElementMetrics {
            rubric_criteria: Some(5),
            duration_minutes: Some(45),
            deliverables: Some(3),
            success_criteria: Some(5),
            ..Default::default()
        };
        let result = validate(&instance(spec.kind, body, metrics), spec, "5.1");
        assert!(!result.valid);
        assert_eq!(
            result.errors[0],
            "activity 5.1: duration 45 minutes, expected exactly 60"
        );
    }

    #[test]
    fn test_activity_success_criteria_warning() {
        let table = SpecTable::standard();
        let spec = table.get(ElementKind::Activity);
        let body = "### Objetivo\n### Instrucciones\n### Rúbrica\n### Entregables";
        let metrics = ElementMetrics {
            rubric_criteria: Some(4),
            duration_minutes: Some(60),
            deliverables: Some(2),
            success_criteria: Some(2),
            ..Default::default()
        };
        let result = validate(&instance(spec.kind, body, metrics), spec, "5.2");
        assert!(result.valid);
        assert!(result.warnings[0].contains("2 success criteria"));
    }
}
