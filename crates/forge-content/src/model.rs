//! Core course model types.
//!
//! This module defines the course taxonomy (course, units, themes) and the
//! per-element types produced by generation: instances, measured metrics,
//! and provenance. The taxonomy is fixed before any content is generated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of units in a standard course.
pub const UNITS_PER_COURSE: usize = 5;

/// Number of themes in each unit.
pub const THEMES_PER_UNIT: usize = 3;

/// Number of content elements produced for each theme (one per kind).
pub const ELEMENTS_PER_THEME: usize = 5;

// ============================================================================
// ElementKind
// ============================================================================

/// The five content element kinds produced for every theme.
///
/// The declaration order is the canonical kind order: report rows for a theme
/// always list its elements in this order, and [`ElementKey`] ordering relies
/// on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Pedagogical narrative with a protagonist and a three-act arc.
    Narrative,
    /// Formal academic text with ordered sections and cited references.
    AcademicText,
    /// Timed video script alternating narration and visual cues.
    VideoScript,
    /// Multi-panel infographic description with pixel dimensions.
    Infographic,
    /// Practical activity with instructions, rubric, and deliverables.
    Activity,
}

impl ElementKind {
    /// All kinds in canonical order.
    pub const ALL: [Self; ELEMENTS_PER_THEME] = [
        Self::Narrative,
        Self::AcademicText,
        Self::VideoScript,
        Self::Infographic,
        Self::Activity,
    ];

    /// Position of this kind in canonical order (0-based).
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_content::ElementKind;
    ///
    /// assert_eq!(ElementKind::Narrative.order_index(), 0);
    /// assert_eq!(ElementKind::Activity.order_index(), 4);
    /// ```
    #[must_use]
    pub const fn order_index(&self) -> usize {
        match self {
            Self::Narrative => 0,
            Self::AcademicText => 1,
            Self::VideoScript => 2,
            Self::Infographic => 3,
            Self::Activity => 4,
        }
    }

    /// Spanish display label, used in the CSV inventory.
    #[must_use]
    pub const fn label_es(&self) -> &'static str {
        match self {
            Self::Narrative => "Narrativa",
            Self::AcademicText => "Texto Académico",
            Self::VideoScript => "Guion de Video",
            Self::Infographic => "Infografía",
            Self::Activity => "Actividad Práctica",
        }
    }

    /// Identifier used in delivery block payloads and simulated remote ids.
    #[must_use]
    pub const fn block_type(&self) -> &'static str {
        match self {
            Self::Narrative => "narrative",
            Self::AcademicText => "academic_text",
            Self::VideoScript => "video_script",
            Self::Infographic => "infographic",
            Self::Activity => "activity",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Narrative => "narrative",
            Self::AcademicText => "academic text",
            Self::VideoScript => "video script",
            Self::Infographic => "infographic",
            Self::Activity => "activity",
        };
        f.write_str(name)
    }
}

// ============================================================================
// ElementKey
// ============================================================================

/// Stable identity of one element slot in the taxonomy.
///
/// Keys order by `(unit, theme, kind)`, which is taxonomy order: the order
/// report rows appear in regardless of the order work completed.
///
/// # Examples
///
/// ```
/// use forge_content::{ElementKey, ElementKind};
///
/// let a = ElementKey::new(1, 2, ElementKind::Activity);
/// let b = ElementKey::new(1, 3, ElementKind::Narrative);
/// assert!(a < b);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ElementKey {
    /// Unit number (1-based).
    pub unit: u32,
    /// Theme number within the unit (1-based).
    pub theme: u32,
    /// Element kind within the theme.
    pub kind: ElementKind,
}

impl ElementKey {
    /// Creates a new key.
    #[must_use]
    pub const fn new(unit: u32, theme: u32, kind: ElementKind) -> Self {
        Self { unit, theme, kind }
    }

    /// Theme code in `unit.theme` form, e.g. `"2.3"`.
    #[must_use]
    pub fn theme_code(&self) -> String {
        format!("{}.{}", self.unit, self.theme)
    }
}

impl std::fmt::Display for ElementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}/{}", self.unit, self.theme, self.kind.block_type())
    }
}

// ============================================================================
// Taxonomy: Concept, Theme, Unit, CourseInfo, CourseTree
// ============================================================================

/// A key concept attached to a theme, used to seed generation and to check
/// concept integration during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// Concept term as it should appear in generated content.
    pub term: String,

    /// One-sentence definition.
    pub definition: String,
}

impl Concept {
    /// Creates a new concept.
    #[must_use]
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

/// A theme inside a unit. Each theme owns exactly one element slot per
/// [`ElementKind`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// Unit number this theme belongs to (1-based).
    pub unit_number: u32,

    /// Theme number within the unit (1-based).
    pub theme_number: u32,

    /// Theme code, e.g. `"3.2"`.
    pub code: String,

    /// Theme title.
    pub title: String,

    /// Concept terms to integrate into this theme's content.
    pub concepts: Vec<Concept>,
}

impl Theme {
    /// Creates a theme, deriving the code from unit and theme numbers.
    #[must_use]
    pub fn new(
        unit_number: u32,
        theme_number: u32,
        title: impl Into<String>,
        concepts: Vec<Concept>,
    ) -> Self {
        Self {
            unit_number,
            theme_number,
            code: format!("{unit_number}.{theme_number}"),
            title: title.into(),
            concepts,
        }
    }

    /// The concept terms, in declaration order.
    #[must_use]
    pub fn concept_terms(&self) -> Vec<&str> {
        self.concepts.iter().map(|c| c.term.as_str()).collect()
    }

    /// The key for one of this theme's element slots.
    #[must_use]
    pub const fn key(&self, kind: ElementKind) -> ElementKey {
        ElementKey::new(self.unit_number, self.theme_number, kind)
    }
}

/// A course unit containing themes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// Unit number (1-based).
    pub unit_number: u32,

    /// Unit title.
    pub title: String,

    /// Themes in this unit, in order.
    pub themes: Vec<Theme>,
}

/// Course-level metadata carried through to reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInfo {
    /// Course display name.
    pub name: String,
    /// Institutional course code.
    pub code: String,
    /// Knowledge area.
    pub area: String,
    /// Academic level.
    pub level: String,
    /// Content language (BCP 47 primary tag).
    pub language: String,
    /// Total course duration in hours.
    pub duration_hours: f64,
    /// Intended audience.
    pub target_audience: String,
}

impl Default for CourseInfo {
    fn default() -> Self {
        Self {
            name: "Creación de Cursos Virtuales con IA para Profesores Universitarios"
                .to_string(),
            code: "EDUTEC-CVIA-001".to_string(),
            area: "Educación y Tecnología Educativa".to_string(),
            level: "Master/Especialización (EQF Nivel 7)".to_string(),
            language: "es".to_string(),
            duration_hours: 112.5,
            target_audience: "Docentes Universitarios (mínimo 1 año experiencia)".to_string(),
        }
    }
}

/// The complete course taxonomy, fixed before generation starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseTree {
    /// Course metadata.
    pub info: CourseInfo,

    /// Units in order.
    pub units: Vec<Unit>,
}

impl CourseTree {
    /// Total number of themes across all units.
    #[must_use]
    pub fn theme_count(&self) -> usize {
        self.units.iter().map(|u| u.themes.len()).sum()
    }

    /// Total number of element slots (themes × kinds).
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.theme_count() * ELEMENTS_PER_THEME
    }

    /// Iterates over all themes in taxonomy order.
    pub fn themes(&self) -> impl Iterator<Item = &Theme> {
        self.units.iter().flat_map(|u| u.themes.iter())
    }

    /// Iterates over all element keys in taxonomy order.
    pub fn element_keys(&self) -> impl Iterator<Item = ElementKey> + '_ {
        self.themes()
            .flat_map(|t| ElementKind::ALL.into_iter().map(|k| t.key(k)))
    }

    /// Checks the taxonomy has the expected fixed shape.
    ///
    /// Returns a description of the first deviation found, or `Ok(())`.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.units.len() != UNITS_PER_COURSE {
            return Err(format!(
                "expected {UNITS_PER_COURSE} units, found {}",
                self.units.len()
            ));
        }
        for unit in &self.units {
            if unit.themes.len() != THEMES_PER_UNIT {
                return Err(format!(
                    "unit {} has {} themes, expected {THEMES_PER_UNIT}",
                    unit.unit_number,
                    unit.themes.len()
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// ElementMetrics
// ============================================================================

/// Measurements taken from a generated element, consumed by the validator
/// and echoed into the structural report snapshot.
///
/// Only the fields meaningful for the element's kind are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMetrics {
    /// Word count of the body, markup stripped.
    pub words: usize,

    /// Concepts integrated into the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concepts: Option<usize>,

    /// Concrete examples given (video scripts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub examples: Option<usize>,

    /// Visual cues (video scripts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visuals: Option<usize>,

    /// References cited (academic texts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<usize>,

    /// Panels (infographics).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panels: Option<usize>,

    /// Render width in pixels (infographics).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_px: Option<u32>,

    /// Render height in pixels (infographics).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_px: Option<u32>,

    /// Rubric criteria (activities).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubric_criteria: Option<usize>,

    /// Expected deliverables (activities).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliverables: Option<usize>,

    /// Success criteria (activities).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_criteria: Option<usize>,

    /// Estimated duration in minutes (activities).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,

    /// Protagonist name (narratives).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character: Option<String>,
}

// ============================================================================
// Provenance
// ============================================================================

/// How an element's content was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSource {
    /// Produced by the configured text backend.
    Ai,
    /// Produced by the deterministic template path.
    Template,
}

/// Provenance of an element instance: which path produced it and how many
/// generation attempts were consumed before it was accepted (or given up on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Generation path that produced the accepted body.
    pub source: GenerationSource,

    /// Attempts consumed, including the accepted one (1-based).
    pub attempts: u32,
}

// ============================================================================
// ElementInstance
// ============================================================================

/// One generated content element.
///
/// Instances are immutable: regeneration replaces the whole instance rather
/// than mutating it in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementInstance {
    /// Element kind.
    pub kind: ElementKind,

    /// Element title.
    pub title: String,

    /// Body text (markdown-ish, with kind-specific markers).
    pub body: String,

    /// Measurements taken from the body at generation time.
    pub metrics: ElementMetrics,

    /// Generation provenance.
    pub provenance: Provenance,

    /// When this instance was created.
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Tests
// ============================================================================
