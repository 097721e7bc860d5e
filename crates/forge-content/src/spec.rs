//! Per-kind content specifications.
//!
//! Each [`ElementKind`] has an [`ElementSpec`] describing what an acceptable
//! element looks like: an optional word band, required sections in order,
//! a concept integration range, and kind-specific checks. The
//! [`SpecTable`] holds the standard specification for every kind.

use serde::{Deserialize, Serialize};

use crate::model::ElementKind;

// ============================================================================
// WordBand
// ============================================================================

/// A word-count acceptance band: `target ± tolerance`.
///
/// # Examples
///
/// ```
/// use forge_content::WordBand;
///
/// let band = WordBand::new(1800, 50);
/// assert!(band.contains(1750));
/// assert!(band.contains(1850));
/// assert!(!band.contains(1749));
/// assert_eq!(band.delta(1700), -100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBand {
    /// Target word count.
    pub target: usize,
    /// Allowed deviation in words, either direction.
    pub tolerance: usize,
}

impl WordBand {
    /// Creates a new band.
    #[must_use]
    pub const fn new(target: usize, tolerance: usize) -> Self {
        Self { target, tolerance }
    }

    /// Lowest acceptable count.
    #[must_use]
    pub const fn min(&self) -> usize {
        self.target.saturating_sub(self.tolerance)
    }

    /// Highest acceptable count.
    #[must_use]
    pub const fn max(&self) -> usize {
        self.target + self.tolerance
    }

    /// Returns `true` if `count` falls inside the band.
    #[must_use]
    pub const fn contains(&self, count: usize) -> bool {
        count >= self.min() && count <= self.max()
    }

    /// Signed distance from the target.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn delta(&self, count: usize) -> i64 {
        count as i64 - self.target as i64
    }
}

// ============================================================================
// SubItemRange
// ============================================================================

/// An inclusive count range for sub-items (concepts, panels, rubric rows).
///
/// Counts below the range are hard errors; counts above it are warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubItemRange {
    /// Minimum acceptable count.
    pub min: usize,
    /// Maximum recommended count.
    pub max: usize,
}

impl SubItemRange {
    /// Creates a new range.
    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `count` is below the minimum.
    #[must_use]
    pub const fn below(&self, count: usize) -> bool {
        count < self.min
    }

    /// Returns `true` if `count` is above the maximum.
    #[must_use]
    pub const fn above(&self, count: usize) -> bool {
        count > self.max
    }
}

// ============================================================================
// KindChecks
// ============================================================================

/// Checks specific to a single element kind, beyond word band, sections,
/// and concept range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindChecks {
    /// Narrative: a protagonist name of at least `min_character_len` chars.
    Narrative {
        /// Minimum protagonist name length.
        min_character_len: usize,
    },
    /// Academic text: at least `min_references` citations recommended.
    AcademicText {
        /// Recommended minimum reference count (warning below).
        min_references: usize,
    },
    /// Video script: visual cues required, concrete examples recommended.
    VideoScript {
        /// Required minimum visual cue count (error below).
        min_visuals: usize,
        /// Recommended example range (warning below minimum).
        examples: SubItemRange,
    },
    /// Infographic: panel range and minimum render dimensions.
    Infographic {
        /// Panel count range.
        panels: SubItemRange,
        /// Minimum render width in pixels.
        min_width: u32,
        /// Minimum render height in pixels.
        min_height: u32,
    },
    /// Activity: rubric depth, exact duration, deliverables, success criteria.
    Activity {
        /// Rubric criteria range.
        rubric: SubItemRange,
        /// Exact expected duration in minutes.
        duration_minutes: u32,
        /// Required minimum deliverable count (error below).
        min_deliverables: usize,
        /// Recommended minimum success criteria (warning below).
        min_success_criteria: usize,
    },
}

// ============================================================================
// ElementSpec and SpecTable
// ============================================================================

/// The full acceptance specification for one element kind.
///
/// Serialize-only: the section names are static borrows, and the table is
/// built in code rather than loaded from a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementSpec {
    /// The kind this spec applies to.
    pub kind: ElementKind,

    /// Word band, for kinds with a word-count requirement.
    pub word_band: Option<WordBand>,

    /// Sections that must appear in the body in this relative order.
    pub required_sections: Vec<&'static str>,

    /// Concept integration range, for kinds that integrate concepts.
    pub concepts: Option<SubItemRange>,

    /// Kind-specific checks.
    pub checks: KindChecks,
}

/// The standard specification table, one [`ElementSpec`] per kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecTable {
    specs: Vec<ElementSpec>,
}

impl SpecTable {
    /// The standard course content specification.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            specs: vec![
                ElementSpec {
                    kind: ElementKind::Narrative,
                    word_band: Some(WordBand::new(1800, 50)),
                    required_sections: Vec::new(),
                    concepts: Some(SubItemRange::new(3, 5)),
                    checks: KindChecks::Narrative {
                        min_character_len: 3,
                    },
                },
                ElementSpec {
                    kind: ElementKind::AcademicText,
                    word_band: Some(WordBand::new(1900, 50)),
                    required_sections: vec!["Introducción", "Conclusión"],
                    concepts: Some(SubItemRange::new(4, 5)),
                    checks: KindChecks::AcademicText { min_references: 3 },
                },
                ElementSpec {
                    kind: ElementKind::VideoScript,
                    word_band: Some(WordBand::new(950, 50)),
                    required_sections: vec!["[NARRACIÓN]", "[VISUAL]"],
                    concepts: Some(SubItemRange::new(2, 3)),
                    checks: KindChecks::VideoScript {
                        min_visuals: 2,
                        examples: SubItemRange::new(2, 3),
                    },
                },
                ElementSpec {
                    kind: ElementKind::Infographic,
                    word_band: None,
                    required_sections: Vec::new(),
                    concepts: None,
                    checks: KindChecks::Infographic {
                        panels: SubItemRange::new(4, 6),
                        min_width: 1200,
                        min_height: 900,
                    },
                },
                ElementSpec {
                    kind: ElementKind::Activity,
                    word_band: None,
                    required_sections: vec![
                        "Objetivo",
                        "Instrucciones",
                        "Rúbrica",
                        "Entregables",
                    ],
                    concepts: None,
                    checks: KindChecks::Activity {
                        rubric: SubItemRange::new(4, 5),
                        duration_minutes: 60,
                        min_deliverables: 1,
                        min_success_criteria: 3,
                    },
                },
            ],
        }
    }

    /// The spec for `kind`.
    ///
    /// The table always contains every kind, so this never fails.
    #[must_use]
    pub fn get(&self, kind: ElementKind) -> &ElementSpec {
        // standard() inserts specs in canonical kind order
        &self.specs[kind.order_index()]
    }

    /// All specs in canonical kind order.
    #[must_use]
    pub fn all(&self) -> &[ElementSpec] {
        &self.specs
    }
}

impl Default for SpecTable {
    fn default() -> Self {
        Self::standard()
    }
}

// ============================================================================
// Tests
// ============================================================================
