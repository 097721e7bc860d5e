//! courseforge content engine
//!
//! Course taxonomy, per-kind content specifications, content generation with
//! the regenerate-until-valid loop, and pure validation.

pub mod catalog;
pub mod generator;
pub mod model;
pub mod spec;
pub mod text;
pub mod validator;

pub use generator::{
    ContentGenerator, GenerateError, TextGenerator, DEFAULT_BACKEND_TIMEOUT, DEFAULT_MAX_ATTEMPTS,
};
pub use model::{
    Concept, CourseInfo, CourseTree, ElementInstance, ElementKey, ElementKind, ElementMetrics,
    GenerationSource, Provenance, Theme, Unit, ELEMENTS_PER_THEME, THEMES_PER_UNIT,
    UNITS_PER_COURSE,
};
pub use spec::{ElementSpec, KindChecks, SpecTable, SubItemRange, WordBand};
pub use validator::{validate, ValidationResult};
