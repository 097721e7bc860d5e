//! Keyed append-only run log.
//!
//! Each of the 75 course elements gets one record, keyed by its
//! unit/theme/kind coordinate. Phases enrich the record in place
//! (generation fills it, validation and delivery annotate it) but records
//! are never removed, so the report phase always sees the complete set
//! regardless of where the run stopped.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use forge_content::{ElementInstance, ElementKey, ElementMetrics, Provenance, ValidationResult};
use forge_delivery::DeliveryOutcome;
use serde::Serialize;

// ============================================================================
// ElementRecord
// ============================================================================

/// One element's full history across the run.
#[derive(Debug, Clone, Serialize)]
pub struct ElementRecord {
    /// Taxonomy coordinate of the element.
    pub key: ElementKey,

    /// Element title.
    pub title: String,

    /// Visible word count of the generated body.
    pub words: usize,

    /// Measured per-kind metrics.
    pub metrics: ElementMetrics,

    /// How the body was produced.
    pub provenance: Provenance,

    /// When generation finished.
    pub generated_at: DateTime<Utc>,

    /// Validation findings, absent when validation was skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,

    /// Delivery outcome, absent until the element reached delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<DeliveryOutcome>,
}

// ============================================================================
// RunLog
// ============================================================================

/// Append-only log of every element in a run.
#[derive(Debug, Default)]
pub struct RunLog {
    records: HashMap<ElementKey, ElementRecord>,
    bodies: HashMap<ElementKey, String>,
}

impl RunLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no elements have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records a freshly generated element. Replaces any earlier record
    /// under the same key.
    pub fn insert_generated(&mut self, key: ElementKey, instance: ElementInstance) {
        let record = ElementRecord {
            key,
            title: instance.title,
            words: instance.metrics.words,
            metrics: instance.metrics,
            provenance: instance.provenance,
            generated_at: instance.created_at,
            validation: None,
            outcome: None,
        };
        self.bodies.insert(key, instance.body);
        self.records.insert(key, record);
    }

    /// Attaches validation findings to an element. Ignored for unknown keys.
    pub fn record_validation(&mut self, key: &ElementKey, result: ValidationResult) {
        if let Some(record) = self.records.get_mut(key) {
            record.validation = Some(result);
        }
    }

    /// Attaches a delivery outcome to an element. Ignored for unknown keys.
    pub fn record_outcome(&mut self, key: &ElementKey, outcome: DeliveryOutcome) {
        if let Some(record) = self.records.get_mut(key) {
            record.outcome = Some(outcome);
        }
    }

    /// Looks up one element's record.
    #[must_use]
    pub fn get(&self, key: &ElementKey) -> Option<&ElementRecord> {
        self.records.get(key)
    }

    /// The generated body for an element.
    #[must_use]
    pub fn body(&self, key: &ElementKey) -> Option<&str> {
        self.bodies.get(key).map(String::as_str)
    }

    /// All records in taxonomy order: unit, then theme, then element kind.
    #[must_use]
    pub fn sorted_records(&self) -> Vec<&ElementRecord> {
        let mut records: Vec<&ElementRecord> = self.records.values().collect();
        records.sort_by_key(|r| r.key);
        records
    }
}

// ============================================================================
// Tests
// ============================================================================
