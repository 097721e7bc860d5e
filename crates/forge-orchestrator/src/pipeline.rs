//! The course assembly pipeline.
//!
//! Drives one run end to end through the phase state machine: shape check,
//! authentication, generation of all 75 elements, validation, rate-limited
//! delivery, and report assembly. Element-level failures are recorded in the
//! run log and never stop the run; fatal failures abort the state machine
//! but still produce the full set of report artifacts.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use forge_content::{
    validate, ContentGenerator, CourseTree, ElementKind, SpecTable, Theme,
};
use forge_delivery::{
    ContentBlock, Deliverer, DeliveryOutcome, DeliveryStatus, DeliveryTransport, RateLimiter,
    RetryPolicy,
};
use forge_report::{
    CourseDescriptor, CourseRunReport, DeliveryState, ElementRow, ReportInput, ValidationState,
};

use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::log::{ElementRecord, RunLog};
use crate::phase::RunState;

/// How many blocks of one lesson are delivered concurrently.
const BLOCK_CONCURRENCY: usize = 4;

// ============================================================================
// RunOutcome
// ============================================================================

/// Everything a completed (or aborted) run leaves behind.
#[derive(Debug)]
pub struct RunOutcome {
    /// Final state machine position.
    pub state: RunState,

    /// The assembled report.
    pub report: CourseRunReport,

    /// Paths of the written report artifacts.
    pub artifacts: Vec<PathBuf>,
}

impl RunOutcome {
    /// Returns `true` if the run completed without aborting.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        !self.state.is_aborted()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// The course assembly pipeline.
pub struct Pipeline {
    config: Config,
    generator: ContentGenerator,
    deliverer: Deliverer,
    specs: SpecTable,
}

impl Pipeline {
    /// Creates a pipeline over `transport`, wiring the deliverer's rate
    /// limit, retry policy, and timeouts from the configuration.
    #[must_use]
    pub fn new(
        config: Config,
        generator: ContentGenerator,
        transport: Arc<dyn DeliveryTransport>,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::per_minute(config.limits.requests_per_minute));
        let policy = RetryPolicy {
            max_attempts: config.limits.max_delivery_attempts,
            base_delay: Duration::from_secs(config.limits.retry_base_secs),
        };
        let deliverer = Deliverer::new(transport)
            .limiter(limiter)
            .policy(policy)
            .call_timeout(Duration::from_secs(config.limits.call_timeout_secs));

        Self {
            config,
            generator,
            deliverer,
            specs: SpecTable::standard(),
        }
    }

    /// Runs the pipeline over `tree`.
    ///
    /// The report artifacts are written even when the run aborts, so the
    /// returned outcome always carries a complete report.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ReportWrite` if the artifacts cannot be
    /// written. All other failures are captured in the outcome.
    pub async fn run(&self, tree: &CourseTree) -> Result<RunOutcome> {
        let mut state = RunState::new();
        let mut log = RunLog::new();
        let mut instances = HashMap::new();
        let mut course_url = None;
        let skip = self.config.skip_validation;

        info!(mode = %self.config.mode, elements = tree.element_count(), "starting course run");

        // Setup: shape check.
        if let Err(message) = tree.check_shape() {
            error!(%message, "course structure check failed");
            state.abort(PipelineError::Structure { message }.to_string());
        }

        // Authenticate.
        if !state.is_aborted() {
            state.advance(skip);
            if let Err(e) = self.deliverer.authenticate().await {
                error!(error = %e, "authentication failed");
                state.abort(
                    PipelineError::Authentication {
                        message: e.to_string(),
                    }
                    .to_string(),
                );
            }
        }

        // Generate all elements.
        if !state.is_aborted() {
            state.advance(skip);
            for theme in tree.themes() {
                for kind in ElementKind::ALL {
                    let spec = self.specs.get(kind);
                    let instance = self.generator.generate(theme, spec).await;
                    let key = theme.key(kind);
                    log.insert_generated(key, instance.clone());
                    instances.insert(key, instance);
                }
            }
            info!(elements = log.len(), "generation complete");
        }

        // Validate all elements.
        if !state.is_aborted() {
            state.advance(skip);
            if skip {
                warn!("validation skipped by configuration");
            } else {
                let mut invalid = 0usize;
                for theme in tree.themes() {
                    for kind in ElementKind::ALL {
                        let key = theme.key(kind);
                        if let Some(instance) = instances.get(&key) {
                            let result = validate(instance, self.specs.get(kind), &theme.code);
                            if !result.valid {
                                warn!(element = %key, errors = result.errors.len(), "element failed validation");
                                invalid += 1;
                            }
                            log.record_validation(&key, result);
                        }
                    }
                }
                info!(invalid, "validation complete");
                state.advance(skip);
            }
        }

        // Deliver all elements.
        if !state.is_aborted() {
            if let Err(reason) = self.deliver_all(tree, &mut log, &mut course_url).await {
                state.abort(reason);
            } else {
                state.advance(skip);
            }
        }

        // Report: always runs, even for aborted runs.
        let finished_at = Utc::now();
        let report = CourseRunReport::assemble(ReportInput {
            course: course_descriptor(tree),
            mode: self.config.mode.to_string(),
            course_url,
            aborted: state.is_aborted(),
            abort_reason: state.abort_reason.clone(),
            started_at: state.started_at,
            finished_at,
            elements: build_rows(tree, &log),
        });

        let dir = PathBuf::from(&self.config.output_dir);
        let artifacts = report
            .write_artifacts(&dir)
            .map_err(|e| PipelineError::ReportWrite {
                path: dir.clone(),
                message: e.to_string(),
            })?;
        info!(count = artifacts.len(), dir = %dir.display(), "report artifacts written");
        state.advance(skip);

        Ok(RunOutcome {
            state,
            report,
            artifacts,
        })
    }

    /// Delivers the full container hierarchy and every generated element.
    ///
    /// A failed unit or lesson container marks that container's elements as
    /// failed and moves on; only course container creation aborts the run.
    async fn deliver_all(
        &self,
        tree: &CourseTree,
        log: &mut RunLog,
        course_url: &mut Option<String>,
    ) -> std::result::Result<(), String> {
        let info = &tree.info;
        let course_id = match self
            .deliverer
            .create_course(&info.name, &info.code, info.duration_hours)
            .await
        {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "course container creation failed");
                return Err(PipelineError::CourseCreation {
                    message: e.to_string(),
                }
                .to_string());
            }
        };
        *course_url = Some(self.deliverer.course_url(&course_id));
        info!(%course_id, "course container created");

        for unit in &tree.units {
            let unit_id = match self
                .deliverer
                .create_unit(&course_id, unit.unit_number, &unit.title)
                .await
            {
                Ok(id) => id,
                Err(e) => {
                    warn!(unit = unit.unit_number, error = %e, "unit container failed, marking its elements failed");
                    let message = format!("unit container creation failed: {e}");
                    for theme in &unit.themes {
                        mark_theme_failed(log, theme, &message);
                    }
                    continue;
                }
            };

            for theme in &unit.themes {
                let lesson_id = match self
                    .deliverer
                    .create_lesson(&course_id, &unit_id, theme.theme_number, &theme.title)
                    .await
                {
                    Ok(id) => id,
                    Err(e) => {
                        warn!(theme = %theme.code, error = %e, "lesson container failed, marking its elements failed");
                        mark_theme_failed(log, theme, &format!("lesson container creation failed: {e}"));
                        continue;
                    }
                };

                self.deliver_lesson(theme, &course_id, &unit_id, &lesson_id, log)
                    .await;
            }
        }

        Ok(())
    }

    /// Delivers one lesson's blocks, a few at a time. Elements that failed
    /// validation are delivered anyway; their errors stay on the report row.
    async fn deliver_lesson(
        &self,
        theme: &Theme,
        course_id: &str,
        unit_id: &str,
        lesson_id: &str,
        log: &mut RunLog,
    ) {
        let mut blocks = Vec::new();
        for kind in ElementKind::ALL {
            let key = theme.key(kind);
            let Some(record) = log.get(&key) else { continue };
            blocks.push((
                key,
                ContentBlock {
                    block_type: kind.block_type().to_string(),
                    title: record.title.clone(),
                    content: log.body(&key).unwrap_or_default().to_string(),
                    order: block_order(kind),
                },
            ));
        }

        let deliverer = &self.deliverer;
        let outcomes: Vec<_> = stream::iter(blocks)
            .map(|(key, block)| async move {
                (key, deliverer.send_block(course_id, unit_id, lesson_id, block).await)
            })
            .buffer_unordered(BLOCK_CONCURRENCY)
            .collect()
            .await;

        for (key, outcome) in outcomes {
            if outcome.status == DeliveryStatus::Failed {
                warn!(element = %key, error = ?outcome.error, "block delivery failed");
            }
            log.record_outcome(&key, outcome);
        }
    }
}

/// Marks every recorded element of `theme` as failed with a container-level
/// error message.
fn mark_theme_failed(log: &mut RunLog, theme: &Theme, message: &str) {
    for kind in ElementKind::ALL {
        log.record_outcome(&theme.key(kind), DeliveryOutcome::failed(message, 0));
    }
}

/// Block position within a lesson (1-based, taxonomy order).
fn block_order(kind: ElementKind) -> u32 {
    u32::try_from(kind.order_index()).map_or(u32::MAX, |i| i + 1)
}

fn course_descriptor(tree: &CourseTree) -> CourseDescriptor {
    let info = &tree.info;
    CourseDescriptor {
        title: info.name.clone(),
        code: info.code.clone(),
        area: info.area.clone(),
        level: info.level.clone(),
        language: info.language.clone(),
        duration_hours: info.duration_hours,
        audience: info.target_audience.clone(),
    }
}

/// Flattens the run log into report rows, in taxonomy order.
fn build_rows(tree: &CourseTree, log: &RunLog) -> Vec<ElementRow> {
    let mut rows = Vec::with_capacity(log.len());
    for theme in tree.themes() {
        for kind in ElementKind::ALL {
            if let Some(record) = log.get(&theme.key(kind)) {
                rows.push(element_row(record, &theme.title));
            }
        }
    }
    rows
}

fn element_row(record: &ElementRecord, theme_title: &str) -> ElementRow {
    let (validation, errors, warnings) = match &record.validation {
        Some(v) if v.valid => (ValidationState::Valid, v.errors.clone(), v.warnings.clone()),
        Some(v) => (
            ValidationState::Invalid,
            v.errors.clone(),
            v.warnings.clone(),
        ),
        None => (ValidationState::Unvalidated, Vec::new(), Vec::new()),
    };

    let (delivery, remote_id, retries, delivery_error, delivered_at) = match &record.outcome {
        Some(o) => (
            match o.status {
                DeliveryStatus::Delivered => DeliveryState::Delivered,
                DeliveryStatus::Failed => DeliveryState::Failed,
                DeliveryStatus::Skipped => DeliveryState::Skipped,
            },
            o.remote_id.clone(),
            o.retries,
            o.error.clone(),
            Some(o.timestamp),
        ),
        None => (DeliveryState::Skipped, None, 0, None, None),
    };

    ElementRow {
        unit: record.key.unit,
        theme: record.key.theme,
        kind_order: block_order(record.key.kind),
        kind_label: record.key.kind.label_es().to_string(),
        theme_title: theme_title.to_string(),
        title: record.title.clone(),
        words: record.words,
        validation,
        errors,
        warnings,
        delivery,
        remote_id,
        retries,
        delivery_error,
        delivered_at,
        metrics: serde_json::to_value(&record.metrics).unwrap_or_default(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::RunMode;
    use crate::phase::Phase;
    use async_trait::async_trait;
    use forge_content::catalog::standard_course;
    use forge_delivery::{DeliveryError, SimulatedTransport};

    struct RejectingAuth;

    #[async_trait]
    impl DeliveryTransport for RejectingAuth {
        async fn authenticate(&self) -> forge_delivery::Result<()> {
            Err(DeliveryError::Authentication {
                message: "invalid credentials".to_string(),
            })
        }

        async fn create_course(
            &self,
            _name: &str,
            _code: &str,
            _duration_hours: f64,
        ) -> forge_delivery::Result<String> {
            Err(DeliveryError::Authentication {
                message: "no session".to_string(),
            })
        }

        async fn create_unit(
            &self,
            _course_id: &str,
            _unit_number: u32,
            _title: &str,
        ) -> forge_delivery::Result<String> {
            Err(DeliveryError::Authentication {
                message: "no session".to_string(),
            })
        }

        async fn create_lesson(
            &self,
            _course_id: &str,
            _unit_id: &str,
            _theme_number: u32,
            _title: &str,
        ) -> forge_delivery::Result<String> {
            Err(DeliveryError::Authentication {
                message: "no session".to_string(),
            })
        }

        async fn send_block(
            &self,
            _course_id: &str,
            _unit_id: &str,
            _lesson_id: &str,
            _block: &ContentBlock,
        ) -> forge_delivery::Result<String> {
            Err(DeliveryError::Authentication {
                message: "no session".to_string(),
            })
        }

        fn course_url(&self, _course_id: &str) -> String {
            String::new()
        }
    }

    fn test_config(name: &str) -> Config {
        Config {
            output_dir: std::env::temp_dir()
                .join(format!("courseforge-pipeline-{name}"))
                .to_string_lossy()
                .into_owned(),
            ..Config::default()
        }
    }

    fn simulation_pipeline(name: &str) -> Pipeline {
        Pipeline::new(
            test_config(name),
            ContentGenerator::template_only(),
            Arc::new(SimulatedTransport::default()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_run_delivers_everything() {
        let pipeline = simulation_pipeline("full");
        let tree = standard_course();
        let outcome = pipeline.run(&tree).await.unwrap();

        assert!(outcome.succeeded());
        assert_eq!(outcome.state.phase, Phase::Done);

        let summary = outcome.report.summary;
        assert_eq!(summary.total, 75);
        assert_eq!(summary.valid, 75);
        assert_eq!(summary.delivered, 75);
        assert_eq!(summary.failed, 0);
        assert!((summary.delivered_pct - 100.0).abs() < f64::EPSILON);

        // Deterministic simulated ids and share URL.
        assert_eq!(
            outcome.report.course_url.as_deref(),
            Some("https://rise.articulate.com/share/sim_course_sim_edutec-cvia-001")
        );
        let first = &outcome.report.rows[0];
        assert_eq!(first.unit, 1);
        assert_eq!(first.theme, 1);
        assert_eq!(first.kind_order, 1);
        assert_eq!(
            first.remote_id.as_deref(),
            Some("block_sim_narrative_lesson_sim_unit_sim_course_sim_edutec-cvia-001_1_1_1")
        );

        assert_eq!(outcome.artifacts.len(), 3);
        for path in &outcome.artifacts {
            assert!(path.exists(), "{}", path.display());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_structure_abort_still_writes_report() {
        let pipeline = simulation_pipeline("bad-shape");
        let mut tree = standard_course();
        tree.units.pop();

        let outcome = pipeline.run(&tree).await.unwrap();
        assert!(!outcome.succeeded());
        assert_eq!(outcome.state.phase, Phase::Aborted);
        assert!(outcome
            .state
            .abort_reason
            .as_deref()
            .unwrap()
            .contains("expected 5 units"));
        assert!(outcome.report.aborted);
        assert!(outcome.report.rows.is_empty());
        assert_eq!(outcome.artifacts.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_authentication_failure_aborts_before_generation() {
        let pipeline = Pipeline::new(
            test_config("auth-fail"),
            ContentGenerator::template_only(),
            Arc::new(RejectingAuth),
        );
        let tree = standard_course();

        let outcome = pipeline.run(&tree).await.unwrap();
        assert!(!outcome.succeeded());
        assert!(outcome
            .state
            .abort_reason
            .as_deref()
            .unwrap()
            .contains("Authentication failed"));
        // Nothing was generated, but the report still exists.
        assert_eq!(outcome.report.summary.total, 0);
        assert_eq!(outcome.artifacts.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_validation_leaves_elements_unvalidated() {
        let config = Config {
            skip_validation: true,
            ..test_config("skip-validation")
        };
        let pipeline = Pipeline::new(
            config,
            ContentGenerator::template_only(),
            Arc::new(SimulatedTransport::default()),
        );
        let tree = standard_course();

        let outcome = pipeline.run(&tree).await.unwrap();
        assert!(outcome.succeeded());
        let summary = outcome.report.summary;
        assert_eq!(summary.unvalidated, 75);
        assert_eq!(summary.valid, 0);
        // Unvalidated elements are still delivered.
        assert_eq!(summary.delivered, 75);
        assert_eq!(outcome.report.mode, RunMode::Simulation.to_string());
    }

    #[test]
    fn test_block_order_is_one_based() {
        assert_eq!(block_order(ElementKind::Narrative), 1);
        assert_eq!(block_order(ElementKind::Activity), 5);
    }
}
