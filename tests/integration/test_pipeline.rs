//! End-to-end integration tests for the courseforge pipeline.
//!
//! These tests drive complete runs over the standard course catalog using
//! in-memory transports, then check the run log, the assembled report, and
//! the written artifacts. No network access is required.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use forge_content::catalog::standard_course;
use forge_content::{ContentGenerator, ElementKind, GenerateError, TextGenerator};
use forge_delivery::{
    ContentBlock, DeliveryError, DeliveryTransport, SimulatedTransport,
};
use forge_orchestrator::{Config, Phase, Pipeline, RunOutcome};
use forge_report::{DeliveryState, ValidationState};

fn output_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("courseforge-it-{name}"))
}

fn config(name: &str) -> Config {
    Config {
        output_dir: output_dir(name).to_string_lossy().into_owned(),
        ..Config::default()
    }
}

async fn run_simulation(name: &str, generator: ContentGenerator) -> RunOutcome {
    let pipeline = Pipeline::new(
        config(name),
        generator,
        Arc::new(SimulatedTransport::default()),
    );
    let tree = standard_course();
    pipeline
        .run(&tree)
        .await
        .expect("pipeline run should not fail")
}

// ----------------------------------------------------------------------------
// Full simulation run
// ----------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_full_simulation_run() {
    let outcome = run_simulation("full-run", ContentGenerator::template_only()).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.state.phase, Phase::Done);

    let summary = outcome.report.summary;
    assert_eq!(summary.total, 75);
    assert_eq!(summary.valid, 75);
    assert_eq!(summary.invalid, 0);
    assert_eq!(summary.delivered, 75);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);

    // 5 units x 3 themes x 5 kinds, in taxonomy order.
    let tuples: Vec<(u32, u32, u32)> = outcome
        .report
        .rows
        .iter()
        .map(|r| (r.unit, r.theme, r.kind_order))
        .collect();
    let mut expected = Vec::new();
    for unit in 1..=5 {
        for theme in 1..=3 {
            for kind in 1..=5 {
                expected.push((unit, theme, kind));
            }
        }
    }
    assert_eq!(tuples, expected);

    // Every delivered element carries a unique simulated remote id.
    let ids: HashSet<&str> = outcome
        .report
        .rows
        .iter()
        .map(|r| r.remote_id.as_deref().expect("delivered element has id"))
        .collect();
    assert_eq!(ids.len(), 75);
    assert!(ids.iter().all(|id| id.starts_with("block_sim_")));
}

#[tokio::test(start_paused = true)]
async fn test_artifacts_written_and_consistent() {
    let outcome = run_simulation("artifacts", ContentGenerator::template_only()).await;
    assert_eq!(outcome.artifacts.len(), 3);

    let dir = output_dir("artifacts");
    let csv = std::fs::read_to_string(dir.join("course_inventory.csv")).expect("inventory");
    let json = std::fs::read_to_string(dir.join("course_structure.json")).expect("snapshot");
    let txt = std::fs::read_to_string(dir.join("course_summary.txt")).expect("summary");

    // CSV: header plus one line per element.
    assert_eq!(csv.lines().count(), 76);
    assert!(csv.starts_with("Unidad,Tema,Tipo,Título,Estado,Palabras,ID Remoto,Timestamp,Errores"));
    assert_eq!(csv.matches("✅ Entregado").count(), 75);

    // Snapshot: full nested structure.
    let value: serde_json::Value = serde_json::from_str(&json).expect("snapshot parses");
    let units = value["units"].as_array().expect("units");
    assert_eq!(units.len(), 5);
    for unit in units {
        let themes = unit["themes"].as_array().expect("themes");
        assert_eq!(themes.len(), 3);
        for theme in themes {
            assert_eq!(theme["elements"].as_array().expect("elements").len(), 5);
        }
    }
    assert_eq!(value["summary"]["delivered"], 75);
    assert_eq!(value["course"]["code"], "EDUTEC-CVIA-001");

    // Summary: headline counts and the course URL.
    assert!(txt.contains("RESUMEN DE GENERACIÓN DE CURSO"));
    assert!(txt.contains("Totales:     75"));
    assert!(txt.contains("Entregados:  75 (100.0%)"));
    assert!(txt.contains("URL del curso: https://rise.articulate.com/share/sim_course_sim_edutec-cvia-001"));
}

// ----------------------------------------------------------------------------
// Invalid content is delivered with its errors on record
// ----------------------------------------------------------------------------

/// Backend that always returns structurally useless text: enough words to be
/// measured, but no sections, concepts, or markers of any kind.
struct JunkBackend;

#[async_trait]
impl TextGenerator for JunkBackend {
    async fn generate_text(
        &self,
        _prompt: &str,
        _kind: ElementKind,
    ) -> Result<String, GenerateError> {
        Ok("palabra ".repeat(400).trim_end().to_string())
    }
}

#[tokio::test(start_paused = true)]
async fn test_invalid_elements_are_still_delivered() {
    let generator = ContentGenerator::with_backend(Arc::new(JunkBackend)).max_attempts(2);
    let outcome = run_simulation("junk-backend", generator).await;

    // Element-level failures never abort the run, and invalid content still
    // reaches the platform so a partial course is inspectable.
    assert!(outcome.succeeded());
    let summary = outcome.report.summary;
    assert_eq!(summary.total, 75);
    assert_eq!(summary.invalid, 75);
    assert_eq!(summary.delivered, 75);
    assert_eq!(summary.skipped, 0);

    for row in &outcome.report.rows {
        assert_eq!(row.validation, ValidationState::Invalid);
        assert_eq!(row.delivery, DeliveryState::Delivered);
        assert!(!row.errors.is_empty());
        assert!(row.remote_id.is_some());
    }
}

// ----------------------------------------------------------------------------
// Retry behavior through the full pipeline
// ----------------------------------------------------------------------------

/// Transport that fails the first `send_block` attempt for every block with
/// a transient server error, then behaves like the simulated transport.
struct FlakyBlocks {
    inner: SimulatedTransport,
    seen: Mutex<HashSet<String>>,
}

impl FlakyBlocks {
    fn new() -> Self {
        Self {
            inner: SimulatedTransport::default(),
            seen: Mutex::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl DeliveryTransport for FlakyBlocks {
    async fn authenticate(&self) -> forge_delivery::Result<()> {
        self.inner.authenticate().await
    }

    async fn create_course(
        &self,
        name: &str,
        code: &str,
        duration_hours: f64,
    ) -> forge_delivery::Result<String> {
        self.inner.create_course(name, code, duration_hours).await
    }

    async fn create_unit(
        &self,
        course_id: &str,
        unit_number: u32,
        title: &str,
    ) -> forge_delivery::Result<String> {
        self.inner.create_unit(course_id, unit_number, title).await
    }

    async fn create_lesson(
        &self,
        course_id: &str,
        unit_id: &str,
        theme_number: u32,
        title: &str,
    ) -> forge_delivery::Result<String> {
        self.inner
            .create_lesson(course_id, unit_id, theme_number, title)
            .await
    }

    async fn send_block(
        &self,
        course_id: &str,
        unit_id: &str,
        lesson_id: &str,
        block: &ContentBlock,
    ) -> forge_delivery::Result<String> {
        let key = format!("{lesson_id}/{}", block.order);
        let first_attempt = self
            .seen
            .lock()
            .expect("mutex poisoned")
            .insert(key);
        if first_attempt {
            return Err(DeliveryError::Server {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        self.inner
            .send_block(course_id, unit_id, lesson_id, block)
            .await
    }

    fn course_url(&self, course_id: &str) -> String {
        self.inner.course_url(course_id)
    }
}

#[tokio::test(start_paused = true)]
async fn test_transient_failures_are_retried() {
    let pipeline = Pipeline::new(
        config("flaky"),
        ContentGenerator::template_only(),
        Arc::new(FlakyBlocks::new()),
    );
    let tree = standard_course();
    let outcome = pipeline.run(&tree).await.expect("run");

    let summary = outcome.report.summary;
    assert_eq!(summary.delivered, 75);
    assert_eq!(summary.failed, 0);
    // Every block needed exactly one retry.
    assert!(outcome.report.rows.iter().all(|r| r.retries == 1));
}

/// Transport whose `send_block` always fails with a transient error.
struct BrokenBlocks {
    inner: SimulatedTransport,
    calls: AtomicU32,
}

#[async_trait]
impl DeliveryTransport for BrokenBlocks {
    async fn authenticate(&self) -> forge_delivery::Result<()> {
        self.inner.authenticate().await
    }

    async fn create_course(
        &self,
        name: &str,
        code: &str,
        duration_hours: f64,
    ) -> forge_delivery::Result<String> {
        self.inner.create_course(name, code, duration_hours).await
    }

    async fn create_unit(
        &self,
        course_id: &str,
        unit_number: u32,
        title: &str,
    ) -> forge_delivery::Result<String> {
        self.inner.create_unit(course_id, unit_number, title).await
    }

    async fn create_lesson(
        &self,
        course_id: &str,
        unit_id: &str,
        theme_number: u32,
        title: &str,
    ) -> forge_delivery::Result<String> {
        self.inner
            .create_lesson(course_id, unit_id, theme_number, title)
            .await
    }

    async fn send_block(
        &self,
        _course_id: &str,
        _unit_id: &str,
        _lesson_id: &str,
        _block: &ContentBlock,
    ) -> forge_delivery::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DeliveryError::Server {
            status: 500,
            message: "internal error".to_string(),
        })
    }

    fn course_url(&self, course_id: &str) -> String {
        self.inner.course_url(course_id)
    }
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_mark_elements_failed() {
    let transport = Arc::new(BrokenBlocks {
        inner: SimulatedTransport::default(),
        calls: AtomicU32::new(0),
    });
    let pipeline = Pipeline::new(
        config("broken"),
        ContentGenerator::template_only(),
        Arc::clone(&transport) as Arc<dyn DeliveryTransport>,
    );
    let tree = standard_course();
    let outcome = pipeline.run(&tree).await.expect("run");

    // The run completes; element failures are recorded, not raised.
    assert!(outcome.succeeded());
    let summary = outcome.report.summary;
    assert_eq!(summary.failed, 75);
    assert_eq!(summary.delivered, 0);

    // Attempt ceiling: 4 attempts per block, 3 retries recorded.
    assert_eq!(transport.calls.load(Ordering::SeqCst), 75 * 4);
    for row in &outcome.report.rows {
        assert_eq!(row.retries, 3);
        assert!(row
            .delivery_error
            .as_deref()
            .expect("failed row has error")
            .contains("500"));
    }
}

// ----------------------------------------------------------------------------
// Aborted runs still report
// ----------------------------------------------------------------------------

/// Transport that rejects authentication outright.
struct NoAuth;

#[async_trait]
impl DeliveryTransport for NoAuth {
    async fn authenticate(&self) -> forge_delivery::Result<()> {
        Err(DeliveryError::Authentication {
            message: "401 Unauthorized".to_string(),
        })
    }

    async fn create_course(
        &self,
        _name: &str,
        _code: &str,
        _duration_hours: f64,
    ) -> forge_delivery::Result<String> {
        unreachable!("pipeline must not create containers without a session")
    }

    async fn create_unit(
        &self,
        _course_id: &str,
        _unit_number: u32,
        _title: &str,
    ) -> forge_delivery::Result<String> {
        unreachable!("pipeline must not create containers without a session")
    }

    async fn create_lesson(
        &self,
        _course_id: &str,
        _unit_id: &str,
        _theme_number: u32,
        _title: &str,
    ) -> forge_delivery::Result<String> {
        unreachable!("pipeline must not create containers without a session")
    }

    async fn send_block(
        &self,
        _course_id: &str,
        _unit_id: &str,
        _lesson_id: &str,
        _block: &ContentBlock,
    ) -> forge_delivery::Result<String> {
        unreachable!("pipeline must not send blocks without a session")
    }

    fn course_url(&self, _course_id: &str) -> String {
        String::new()
    }
}

#[tokio::test(start_paused = true)]
async fn test_auth_abort_still_writes_all_artifacts() {
    let pipeline = Pipeline::new(
        config("auth-abort"),
        ContentGenerator::template_only(),
        Arc::new(NoAuth),
    );
    let tree = standard_course();
    let outcome = pipeline.run(&tree).await.expect("run");

    assert!(!outcome.succeeded());
    assert_eq!(outcome.state.phase, Phase::Aborted);
    assert!(outcome.report.aborted);
    assert_eq!(outcome.report.summary.total, 0);

    let txt = std::fs::read_to_string(output_dir("auth-abort").join("course_summary.txt"))
        .expect("summary artifact");
    assert!(txt.contains("⚠ EJECUCIÓN ABORTADA"));
    assert!(txt.contains("401 Unauthorized"));
    assert!(txt.contains("Totales:     0"));
}
