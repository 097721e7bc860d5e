//! courseforge CLI
//!
//! Main entry point for assembling the course and delivering it to the
//! target platform, in simulation or live mode.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use forge_content::catalog::standard_course;
use forge_content::ContentGenerator;
use forge_delivery::{DeliveryTransport, HttpTransport, SimulatedTransport};
use forge_orchestrator::{Config, Pipeline, RunMode, RunOutcome};
use tracing_subscriber::EnvFilter;

/// courseforge - AI-assisted course assembly and delivery
///
/// Generates the complete course content, validates every element against
/// its per-kind specification, and delivers it to the target platform.
#[derive(Parser, Debug)]
#[command(name = "courseforge")]
#[command(version, about, long_about = None)]
struct Args {
    /// Execution mode override
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Path to configuration file (default: courseforge.json in current directory)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Output directory for report artifacts
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Skip the validation phase
    #[arg(long)]
    skip_validation: bool,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    verbose: bool,
}

/// CLI mirror of [`RunMode`].
#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// No network calls; deterministic simulated ids
    Simulation,
    /// Real platform delivery over HTTPS
    Live,
}

impl From<ModeArg> for RunMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Simulation => Self::Simulation,
            ModeArg::Live => Self::Live,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("courseforge starting");
    tracing::debug!(config = ?args.config, "Config file");
    tracing::debug!(output_dir = ?args.output_dir, "Output directory override");

    match run_courseforge(args).await {
        Ok(outcome) if outcome.succeeded() => ExitCode::SUCCESS,
        Ok(outcome) => {
            eprintln!(
                "Run aborted: {}",
                outcome
                    .state
                    .abort_reason
                    .as_deref()
                    .unwrap_or("unknown reason")
            );
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

/// Loads configuration, wires the pipeline, and runs it over the standard
/// course catalog.
async fn run_courseforge(args: Args) -> anyhow::Result<RunOutcome> {
    let mut config = match args.config.as_deref() {
        Some(path) => Config::load_from_file(Path::new(path))?,
        None => Config::load_from_dir(Path::new("."))?,
    };

    // Apply CLI argument overrides, then re-validate.
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    if args.skip_validation {
        config.skip_validation = true;
    }
    config.validate()?;

    print_config(&config);

    let transport: Arc<dyn DeliveryTransport> = match config.mode {
        RunMode::Simulation => Arc::new(SimulatedTransport::new(&config.platform.share_url)),
        RunMode::Live => Arc::new(HttpTransport::new(
            &config.platform.base_url,
            &config.platform.share_url,
            &config.platform.email,
            &config.platform.password,
        )?),
    };

    let generator = ContentGenerator::template_only()
        .max_attempts(config.generation.max_attempts)
        .backend_timeout(Duration::from_secs(config.generation.backend_timeout_secs));

    let tree = standard_course();
    println!();
    println!("Course: {} ({})", tree.info.name, tree.info.code);
    println!(
        "Structure: {} units, {} themes, {} elements",
        tree.units.len(),
        tree.theme_count(),
        tree.element_count()
    );
    println!();

    let pipeline = Pipeline::new(config, generator, transport);
    let outcome = pipeline.run(&tree).await?;

    print_outcome(&outcome);
    Ok(outcome)
}

fn print_config(config: &Config) {
    println!("Mode:             {}", config.mode);
    println!("Output directory: {}", config.output_dir);
    println!(
        "Rate limit:       {} requests/minute",
        config.limits.requests_per_minute
    );
    println!(
        "Delivery retries: up to {} attempts, base delay {}s",
        config.limits.max_delivery_attempts, config.limits.retry_base_secs
    );
    if config.skip_validation {
        println!("Validation:       SKIPPED");
    }
}

fn print_outcome(outcome: &RunOutcome) {
    let summary = outcome.report.summary;
    println!();
    println!("Elements:  {}", summary.total);
    println!("Valid:     {} ({:.1}%)", summary.valid, summary.valid_pct);
    println!(
        "Delivered: {} ({:.1}%)",
        summary.delivered, summary.delivered_pct
    );
    if summary.failed > 0 {
        println!("Failed:    {}", summary.failed);
    }
    if summary.skipped > 0 {
        println!("Skipped:   {}", summary.skipped);
    }
    if let Some(url) = &outcome.report.course_url {
        println!();
        println!("Course URL: {url}");
    }
    println!();
    println!("Report artifacts:");
    for path in &outcome.artifacts {
        println!("  {}", path.display());
    }
}
