//! courseforge pipeline orchestration
//!
//! Configuration, the forward-only phase state machine, the keyed run log,
//! and the pipeline that drives a run through generation, validation,
//! delivery, and reporting.

pub mod config;
pub mod error;
pub mod log;
pub mod phase;
pub mod pipeline;

pub use config::{Config, GenerationConfig, LimitsConfig, PlatformConfig, RunMode};
pub use error::{PipelineError, Result};
pub use log::{ElementRecord, RunLog};
pub use phase::{Phase, RunState};
pub use pipeline::{Pipeline, RunOutcome};
