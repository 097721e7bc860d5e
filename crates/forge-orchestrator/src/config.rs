//! Configuration for a courseforge run.
//!
//! Configuration comes from `courseforge.json`: a missing file yields
//! defaults, a malformed file is a fatal configuration error. Every field
//! has a default so partial files work.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "courseforge.json";

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_base_url() -> String {
    "https://cloud.articulate.com/api".to_string()
}

fn default_share_url() -> String {
    "https://rise.articulate.com".to_string()
}

const fn default_requests_per_minute() -> usize {
    100
}

const fn default_max_delivery_attempts() -> u32 {
    4
}

const fn default_retry_base_secs() -> u64 {
    2
}

const fn default_call_timeout_secs() -> u64 {
    30
}

const fn default_generation_attempts() -> u32 {
    3
}

const fn default_backend_timeout_secs() -> u64 {
    60
}

// ============================================================================
// RunMode
// ============================================================================

/// Execution mode for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// No network calls; the simulated transport fabricates remote ids.
    #[default]
    Simulation,
    /// Real platform delivery over HTTPS.
    Live,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulation => f.write_str("simulation"),
            Self::Live => f.write_str("live"),
        }
    }
}

// ============================================================================
// Config
// ============================================================================

/// Main configuration for a courseforge run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Execution mode.
    #[serde(default)]
    pub mode: RunMode,

    /// Skip the validation phase entirely.
    #[serde(default)]
    pub skip_validation: bool,

    /// Directory where report artifacts are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Target platform settings.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Delivery rate and retry limits.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Content generation settings.
    #[serde(default)]
    pub generation: GenerationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            skip_validation: false,
            output_dir: default_output_dir(),
            platform: PlatformConfig::default(),
            limits: LimitsConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

/// Target platform connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    /// Platform API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base URL for shareable course links.
    #[serde(default = "default_share_url")]
    pub share_url: String,

    /// Account email. Required in live mode.
    #[serde(default)]
    pub email: String,

    /// Account password. Required in live mode.
    #[serde(default)]
    pub password: String,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            share_url: default_share_url(),
            email: String::new(),
            password: String::new(),
        }
    }
}

/// Delivery rate and retry limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsConfig {
    /// Local sliding-window rate limit.
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: usize,

    /// Delivery attempt ceiling, including the first attempt.
    #[serde(default = "default_max_delivery_attempts")]
    pub max_delivery_attempts: u32,

    /// Backoff delay after the first failed attempt, in seconds.
    #[serde(default = "default_retry_base_secs")]
    pub retry_base_secs: u64,

    /// Per-call timeout, in seconds.
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            max_delivery_attempts: default_max_delivery_attempts(),
            retry_base_secs: default_retry_base_secs(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

/// Content generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Regenerate-loop attempt ceiling.
    #[serde(default = "default_generation_attempts")]
    pub max_attempts: u32,

    /// Per-call backend timeout, in seconds.
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_generation_attempts(),
            backend_timeout_secs: default_backend_timeout_secs(),
        }
    }
}

impl Config {
    /// Loads configuration from `courseforge.json` in `dir`.
    ///
    /// A missing file yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// configuration values are invalid.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file yields the default configuration; a malformed file is
    /// a fatal configuration error.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ConfigParse` for unreadable or malformed
    /// files, `PipelineError::ConfigValidation` for invalid values.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(PipelineError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| PipelineError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::ConfigValidation` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.output_dir.trim().is_empty() {
            return Err(PipelineError::config_validation(
                "outputDir must not be empty",
                "Provide an output directory path in your courseforge.json",
            ));
        }

        if self.limits.requests_per_minute == 0 {
            return Err(PipelineError::config_validation(
                "limits.requestsPerMinute must be greater than 0",
                "Set limits.requestsPerMinute to at least 1 in your courseforge.json",
            ));
        }

        if self.limits.max_delivery_attempts == 0 {
            return Err(PipelineError::config_validation(
                "limits.maxDeliveryAttempts must be greater than 0",
                "Set limits.maxDeliveryAttempts to at least 1 in your courseforge.json",
            ));
        }

        if self.generation.max_attempts == 0 {
            return Err(PipelineError::config_validation(
                "generation.maxAttempts must be greater than 0",
                "Set generation.maxAttempts to at least 1 in your courseforge.json",
            ));
        }

        if self.mode == RunMode::Live
            && (self.platform.email.trim().is_empty() || self.platform.password.trim().is_empty())
        {
            return Err(PipelineError::config_validation(
                "live mode requires platform credentials",
                "Set platform.email and platform.password in your courseforge.json",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
