//! Pipeline phase state machine.
//!
//! Phases advance strictly forward; the only branch is that `ValidateAll`
//! drops out of the sequence when validation is skipped. `Aborted` is
//! terminal and reachable from any non-terminal phase. The report phase
//! always runs, even for aborted runs, so the state machine never skips
//! from a working phase straight to `Done`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Phase
// ============================================================================

/// Phases of a pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Checking the course taxonomy shape.
    #[default]
    Setup,
    /// Establishing a platform session.
    Authenticate,
    /// Generating every element.
    GenerateStructure,
    /// Validating every element. Skippable.
    ValidateAll,
    /// Delivering every element.
    DeliverAll,
    /// Assembling and writing the report artifacts.
    Report,
    /// Run completed.
    Done,
    /// Run aborted by a fatal failure.
    Aborted,
}

impl Phase {
    /// Returns `true` for terminal phases.
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_orchestrator::Phase;
    ///
    /// assert!(Phase::Done.is_terminal());
    /// assert!(Phase::Aborted.is_terminal());
    /// assert!(!Phase::DeliverAll.is_terminal());
    /// ```
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Aborted)
    }

    /// The next phase in the forward-only sequence, or `None` from a
    /// terminal phase.
    #[must_use]
    pub const fn successor(&self, skip_validation: bool) -> Option<Self> {
        match self {
            Self::Setup => Some(Self::Authenticate),
            Self::Authenticate => Some(Self::GenerateStructure),
            Self::GenerateStructure => {
                if skip_validation {
                    Some(Self::DeliverAll)
                } else {
                    Some(Self::ValidateAll)
                }
            }
            Self::ValidateAll => Some(Self::DeliverAll),
            Self::DeliverAll => Some(Self::Report),
            Self::Report => Some(Self::Done),
            Self::Done | Self::Aborted => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Authenticate => "authenticate",
            Self::GenerateStructure => "generate_structure",
            Self::ValidateAll => "validate_all",
            Self::DeliverAll => "deliver_all",
            Self::Report => "report",
            Self::Done => "done",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

// ============================================================================
// RunState
// ============================================================================

/// Mutable state of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Current phase.
    pub phase: Phase,

    /// Why the run aborted, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_reason: Option<String>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the state last changed.
    pub updated_at: DateTime<Utc>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// Creates a new run state in `Setup`.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            phase: Phase::Setup,
            abort_reason: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Advances to the next phase, returning it. No-op from terminal phases.
    pub fn advance(&mut self, skip_validation: bool) -> Option<Phase> {
        let next = self.phase.successor(skip_validation)?;
        self.phase = next;
        self.updated_at = Utc::now();
        Some(next)
    }

    /// Aborts the run with `reason`. No-op if already terminal.
    pub fn abort(&mut self, reason: impl Into<String>) {
        if self.phase.is_terminal() {
            return;
        }
        self.phase = Phase::Aborted;
        self.abort_reason = Some(reason.into());
        self.updated_at = Utc::now();
    }

    /// Returns `true` if the run aborted.
    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self.phase, Phase::Aborted)
    }
}

// ============================================================================
// Tests
// ============================================================================
