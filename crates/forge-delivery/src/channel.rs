//! The delivery channel: retry policy, outcomes, and the [`Deliverer`].
//!
//! The deliverer wraps a transport with the local rate limiter, a per-call
//! timeout, and exponential backoff for transient failures. Container
//! creation surfaces errors to the caller after retries are exhausted, but
//! block sends always resolve to a [`DeliveryOutcome`] so one bad element
//! cannot take down the run.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::limiter::RateLimiter;
use crate::transport::{ContentBlock, DeliveryTransport};
use crate::{DeliveryError, Result};

// ============================================================================
// DeliveryStatus and DeliveryOutcome
// ============================================================================

/// Terminal delivery status of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The element reached the platform.
    Delivered,
    /// Delivery was never attempted for this element.
    Skipped,
    /// Delivery failed after exhausting retries (or immediately, for
    /// non-transient errors).
    Failed,
}

impl DeliveryStatus {
    /// Status glyph used in the CSV inventory.
    #[must_use]
    pub const fn glyph(&self) -> &'static str {
        match self {
            Self::Delivered => "✅",
            Self::Skipped => "⏭",
            Self::Failed => "❌",
        }
    }
}

/// The audited result of delivering one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    /// Terminal status.
    pub status: DeliveryStatus,

    /// Remote id assigned by the platform, when delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_id: Option<String>,

    /// Retries consumed (0 when the first attempt succeeded).
    pub retries: u32,

    /// Final error, when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the outcome was decided.
    pub timestamp: DateTime<Utc>,
}

impl DeliveryOutcome {
    /// A delivered outcome.
    #[must_use]
    pub fn delivered(remote_id: impl Into<String>, retries: u32) -> Self {
        Self {
            status: DeliveryStatus::Delivered,
            remote_id: Some(remote_id.into()),
            retries,
            error: None,
            timestamp: Utc::now(),
        }
    }

    /// A failed outcome carrying the final error.
    #[must_use]
    pub fn failed(error: impl Into<String>, retries: u32) -> Self {
        Self {
            status: DeliveryStatus::Failed,
            remote_id: None,
            retries,
            error: Some(error.into()),
            timestamp: Utc::now(),
        }
    }

    /// A skipped outcome (delivery never attempted).
    #[must_use]
    pub fn skipped() -> Self {
        Self {
            status: DeliveryStatus::Skipped,
            remote_id: None,
            retries: 0,
            error: None,
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// RetryPolicy
// ============================================================================

/// Bounded-retry policy with exponential backoff.
///
/// `max_attempts` counts the first try, so the default of 4 means one
/// attempt plus three retries, with delays doubling from `base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts allowed, including the first.
    pub max_attempts: u32,

    /// Delay after the first failed attempt; doubles per further attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay after failed attempt number `attempt` (1-based).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use forge_delivery::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default();
    /// assert_eq!(policy.delay_for(1), Duration::from_secs(2));
    /// assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    /// assert_eq!(policy.delay_for(3), Duration::from_secs(8));
    /// assert_eq!(policy.delay_for(4), Duration::from_secs(16));
    /// ```
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

// ============================================================================
// Deliverer
// ============================================================================

/// Drives a [`DeliveryTransport`] under the local rate limit, per-call
/// timeout, and retry policy.
pub struct Deliverer {
    transport: Arc<dyn DeliveryTransport>,
    limiter: Arc<RateLimiter>,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl Deliverer {
    /// Default per-call timeout.
    pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a deliverer over `transport` with default policy, a
    /// 100-per-minute limiter, and the default call timeout.
    #[must_use]
    pub fn new(transport: Arc<dyn DeliveryTransport>) -> Self {
        Self {
            transport,
            limiter: Arc::new(RateLimiter::per_minute(100)),
            policy: RetryPolicy::default(),
            call_timeout: Self::DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Replaces the rate limiter.
    #[must_use]
    pub fn limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the per-call timeout.
    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Authenticates with the platform.
    pub async fn authenticate(&self) -> Result<()> {
        let transport = Arc::clone(&self.transport);
        self.with_retry("authenticate", move || {
            let transport = Arc::clone(&transport);
            async move { transport.authenticate().await }
        })
        .await
        .0
    }

    /// Creates the course container.
    pub async fn create_course(
        &self,
        name: &str,
        code: &str,
        duration_hours: f64,
    ) -> Result<String> {
        let transport = Arc::clone(&self.transport);
        let name = name.to_string();
        let code = code.to_string();
        self.with_retry("create_course", move || {
            let transport = Arc::clone(&transport);
            let name = name.clone();
            let code = code.clone();
            async move { transport.create_course(&name, &code, duration_hours).await }
        })
        .await
        .0
    }

    /// Creates a unit container.
    pub async fn create_unit(
        &self,
        course_id: &str,
        unit_number: u32,
        title: &str,
    ) -> Result<String> {
        let transport = Arc::clone(&self.transport);
        let course_id = course_id.to_string();
        let title = title.to_string();
        self.with_retry("create_unit", move || {
            let transport = Arc::clone(&transport);
            let course_id = course_id.clone();
            let title = title.clone();
            async move { transport.create_unit(&course_id, unit_number, &title).await }
        })
        .await
        .0
    }

    /// Creates a lesson container.
    pub async fn create_lesson(
        &self,
        course_id: &str,
        unit_id: &str,
        theme_number: u32,
        title: &str,
    ) -> Result<String> {
        let transport = Arc::clone(&self.transport);
        let course_id = course_id.to_string();
        let unit_id = unit_id.to_string();
        let title = title.to_string();
        self.with_retry("create_lesson", move || {
            let transport = Arc::clone(&transport);
            let course_id = course_id.clone();
            let unit_id = unit_id.clone();
            let title = title.clone();
            async move {
                transport
                    .create_lesson(&course_id, &unit_id, theme_number, &title)
                    .await
            }
        })
        .await
        .0
    }

    /// Sends one content block, always resolving to an outcome.
    pub async fn send_block(
        &self,
        course_id: &str,
        unit_id: &str,
        lesson_id: &str,
        block: ContentBlock,
    ) -> DeliveryOutcome {
        let transport = Arc::clone(&self.transport);
        let course_id = course_id.to_string();
        let unit_id = unit_id.to_string();
        let lesson_id = lesson_id.to_string();
        let (result, retries) = self
            .with_retry("send_block", move || {
                let transport = Arc::clone(&transport);
                let course_id = course_id.clone();
                let unit_id = unit_id.clone();
                let lesson_id = lesson_id.clone();
                let block = block.clone();
                async move {
                    transport
                        .send_block(&course_id, &unit_id, &lesson_id, &block)
                        .await
                }
            })
            .await;

        match result {
            Ok(remote_id) => DeliveryOutcome::delivered(remote_id, retries),
            Err(err) => DeliveryOutcome::failed(err.to_string(), retries),
        }
    }

    /// Shareable URL for a delivered course.
    #[must_use]
    pub fn course_url(&self, course_id: &str) -> String {
        self.transport.course_url(course_id)
    }

    /// Runs `op` under the rate limiter and call timeout, retrying transient
    /// failures with exponential backoff up to the policy ceiling.
    ///
    /// Returns the final result and the retries consumed.
    async fn with_retry<F, Fut, T>(&self, op_name: &str, mut op: F) -> (Result<T>, u32)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0u32;
        loop {
            let attempt = retries + 1;
            self.limiter.acquire().await;

            let result = match tokio::time::timeout(self.call_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout {
                    timeout_secs: self.call_timeout.as_secs(),
                }),
            };

            match result {
                Ok(value) => {
                    debug!(op = op_name, attempt, "call succeeded");
                    return (Ok(value), retries);
                }
                Err(err) if err.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt);
                    warn!(
                        op = op_name,
                        attempt,
                        delay_secs = delay.as_secs(),
                        %err,
                        "transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    retries += 1;
                }
                Err(err) => {
                    warn!(op = op_name, attempt, %err, "call failed");
                    return (Err(err), retries);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
