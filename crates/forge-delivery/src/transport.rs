//! Delivery transports.
//!
//! [`DeliveryTransport`] is the opaque capability the pipeline drives:
//! authenticate, create the course container hierarchy, send content blocks,
//! and report the course URL. [`SimulatedTransport`] fabricates deterministic
//! remote ids with no latency; [`HttpTransport`] speaks the platform's REST
//! API. A browser-driving transport would be a third implementation, outside
//! the scope of this crate.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{DeliveryError, Result};

// ============================================================================
// ContentBlock
// ============================================================================

/// One content block to place inside a lesson.
#[derive(Debug, Clone, Serialize)]
pub struct ContentBlock {
    /// Block type identifier, e.g. `"narrative"` or `"video_script"`.
    #[serde(rename = "type")]
    pub block_type: String,

    /// Block title.
    pub title: String,

    /// Block body.
    pub content: String,

    /// Position within the lesson (1-based).
    pub order: u32,
}

// ============================================================================
// DeliveryTransport
// ============================================================================

/// The delivery capability: everything the pipeline needs from a target
/// platform, with remote ids as opaque strings.
#[async_trait]
pub trait DeliveryTransport: Send + Sync {
    /// Establishes a session with the platform.
    async fn authenticate(&self) -> Result<()>;

    /// Creates the course container, returning its remote id.
    async fn create_course(&self, name: &str, code: &str, duration_hours: f64) -> Result<String>;

    /// Creates a unit under a course, returning its remote id.
    async fn create_unit(&self, course_id: &str, unit_number: u32, title: &str) -> Result<String>;

    /// Creates a lesson under a unit, returning its remote id.
    async fn create_lesson(
        &self,
        course_id: &str,
        unit_id: &str,
        theme_number: u32,
        title: &str,
    ) -> Result<String>;

    /// Places a content block inside a lesson, returning its remote id.
    async fn send_block(
        &self,
        course_id: &str,
        unit_id: &str,
        lesson_id: &str,
        block: &ContentBlock,
    ) -> Result<String>;

    /// Shareable URL for a delivered course.
    fn course_url(&self, course_id: &str) -> String;
}

// ============================================================================
// SimulatedTransport
// ============================================================================

/// Transport that fabricates deterministic remote ids without any I/O.
///
/// Every call succeeds immediately, so simulation runs exercise the full
/// pipeline with zero network dependency and reproducible ids.
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    share_base: String,
}

impl SimulatedTransport {
    /// Creates a simulated transport that forms share URLs under `share_base`.
    #[must_use]
    pub fn new(share_base: impl Into<String>) -> Self {
        Self {
            share_base: share_base.into(),
        }
    }
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self::new("https://rise.articulate.com")
    }
}

#[async_trait]
impl DeliveryTransport for SimulatedTransport {
    async fn authenticate(&self) -> Result<()> {
        info!("simulation: authenticated");
        Ok(())
    }

    async fn create_course(&self, _name: &str, code: &str, _duration_hours: f64) -> Result<String> {
        let id = format!("course_sim_{}", code.to_lowercase());
        info!(course_id = %id, "simulation: created course");
        Ok(id)
    }

    async fn create_unit(&self, course_id: &str, unit_number: u32, _title: &str) -> Result<String> {
        let id = format!("unit_sim_{course_id}_{unit_number}");
        debug!(unit_id = %id, "simulation: created unit");
        Ok(id)
    }

    async fn create_lesson(
        &self,
        _course_id: &str,
        unit_id: &str,
        theme_number: u32,
        _title: &str,
    ) -> Result<String> {
        let id = format!("lesson_sim_{unit_id}_{theme_number}");
        debug!(lesson_id = %id, "simulation: created lesson");
        Ok(id)
    }

    async fn send_block(
        &self,
        _course_id: &str,
        _unit_id: &str,
        lesson_id: &str,
        block: &ContentBlock,
    ) -> Result<String> {
        let id = format!("block_sim_{}_{lesson_id}_{}", block.block_type, block.order);
        debug!(block_id = %id, "simulation: inserted block");
        Ok(id)
    }

    fn course_url(&self, course_id: &str) -> String {
        format!("{}/share/sim_{course_id}", self.share_base)
    }
}

// ============================================================================
// HttpTransport
// ============================================================================

/// Transport speaking the platform's REST API over HTTPS.
///
/// Holds the bearer token from `authenticate` behind a read-write lock so
/// concurrent block sends share one session.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    share_url: String,
    email: String,
    password: String,
    token: RwLock<Option<String>>,
}

impl HttpTransport {
    /// Creates an HTTP transport against `base_url`, forming share URLs
    /// under `share_url`.
    pub fn new(
        base_url: impl Into<String>,
        share_url: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| DeliveryError::Network {
                message: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            share_url: share_url.into(),
            email: email.into(),
            password: password.into(),
            token: RwLock::new(None),
        })
    }

    async fn bearer(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// POSTs `payload` to `path` and extracts the `id` field of the response.
    async fn post_for_id<P: Serialize + Sync>(&self, path: &str, payload: &P) -> Result<String> {
        let mut request = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(payload);
        if let Some(token) = self.bearer().await {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(classify_reqwest)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let value: serde_json::Value =
            response.json().await.map_err(|e| DeliveryError::Rejected {
                status: status.as_u16(),
                message: format!("unreadable response body: {e}"),
            })?;
        value
            .get("id")
            .and_then(serde_json::Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| DeliveryError::Rejected {
                status: status.as_u16(),
                message: "response missing 'id'".to_string(),
            })
    }
}

#[async_trait]
impl DeliveryTransport for HttpTransport {
    async fn authenticate(&self) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/v1/auth/login", self.base_url))
            .json(&serde_json::json!({
                "email": self.email,
                "password": self.password,
            }))
            .send()
            .await
            .map_err(classify_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let value: serde_json::Value =
            response.json().await.map_err(|e| DeliveryError::Authentication {
                message: format!("unreadable login response: {e}"),
            })?;
        let token = value
            .get("token")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| DeliveryError::Authentication {
                message: "login response missing 'token'".to_string(),
            })?;

        *self.token.write().await = Some(token.to_string());
        info!("authenticated with platform");
        Ok(())
    }

    async fn create_course(&self, name: &str, code: &str, duration_hours: f64) -> Result<String> {
        self.post_for_id(
            "/v1/courses",
            &serde_json::json!({
                "title": name,
                "description": format!("Código: {code}"),
                "duration": duration_hours,
            }),
        )
        .await
    }

    async fn create_unit(&self, course_id: &str, unit_number: u32, title: &str) -> Result<String> {
        self.post_for_id(
            &format!("/v1/courses/{course_id}/units"),
            &serde_json::json!({
                "number": unit_number,
                "title": title,
            }),
        )
        .await
    }

    async fn create_lesson(
        &self,
        course_id: &str,
        unit_id: &str,
        theme_number: u32,
        title: &str,
    ) -> Result<String> {
        self.post_for_id(
            &format!("/v1/courses/{course_id}/units/{unit_id}/lessons"),
            &serde_json::json!({
                "number": theme_number,
                "title": title,
            }),
        )
        .await
    }

    async fn send_block(
        &self,
        course_id: &str,
        unit_id: &str,
        lesson_id: &str,
        block: &ContentBlock,
    ) -> Result<String> {
        self.post_for_id(
            &format!("/v1/courses/{course_id}/units/{unit_id}/lessons/{lesson_id}/blocks"),
            block,
        )
        .await
    }

    fn course_url(&self, course_id: &str) -> String {
        format!("{}/share/{course_id}", self.share_url)
    }
}

/// Maps an HTTP status to the delivery error taxonomy.
fn classify_status(status: u16, message: String) -> DeliveryError {
    match status {
        401 | 403 => DeliveryError::Authentication { message },
        429 => DeliveryError::RateLimited,
        500..=599 => DeliveryError::Server { status, message },
        _ => DeliveryError::Rejected { status, message },
    }
}

fn classify_reqwest(err: reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout { timeout_secs: 0 }
    } else {
        DeliveryError::Network {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
